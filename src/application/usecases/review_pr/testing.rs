//! 유스케이스 테스트용 가짜 포트 구현.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::Value;

use crate::application::ports::{LlmAdapter, Reporter, VcsGateway};
use crate::domain::error::ReviewError;
use crate::domain::lens::Lens;
use crate::domain::review::{ChangedFile, PostedComment, PrHandle, StructuredResponse, TokenUsage};
use crate::domain::schema;

type Script = dyn Fn(&str, &str) -> Result<String, ReviewError> + Send + Sync;

/// (system, human) 입력에 대해 정해진 원문 응답을 돌려주는 LLM.
/// 실제 어댑터처럼 응답을 스키마로 검증한다.
pub struct ScriptedLlm {
    script: Box<Script>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&str, &str) -> Result<String, ReviewError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn delayed<F>(delay: Duration, script: F) -> Arc<Self>
    where
        F: Fn(&str, &str) -> Result<String, ReviewError> + Send + Sync + 'static,
    {
        Arc::new(Self {
            script: Box::new(script),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmAdapter for ScriptedLlm {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn complete(
        &self,
        system: &str,
        human: &str,
        _schema: &Value,
    ) -> Result<StructuredResponse, ReviewError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let raw = (self.script)(system, human)?;
        Ok(StructuredResponse {
            result: schema::parse(&raw)?,
            usage: TokenUsage {
                prompt_tokens: Some(10),
                completion_tokens: Some(2),
                total_tokens: Some(12),
            },
        })
    }
}

/// human 메시지에서 파일명을 꺼낸다.
pub fn file_of(human: &str) -> &str {
    human
        .strip_prefix("File Name: ")
        .and_then(|rest| rest.split('\n').next())
        .unwrap_or("")
}

/// 시스템 지시문으로 어떤 lens 호출인지 판별한다.
pub fn lens_of(system: &str) -> Lens {
    if system.contains("security-focused") {
        Lens::Security
    } else if system.contains("performance-focused") {
        Lens::Performance
    } else if system.contains("maintainability") {
        Lens::Style
    } else {
        Lens::Generic
    }
}

pub fn issue_json(path: &str, line: u32, category: &str) -> String {
    format!(
        r#"{{"file_path":"{path}","line_number":{line},"category":"{category}","severity":"Medium","description":"{path}:{line}","suggestion":""}}"#
    )
}

#[derive(Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _name: &str) {}
    fn kv(&self, _key: &str, _value: &str) {}
    fn status(&self, _scope: &str, _message: &str) {}
    fn lens_status(&self, _lens: Lens, _status: &str, _extra: Option<&str>) {}
    fn raw(&self, _line: &str) {}
}

/// 고정 파일 목록을 돌려주고 게시된 코멘트를 기록하는 게이트웨이.
pub struct FakeGateway {
    pub files: Vec<ChangedFile>,
    pub fail_publish: bool,
    pub posted: Arc<Mutex<Vec<String>>>,
}

impl FakeGateway {
    pub fn new(files: Vec<ChangedFile>) -> Self {
        Self {
            files,
            fail_publish: false,
            posted: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

#[async_trait]
impl VcsGateway for FakeGateway {
    async fn get_pr_files(&self) -> Result<(PrHandle, Vec<ChangedFile>)> {
        let pr = PrHandle {
            owner: "octo".into(),
            repo: "demo".into(),
            number: 7,
            title: "Add feature".into(),
            head_sha: "abc123".into(),
            html_url: "https://github.com/octo/demo/pull/7".into(),
        };
        Ok((pr, self.files.clone()))
    }

    async fn create_comment(&self, body: &str) -> Result<PostedComment> {
        if self.fail_publish {
            bail!("github: failed to create comment (403 Forbidden)");
        }
        let mut posted = self.posted.lock().unwrap_or_else(|e| e.into_inner());
        posted.push(body.to_string());
        Ok(PostedComment {
            id: posted.len().to_string(),
            html_url: None,
        })
    }
}
