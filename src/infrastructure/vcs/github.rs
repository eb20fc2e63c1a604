//! GitHub API 연동 구현(Diff Source + 리포트 게시).

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::application::ports::VcsGateway;
use crate::domain::error::ReviewError;
use crate::domain::review::{ChangedFile, PostedComment, PrHandle};
use crate::domain::target::DEFAULT_HOST;

const PER_PAGE: usize = 100;
/// GitHub는 PR당 최대 3000개 파일까지만 돌려준다.
const MAX_PAGES: usize = 30;
const USER_AGENT: &str = concat!("prlens/", env!("CARGO_PKG_VERSION"));

pub struct GitHubClient {
    client: Client,
    host: String,
    owner: String,
    repo: String,
    number: u64,
    token: Option<String>,
    api_base: Option<String>,
}

impl GitHubClient {
    /// GitHub 대상 클라이언트를 생성한다.
    pub fn new(
        host: String,
        owner: String,
        repo: String,
        number: u64,
        token: Option<String>,
        api_base: Option<String>,
    ) -> Self {
        Self::with_client(Client::new(), host, owner, repo, number, token, api_base)
    }

    pub fn with_client(
        client: Client,
        host: String,
        owner: String,
        repo: String,
        number: u64,
        token: Option<String>,
        api_base: Option<String>,
    ) -> Self {
        Self {
            client,
            host,
            owner,
            repo,
            number,
            token,
            api_base,
        }
    }

    fn api_base(&self) -> String {
        // github.com은 공개 API, 그 외는 Enterprise 기본 경로를 사용한다.
        if let Some(base) = &self.api_base {
            return base.trim_end_matches('/').to_string();
        }
        if self.host == DEFAULT_HOST {
            "https://api.github.com".to_string()
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }

    fn repo_endpoint(&self) -> String {
        format!("{}/repos/{}/{}", self.api_base(), self.owner, self.repo)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        // 공통 헤더/인증 적용.
        let req = self
            .client
            .request(method, url)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json");

        if let Some(token) = &self.token {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    async fn fetch_pull(&self) -> Result<PrHandle> {
        let url = format!("{}/pulls/{}", self.repo_endpoint(), self.number);
        let resp = self
            .request(Method::GET, url)
            .send()
            .await
            .context("github: failed to fetch PR")?;

        let status = resp.status();
        let body = resp.text().await.context("github: failed to read PR body")?;
        if status == StatusCode::NOT_FOUND {
            return Err(ReviewError::Input(format!(
                "{}/{}#{} not found on {} (check the repository, PR number and token scope)",
                self.owner, self.repo, self.number, self.host
            ))
            .into());
        }
        if !status.is_success() {
            bail!("github: failed to fetch PR metadata ({status}): {body}");
        }

        let pr: PullResponse = serde_json::from_str(&body).context("github: invalid PR JSON")?;
        Ok(PrHandle {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            number: self.number,
            title: pr.title,
            head_sha: pr.head.sha,
            html_url: pr.html_url,
        })
    }

    async fn fetch_files_page(&self, page: usize) -> Result<Vec<PullFile>> {
        let url = format!("{}/pulls/{}/files", self.repo_endpoint(), self.number);
        let resp = self
            .request(Method::GET, url)
            .query(&[("per_page", PER_PAGE), ("page", page)])
            .send()
            .await
            .context("github: failed to list PR files")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("github: failed to read PR files body")?;
        if !status.is_success() {
            bail!("github: failed to list PR files ({status}): {body}");
        }

        serde_json::from_str(&body).context("github: invalid PR files JSON")
    }
}

#[derive(Debug, Deserialize)]
struct PullResponse {
    title: String,
    html_url: String,
    head: PullHead,
}

#[derive(Debug, Deserialize)]
struct PullHead {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullFile {
    filename: String,
    status: String,
    patch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueCommentResponse {
    id: u64,
    html_url: Option<String>,
}

#[async_trait]
impl VcsGateway for GitHubClient {
    async fn get_pr_files(&self) -> Result<(PrHandle, Vec<ChangedFile>)> {
        let pr = self.fetch_pull().await?;

        let mut files = Vec::new();
        let mut skipped = 0usize;
        for page in 1..=MAX_PAGES {
            let batch = self.fetch_files_page(page).await?;
            let last_page = batch.len() < PER_PAGE;

            for file in batch {
                // 삭제 파일과 patch가 없는(바이너리/대용량) 파일은 리뷰 대상이 아니다.
                match file.patch {
                    Some(patch) if file.status != "removed" => {
                        files.push(ChangedFile::new(file.filename, patch));
                    }
                    _ => skipped += 1,
                }
            }

            if last_page {
                break;
            }
        }

        debug!(files = files.len(), skipped, "github: fetched PR files");
        Ok((pr, files))
    }

    async fn create_comment(&self, body: &str) -> Result<PostedComment> {
        let url = format!("{}/issues/{}/comments", self.repo_endpoint(), self.number);
        let resp = self
            .request(Method::POST, url)
            .json(&json!({ "body": body }))
            .send()
            .await
            .context("github: failed to create comment")?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("github: failed to read create-comment body")?;

        if !status.is_success() {
            bail!("github: failed to create comment ({status}): {body}");
        }

        let comment: IssueCommentResponse =
            serde_json::from_str(&body).context("github: invalid create-comment JSON")?;
        Ok(PostedComment {
            id: comment.id.to_string(),
            html_url: comment.html_url,
        })
    }
}
