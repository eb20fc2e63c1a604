//! Pipeline Orchestrator: Reviewer Unit들을 전체 파일에 적용하고 결과를 병합한다.
//!
//! (lens, file) 쌍은 서로 독립된 작업이고 모두 `aggregate` 하나로 모인다.
//! 완료 순서와 무관하게 lens 순서 → 파일 순서로 병합한다.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::ports::{LlmAdapter, Reporter};
use crate::application::usecases::review_pr::reviewer::{FileReview, ReviewerUnit};
use crate::domain::lens::{Lens, Topology};
use crate::domain::policy::aggregate;
use crate::domain::review::{ChangedFile, FileSummary, Issue, TokenUsage};

/// 실패한 (file, lens) 호출 기록.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailure {
    pub lens: Lens,
    pub file_path: String,
    pub error: String,
}

/// 파이프라인 1회 실행 결과.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub issues: Vec<Issue>,
    pub summaries: Vec<FileSummary>,
    pub failures: Vec<CallFailure>,
    pub usage: Vec<(Lens, TokenUsage)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Scanning,
    Aggregate,
    Done,
}

impl Stage {
    fn next(self) -> Option<Stage> {
        match self {
            Stage::Start => Some(Stage::Scanning),
            Stage::Scanning => Some(Stage::Aggregate),
            Stage::Aggregate => Some(Stage::Done),
            Stage::Done => None,
        }
    }
}

/// 상태 기계가 거부한 조작.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("illegal pipeline transition {from:?} -> {to:?}")]
    IllegalTransition { from: Stage, to: Stage },
    #[error("{op} is not allowed in stage {stage:?}")]
    WrongStage { op: &'static str, stage: Stage },
    #[error("result slot ({lens_idx}, {file_idx}) does not exist")]
    UnknownSlot { lens_idx: usize, file_idx: usize },
    #[error("result slot ({lens_idx}, {file_idx}) written twice")]
    SlotTaken { lens_idx: usize, file_idx: usize },
    #[error("final issues already aggregated")]
    AlreadyAggregated,
}

/// lens 하나가 단독으로 소유하는 결과 버킷. 슬롯은 파일 위치 순서다.
struct LensBucket {
    lens: Lens,
    slots: Vec<Option<FileReview>>,
}

/// 실행마다 새로 만들어지는 파이프라인 상태.
pub struct PipelineState<'a> {
    pub repo_name: String,
    pub pr_number: u64,
    files: &'a [ChangedFile],
    buckets: Vec<LensBucket>,
    final_issues: Option<Vec<Issue>>,
    stage: Stage,
}

impl<'a> PipelineState<'a> {
    fn new(repo_name: &str, pr_number: u64, files: &'a [ChangedFile], lenses: &[Lens]) -> Self {
        let buckets = lenses
            .iter()
            .map(|lens| LensBucket {
                lens: *lens,
                slots: (0..files.len()).map(|_| None).collect(),
            })
            .collect();

        Self {
            repo_name: repo_name.to_string(),
            pr_number,
            files,
            buckets,
            final_issues: None,
            stage: Stage::Start,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn final_issues(&self) -> Option<&[Issue]> {
        self.final_issues.as_deref()
    }

    /// 선형 전이만 허용한다(start → scanning → aggregate → done).
    /// 거부된 전이는 상태를 바꾸지 않는다.
    fn advance(&mut self, to: Stage) -> Result<(), StageError> {
        if self.stage.next() != Some(to) {
            return Err(StageError::IllegalTransition {
                from: self.stage,
                to,
            });
        }
        debug!(from = ?self.stage, to = ?to, "pipeline stage");
        self.stage = to;
        Ok(())
    }

    /// 슬롯은 scanning 단계에서 한 번만 쓸 수 있다.
    fn record(
        &mut self,
        lens_idx: usize,
        file_idx: usize,
        review: FileReview,
    ) -> Result<(), StageError> {
        if self.stage != Stage::Scanning {
            return Err(StageError::WrongStage {
                op: "record",
                stage: self.stage,
            });
        }
        let slot = self
            .buckets
            .get_mut(lens_idx)
            .and_then(|bucket| bucket.slots.get_mut(file_idx))
            .ok_or(StageError::UnknownSlot { lens_idx, file_idx })?;
        if slot.is_some() {
            return Err(StageError::SlotTaken { lens_idx, file_idx });
        }
        *slot = Some(review);
        Ok(())
    }

    /// lens의 (완료 수, 실패 수).
    fn progress(&self, lens_idx: usize) -> (usize, usize) {
        let Some(bucket) = self.buckets.get(lens_idx) else {
            return (0, 0);
        };
        bucket
            .slots
            .iter()
            .flatten()
            .fold((0, 0), |(done, failed), review| {
                (done + 1, failed + usize::from(review.failure.is_some()))
            })
    }

    /// 모든 버킷을 읽는 유일한 단계. `final_issues`는 여기서 한 번만 쓰인다.
    fn aggregate(&mut self) -> Result<PipelineOutcome, StageError> {
        if self.stage != Stage::Aggregate {
            return Err(StageError::WrongStage {
                op: "aggregate",
                stage: self.stage,
            });
        }
        if self.final_issues.is_some() {
            return Err(StageError::AlreadyAggregated);
        }

        let mut lens_issues: Vec<Vec<Issue>> = Vec::with_capacity(self.buckets.len());
        let mut summaries = Vec::new();
        let mut failures = Vec::new();
        let mut usage = Vec::with_capacity(self.buckets.len());

        for bucket in &self.buckets {
            let mut issues = Vec::new();
            let mut lens_usage = TokenUsage::default();

            for (file, slot) in self.files.iter().zip(&bucket.slots) {
                let Some(review) = slot else {
                    continue;
                };
                issues.extend(review.issues.iter().cloned());
                lens_usage.add_from(&review.usage);

                let summary = review.summary.trim();
                if !summary.is_empty() {
                    summaries.push(FileSummary {
                        lens: bucket.lens,
                        file_path: file.path.clone(),
                        text: summary.to_string(),
                    });
                }
                if let Some(error) = &review.failure {
                    failures.push(CallFailure {
                        lens: bucket.lens,
                        file_path: file.path.clone(),
                        error: error.clone(),
                    });
                }
            }

            lens_issues.push(issues);
            usage.push((bucket.lens, lens_usage));
        }

        let merged = aggregate(&lens_issues);
        debug_assert!(
            merged
                .iter()
                .all(|issue| self.files.iter().any(|f| f.path == issue.file_path)),
            "issue references a file outside this run"
        );
        self.final_issues = Some(merged.clone());

        Ok(PipelineOutcome {
            issues: merged,
            summaries,
            failures,
            usage,
        })
    }
}

pub struct ReviewPipeline {
    units: Vec<ReviewerUnit>,
    max_concurrency: usize,
}

impl ReviewPipeline {
    /// 병합 순서대로 정렬된 unit 목록으로 파이프라인을 만든다.
    pub fn new(units: Vec<ReviewerUnit>, max_concurrency: usize) -> Self {
        Self {
            units,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 토폴로지의 lens마다 같은 어댑터를 공유하는 unit을 만든다.
    pub fn for_topology(
        topology: Topology,
        llm: Arc<dyn LlmAdapter>,
        review_guide: Option<&str>,
        call_timeout: Duration,
        max_concurrency: usize,
    ) -> Self {
        let units = topology
            .lenses()
            .into_iter()
            .map(|lens| ReviewerUnit::new(lens.config(), llm.clone(), review_guide, call_timeout))
            .collect();
        Self::new(units, max_concurrency)
    }

    pub fn lenses(&self) -> Vec<Lens> {
        self.units.iter().map(ReviewerUnit::lens).collect()
    }

    /// (file, lens)마다 최대 한 번 호출한다. 개별 실패는 결과에만 기록되고 실행은 계속된다.
    pub async fn run(
        &self,
        repo_name: &str,
        pr_number: u64,
        files: &[ChangedFile],
        reporter: &dyn Reporter,
    ) -> PipelineOutcome {
        let lenses = self.lenses();
        let mut state = PipelineState::new(repo_name, pr_number, files, &lenses);
        match self.scan(&mut state, &lenses, reporter).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "pipeline state machine refused an operation");
                PipelineOutcome::default()
            }
        }
    }

    async fn scan(
        &self,
        state: &mut PipelineState<'_>,
        lenses: &[Lens],
        reporter: &dyn Reporter,
    ) -> Result<PipelineOutcome, StageError> {
        let files = state.files;
        let total = files.len();

        state.advance(Stage::Scanning)?;
        info!(
            repo = %state.repo_name,
            pr = state.pr_number,
            files = total,
            lenses = lenses.len(),
            concurrency = self.max_concurrency,
            "starting review scan"
        );
        for lens in lenses {
            reporter.lens_status(*lens, "running", Some(&format!("0/{total}")));
        }

        // lens-major 순서로 작업을 나열한다. 동시성 1이면 이 순서대로 실행된다.
        let tasks = self.units.iter().enumerate().flat_map(|(lens_idx, unit)| {
            files
                .iter()
                .enumerate()
                .map(move |(file_idx, file)| async move {
                    (lens_idx, file_idx, unit.review(file).await)
                })
        });

        let mut results = stream::iter(tasks).buffer_unordered(self.max_concurrency);
        while let Some((lens_idx, file_idx, review)) = results.next().await {
            state.record(lens_idx, file_idx, review)?;

            let (done, failed) = state.progress(lens_idx);
            let status = match (done == total, failed) {
                (false, _) => "running",
                (true, 0) => "done",
                (true, _) => "degraded",
            };
            let extra = if failed > 0 {
                format!("{done}/{total}, {failed} failed")
            } else {
                format!("{done}/{total}")
            };
            reporter.lens_status(lenses[lens_idx], status, Some(&extra));
        }

        state.advance(Stage::Aggregate)?;
        let outcome = state.aggregate()?;
        state.advance(Stage::Done)?;

        info!(
            issues = outcome.issues.len(),
            failed_calls = outcome.failures.len(),
            "review scan complete"
        );
        Ok(outcome)
    }
}
