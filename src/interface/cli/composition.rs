//! 애플리케이션 조립(composition root) 모듈.

use crate::application::usecases::inspect_config::InspectConfigUseCase;
use crate::application::usecases::review_pr::ReviewPrUseCase;
use crate::infrastructure::adapters::{
    ConsoleReporter, FileSystemPromptResolver, GitHubTargetResolver, HostTokenResolverAdapter,
    JsonConfigRepository, LlmFactoryAdapter, MarkdownRendererAdapter, VcsFactoryAdapter,
};

/// 실행 시점 의존성을 한 곳에서 조립하는 컨테이너.
pub struct AppComposition {
    config_repo: JsonConfigRepository,
    host_token_resolver: HostTokenResolverAdapter,
    system_prompt_resolver: FileSystemPromptResolver,
    target_resolver: GitHubTargetResolver,
    vcs_factory: VcsFactoryAdapter,
    llm_factory: LlmFactoryAdapter,
    renderer: MarkdownRendererAdapter,
    reporter: ConsoleReporter,
}

impl Default for AppComposition {
    fn default() -> Self {
        Self::new(false)
    }
}

impl AppComposition {
    /// `quiet`이면 진행 상황 출력을 끈 리포터로 조립한다.
    pub fn new(quiet: bool) -> Self {
        Self {
            config_repo: JsonConfigRepository,
            host_token_resolver: HostTokenResolverAdapter,
            system_prompt_resolver: FileSystemPromptResolver,
            target_resolver: GitHubTargetResolver,
            vcs_factory: VcsFactoryAdapter,
            llm_factory: LlmFactoryAdapter,
            renderer: MarkdownRendererAdapter,
            reporter: ConsoleReporter::new(quiet),
        }
    }

    /// 설정 점검 유스케이스를 생성한다.
    pub fn inspect_config_usecase(&self) -> InspectConfigUseCase<'_> {
        InspectConfigUseCase {
            config_repo: &self.config_repo,
        }
    }

    /// 리뷰 실행 유스케이스를 생성한다.
    pub fn review_usecase(&self) -> ReviewPrUseCase<'_> {
        ReviewPrUseCase {
            config_repo: &self.config_repo,
            host_token_resolver: &self.host_token_resolver,
            system_prompt_resolver: &self.system_prompt_resolver,
            target_resolver: &self.target_resolver,
            vcs_factory: &self.vcs_factory,
            llm_factory: &self.llm_factory,
            renderer: &self.renderer,
            reporter: &self.reporter,
        }
    }
}
