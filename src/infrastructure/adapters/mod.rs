//! 애플리케이션 포트를 실제 인프라 구현체로 연결하는 어댑터 계층.

mod config_repository;
mod host_token_resolver;
mod llm_factory;
mod markdown_renderer;
mod reporter;
mod system_prompt_resolver;
mod target_resolver;
mod vcs_factory;

pub use config_repository::JsonConfigRepository;
pub use host_token_resolver::HostTokenResolverAdapter;
pub use llm_factory::LlmFactoryAdapter;
pub use markdown_renderer::MarkdownRendererAdapter;
pub use reporter::ConsoleReporter;
pub use system_prompt_resolver::FileSystemPromptResolver;
pub use target_resolver::GitHubTargetResolver;
pub use vcs_factory::VcsFactoryAdapter;
