//! `prlens` 바이너리 진입점.

use prlens::interface::cli::{
    AppComposition, Cli, CliAction, EXIT_FAILURE, EXIT_PUBLISH, EXIT_USAGE, exit_code_for,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let action = match Cli::parse_action() {
        Ok(action) => action,
        Err(msg) => {
            eprintln!("error: {msg}");
            std::process::exit(EXIT_USAGE);
        }
    };

    match action {
        CliAction::InspectConfig => {
            let composition = AppComposition::default();
            match composition.inspect_config_usecase().execute() {
                Ok(json) => println!("{json}"),
                Err(err) => {
                    eprintln!("error: {err:#}");
                    std::process::exit(EXIT_FAILURE);
                }
            }
        }
        CliAction::Review { options, quiet } => {
            let composition = AppComposition::new(quiet);
            match composition.review_usecase().execute(options).await {
                Ok(outcome) => {
                    if let Some(err) = outcome.publish_error {
                        // 게시에 실패해도 계산된 리포트는 잃지 않도록 stdout에 남긴다.
                        println!("{}", outcome.report);
                        eprintln!("error: {err}");
                        std::process::exit(EXIT_PUBLISH);
                    }
                }
                Err(err) => {
                    eprintln!("error: {err:#}");
                    std::process::exit(exit_code_for(&err));
                }
            }
        }
    }
}
