//! CLI 인터페이스 모듈 묶음.
//! 입력 파싱/조립/종료 코드 결정을 한 네임스페이스로 관리한다.

pub mod command;
pub mod composition;

use crate::domain::error::ReviewError;

pub use command::{Cli, CliAction};
pub use composition::AppComposition;

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_PUBLISH: i32 = 3;

/// 오류 체인에서 도메인 오류를 찾아 종료 코드를 정한다.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    let review_error = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ReviewError>());
    match review_error {
        Some(ReviewError::Input(_)) => EXIT_USAGE,
        Some(ReviewError::Publish(_)) => EXIT_PUBLISH,
        _ => EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn input_errors_map_to_usage_exit() {
        let err = anyhow::Error::from(ReviewError::Input("bad target".into()));
        assert_eq!(exit_code_for(&err), EXIT_USAGE);
    }

    #[test]
    fn wrapped_errors_are_found_in_chain() {
        let err: anyhow::Error = Err::<(), _>(ReviewError::Publish("403".into()))
            .context("posting review")
            .unwrap_err();
        assert_eq!(exit_code_for(&err), EXIT_PUBLISH);
    }

    #[test]
    fn other_errors_are_runtime_failures() {
        let err = anyhow::anyhow!("network down");
        assert_eq!(exit_code_for(&err), EXIT_FAILURE);
    }
}
