pub mod inspect_config;
pub mod review_pr;
