//! 입력값을 GitHub PR 대상으로 해석하는 모듈.
//!
//! 지원 형식: `owner/repo` + 번호, `owner/repo#123`, `https://<host>/owner/repo/pull/123`.

use url::Url;

use crate::domain::error::ReviewError;

pub const DEFAULT_HOST: &str = "github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewTarget {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl ReviewTarget {
    /// 입력 형식을 감지해 대상을 만든다. 네트워크 호출 전에 실패해야 한다.
    pub fn parse(input: &str, pr_number: Option<u64>) -> Result<Self, ReviewError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ReviewError::Input("repository identifier is empty".into()));
        }
        if pr_number == Some(0) {
            return Err(ReviewError::Input("invalid PR number '0'".into()));
        }

        let target = if input.starts_with("http://") || input.starts_with("https://") {
            parse_url(input)?
        } else if let Some((repo_name, number)) = input.split_once('#') {
            let number = parse_number(number)?;
            from_repo_name(repo_name, number)?
        } else {
            let number = pr_number.ok_or_else(|| {
                ReviewError::Input(format!("missing PR number for '{input}'"))
            })?;
            from_repo_name(input, number)?
        };

        if let Some(explicit) = pr_number
            && explicit != target.number
        {
            return Err(ReviewError::Input(format!(
                "PR number {explicit} conflicts with #{} in '{input}'",
                target.number
            )));
        }

        Ok(target)
    }

    pub fn repo_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

fn parse_url(input: &str) -> Result<ReviewTarget, ReviewError> {
    let url = Url::parse(input).map_err(|e| ReviewError::Input(format!("invalid URL: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| ReviewError::Input("URL host is missing".into()))?
        .to_string();

    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    // /owner/repo/pull/<number>
    if segments.len() < 4 || segments[2] != "pull" {
        return Err(ReviewError::Input(format!(
            "unsupported PR URL format: {input}"
        )));
    }

    let number = parse_number(segments[3])?;
    let mut target = from_repo_name(&format!("{}/{}", segments[0], segments[1]), number)?;
    target.host = host;
    Ok(target)
}

fn from_repo_name(repo_name: &str, number: u64) -> Result<ReviewTarget, ReviewError> {
    let mut parts = repo_name.trim().split('/');
    let (Some(owner), Some(repo), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ReviewError::Input(format!(
            "expected 'owner/repo', got '{repo_name}'"
        )));
    };

    for part in [owner, repo] {
        if !is_valid_name(part) {
            return Err(ReviewError::Input(format!(
                "invalid repository identifier '{repo_name}'"
            )));
        }
    }

    Ok(ReviewTarget {
        host: DEFAULT_HOST.to_string(),
        owner: owner.to_string(),
        repo: repo.to_string(),
        number,
    })
}

fn is_valid_name(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn parse_number(raw: &str) -> Result<u64, ReviewError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ReviewError::Input(format!("invalid PR number '{raw}'"))),
    }
}
