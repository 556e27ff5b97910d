use thiserror::Error;

/// Why a call to one of the remote services did not produce a usable result.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service reported code {code} ({status})")]
    Service { code: i64, status: String },

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("no API key configured for the guidance service")]
    MissingApiKey,
}

impl FetchError {
    pub fn status(status: u16, body: &str) -> Self {
        FetchError::Status {
            status,
            body: truncate_body(body),
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        match FetchError::status(502, &body) {
            FetchError::Status { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body.chars().count(), 201);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
