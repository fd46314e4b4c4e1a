use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Backend,
    Parse,
    InvalidTemplate,
    Download,
}

/// Every way a plan or generate request can fail.
///
/// The `Display` output is what ends up in front of the user. For
/// [`ClientError::Backend`] that is the raw response body, untouched, or
/// `HTTP <status>` when the body is blank.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("{}", backend_message(*status, body))]
    Backend { status: u16, body: String },
    #[error("unexpected response from backend: {0}")]
    Parse(String),
    #[error("invalid template: {0}")]
    InvalidTemplate(String),
    #[error("failed to save presentation: {0}")]
    Download(String),
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Backend { .. } => ErrorKind::Backend,
            ClientError::Parse(_) => ErrorKind::Parse,
            ClientError::InvalidTemplate(_) => ErrorKind::InvalidTemplate,
            ClientError::Download(_) => ErrorKind::Download,
        }
    }

    /// HTTP status for backend rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn backend_message(status: u16, body: &str) -> String {
    if body.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_raw_body() {
        let err = ClientError::Backend {
            status: 500,
            body: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "rate limited");
        assert_eq!(err.status(), Some(500));
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[test]
    fn non_backend_errors_have_no_status() {
        assert_eq!(ClientError::Network("refused".into()).status(), None);
        assert_eq!(
            ClientError::Parse("eof".into()).kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn blank_backend_body_falls_back_to_status() {
        let err = ClientError::Backend {
            status: 502,
            body: " \n".into(),
        };
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(
            ClientError::Backend {
                status: 500,
                body: String::new(),
            }
            .to_string(),
            "HTTP 500"
        );
    }
}
