use thiserror::Error;

#[derive(Error, Debug)]
pub enum PpvError {
    #[error("package '{package}' not found ({endpoint})")]
    NotFound { package: String, endpoint: String },

    #[error("network failure fetching '{package}' from {endpoint}: {reason}")]
    Network {
        package: String,
        endpoint: String,
        reason: String,
    },

    #[error("failed to parse index response for '{package}' from {endpoint}: {reason}")]
    Parse {
        package: String,
        endpoint: String,
        reason: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{failed} of {total} package(s) failed")]
    Partial {
        failed: usize,
        total: usize,
        code: i32,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PpvError {
    /// Process exit code for this error: 2 not found, 3 network,
    /// 4 parse, 1 everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => 2,
            Self::Network { .. } => 3,
            Self::Parse { .. } => 4,
            Self::Partial { code, .. } => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, PpvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_taxonomy() {
        let not_found = PpvError::NotFound {
            package: "requests".into(),
            endpoint: "https://pypi.org/pypi/requests/json".into(),
        };
        assert_eq!(not_found.exit_code(), 2);

        let network = PpvError::Network {
            package: "requests".into(),
            endpoint: "https://pypi.org/pypi/requests/json".into(),
            reason: "request timed out".into(),
        };
        assert_eq!(network.exit_code(), 3);

        let parse = PpvError::Parse {
            package: "requests".into(),
            endpoint: "https://pypi.org/pypi/requests/json".into(),
            reason: "expected value at line 1".into(),
        };
        assert_eq!(parse.exit_code(), 4);

        assert_eq!(PpvError::InvalidArgument("empty name".into()).exit_code(), 1);
        assert_eq!(
            PpvError::Internal(anyhow::anyhow!("client construction failed")).exit_code(),
            1
        );
        assert_eq!(
            PpvError::Partial {
                failed: 1,
                total: 3,
                code: 3
            }
            .exit_code(),
            3
        );
    }

    #[test]
    fn error_messages_name_package_and_endpoint() {
        let e = PpvError::NotFound {
            package: "pandas".into(),
            endpoint: "https://pypi.org/pypi/pandas/json".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("pandas"));
        assert!(msg.contains("https://pypi.org/pypi/pandas/json"));
    }
}
