//! Error types shared across FrameCue crates.

/// Top-level error type for FrameCue operations.
#[derive(Debug, thiserror::Error)]
pub enum FramecueError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using FramecueError.
pub type FramecueResult<T> = Result<T, FramecueError>;

impl FramecueError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FramecueError::config("unknown keystroke mode 'loud'");
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown keystroke mode 'loud'"
        );
    }

    #[test]
    fn test_io_and_json_errors_convert() {
        fn io_fails() -> FramecueResult<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        fn json_fails() -> FramecueResult<serde_json::Value> {
            Ok(serde_json::from_str("{ nope")?)
        }
        assert!(matches!(io_fails(), Err(FramecueError::Io(_))));
        assert!(matches!(json_fails(), Err(FramecueError::Json(_))));
    }
}
