use thiserror::Error;

/// Errors that can occur while building or running the guessit pipeline.
#[derive(Debug, Error)]
pub enum GuessitError {
    /// A pattern table, option set or rule graph is invalid.
    ///
    /// Raised when the pipeline is built, never during a guess.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A regex pattern failed to compile.
    #[error("regex compilation error: {0}")]
    RegexError(#[from] regex::Error),

    /// A JSON configuration or options document could not be decoded.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// A rule produced an action referencing a match that does not exist.
    #[error("unknown match id {0}")]
    UnknownMatch(usize),

    /// Any failure raised while guessing a single input.
    ///
    /// Carries everything needed to reproduce the failure.
    #[error(
        "An internal error has occurred in guessit.\n\
         ===================== Guessit Exception Report =====================\n\
         version={version}\n\
         string={input}\n\
         options={options}\n\
         --------------------------------------------------------------------\n\
         {message}\n\
         --------------------------------------------------------------------\n\
         {traceback}\n\
         --------------------------------------------------------------------\n\
         Please report at https://github.com/enrell/guessit-rs/issues."
    )]
    Internal {
        /// Crate version that produced the failure.
        version: &'static str,
        /// The input string being guessed.
        input: String,
        /// The options, serialized as JSON.
        options: String,
        /// The underlying cause.
        message: String,
        /// Backtrace captured where the failure surfaced.
        traceback: String,
    },
}

/// Result type alias for guessit operations.
pub type Result<T> = std::result::Result<T, GuessitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = GuessitError::Configuration("groups mismatch".into());
        assert_eq!(err.to_string(), "configuration error: groups mismatch");

        let err = GuessitError::UnknownMatch(42);
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn internal_error_reports_context() {
        let err = GuessitError::Internal {
            version: "0.1.3",
            input: "Show.S01E02.mkv".into(),
            options: "{}".into(),
            message: "boom".into(),
            traceback: "0: guessit_core::rules::run".into(),
        };
        let text = err.to_string();
        assert!(text.contains("version=0.1.3"));
        assert!(text.contains("string=Show.S01E02.mkv"));
        assert!(text.contains("boom"));
        assert!(text.contains("0: guessit_core::rules::run"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GuessitError>();
    }
}
