//! Error types for the citation-string parser adapter.

use thiserror::Error;

/// Errors produced by the external parser engine adapter.
#[derive(Debug, Error)]
pub enum ParserError {
    /// Failed to write the citation text for the engine to read.
    #[error("I/O error preparing parser input: {0}")]
    Io(#[from] std::io::Error),

    /// The engine binary could not be spawned.
    #[error("failed to spawn parser engine '{program}': {source}")]
    Spawn {
        /// The configured engine command.
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The engine exited with a failure status.
    #[error("parser engine exited with {status}: {stderr}")]
    EngineFailed {
        /// The process exit status.
        status: std::process::ExitStatus,
        /// Captured stderr, trimmed.
        stderr: String,
    },

    /// The engine's stdout was not the expected JSON array.
    #[error("unexpected parser engine output: {0}")]
    InvalidOutput(#[from] serde_json::Error),

    /// The engine produced an empty result array.
    #[error("parser engine returned no entries for the citation")]
    EmptyOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_names_program() {
        let err = ParserError::Spawn {
            program: "anystyle".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = err.to_string();
        assert!(msg.contains("anystyle"));
        assert!(msg.contains("spawn"));
    }

    #[test]
    fn test_empty_output_message() {
        let msg = ParserError::EmptyOutput.to_string();
        assert!(msg.contains("no entries"));
    }
}
