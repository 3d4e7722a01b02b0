//! Adapter for the `anystyle` citation-parsing CLI.

use std::io::Write;
use std::process::Stdio;

use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, instrument};

use super::{ParsedReference, ParserError, ReferenceParser};
use async_trait::async_trait;

/// Default engine command, expected on PATH.
const DEFAULT_PROGRAM: &str = "anystyle";

/// Arguments asking the engine for JSON on stdout; the input file path is
/// appended per call.
const DEFAULT_ARGS: &[&str] = &["--stdout", "-f", "json", "parse"];

/// Invokes the external `anystyle` engine on one citation string.
///
/// The citation text is written to a temp file (the engine parses files, not
/// stdin) and the engine's JSON array output is decoded; the first element is
/// the structured guess for the citation.
#[derive(Debug, Clone)]
pub struct AnystyleParser {
    program: String,
    args: Vec<String>,
}

impl AnystyleParser {
    /// Creates an adapter for the `anystyle` binary on PATH.
    #[must_use]
    pub fn new() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: DEFAULT_ARGS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Creates an adapter with a custom engine command (absolute path or an
    /// alternative engine with a compatible JSON contract).
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::new()
        }
    }

    /// Overrides the engine arguments (the input file path is still appended).
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl Default for AnystyleParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReferenceParser for AnystyleParser {
    #[instrument(skip(self, text), fields(program = %self.program))]
    async fn parse(&self, text: &str) -> Result<ParsedReference, ParserError> {
        let mut input = NamedTempFile::new()?;
        input.write_all(text.as_bytes())?;
        input.flush()?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(input.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| ParserError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ParserError::EngineFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut entries: Vec<ParsedReference> = serde_json::from_slice(&output.stdout)?;
        if entries.is_empty() {
            return Err(ParserError::EmptyOutput);
        }
        let parsed = entries.swap_remove(0);

        debug!(
            authors = parsed.author.len(),
            titles = parsed.title.len(),
            "citation parsed"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Fake engine built on `sh -c`: the appended input file path lands in
    /// `$0` and is ignored by the script.
    fn fake_engine(script: &str) -> AnystyleParser {
        AnystyleParser::with_program("sh").with_args(["-c", script])
    }

    #[tokio::test]
    async fn test_parse_decodes_first_array_element() {
        let parser = fake_engine(
            r#"echo '[{"author":[{"given":"J","family":"Smith"}],"title":["Title Of Paper"]}]'"#,
        );
        let parsed = parser.parse("Smith, J. Title Of Paper. 2001").await.unwrap();
        let (author, title) = parsed.primary_fields().unwrap();
        assert_eq!(author, "J Smith");
        assert_eq!(title, "Title Of Paper");
    }

    #[tokio::test]
    async fn test_parse_empty_fields_is_valid_unparseable_answer() {
        let parser = fake_engine(r#"echo '[{"author":[],"title":[]}]'"#);
        let parsed = parser.parse("garbled ref").await.unwrap();
        assert!(parsed.primary_fields().is_none());
    }

    #[tokio::test]
    async fn test_parse_missing_binary_is_spawn_error() {
        let parser = AnystyleParser::with_program("definitely-not-a-real-engine-binary");
        let err = parser.parse("anything").await.unwrap_err();
        assert!(matches!(err, ParserError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_parse_engine_failure_captures_stderr() {
        let parser = fake_engine("echo boom >&2; exit 3");
        let err = parser.parse("anything").await.unwrap_err();
        match err {
            ParserError::EngineFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("expected EngineFailed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parse_non_json_output_is_invalid_output() {
        let parser = fake_engine("echo not-json-at-all");
        let err = parser.parse("anything").await.unwrap_err();
        assert!(matches!(err, ParserError::InvalidOutput(_)));
    }

    #[tokio::test]
    async fn test_parse_empty_array_is_empty_output() {
        let parser = fake_engine("echo '[]'");
        let err = parser.parse("anything").await.unwrap_err();
        assert!(matches!(err, ParserError::EmptyOutput));
    }

    #[test]
    fn test_default_command_targets_anystyle() {
        let parser = AnystyleParser::new();
        assert_eq!(parser.program, "anystyle");
        assert_eq!(parser.args, vec!["--stdout", "-f", "json", "parse"]);
    }
}
