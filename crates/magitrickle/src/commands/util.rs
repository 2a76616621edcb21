//! Shared helpers for command handlers.

use std::path::Path;

use magitrickle_api::{RuleRequest, RuleSetDocument};

use crate::error::CliError;

/// Read a rule-set document for `rule replace --file`.
///
/// Accepts a bare array of rules or the `{"rules": [...]}` envelope.
pub fn read_rule_set(path: &Path) -> Result<Vec<RuleRequest>, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("cannot read {}: {e}", path.display()),
    })?;
    let doc: RuleSetDocument = serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("invalid rule set in {}: {e}", path.display()),
    })?;
    Ok(doc.into_rules())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        std::fs::write(file.path(), contents).expect("write");
        file
    }

    #[test]
    fn reads_bare_array_and_envelope() {
        let rule = r#"{"name":"a","type":"domain","rule":"a.example","enable":true}"#;
        let bare = write(&format!("[{rule}]"));
        let envelope = write(&format!(r#"{{"rules":[{rule}]}}"#));

        let from_bare = read_rule_set(bare.path()).expect("bare");
        let from_envelope = read_rule_set(envelope.path()).expect("envelope");
        assert_eq!(from_bare, from_envelope);
        assert_eq!(from_bare[0].rule_type, "domain");
    }

    #[test]
    fn empty_array_is_valid() {
        let file = write("[]");
        assert!(read_rule_set(file.path()).expect("empty").is_empty());
    }

    #[test]
    fn malformed_file_is_usage_error() {
        let file = write("{not json");
        let err = read_rule_set(file.path()).expect_err("malformed");
        assert_eq!(err.exit_code(), crate::error::exit_code::USAGE);
    }

    #[test]
    fn missing_file_is_usage_error() {
        let err = read_rule_set(Path::new("/nonexistent/rules.json")).expect_err("missing");
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
