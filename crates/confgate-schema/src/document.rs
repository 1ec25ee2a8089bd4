//! # Document Loader
//!
//! Reads a configuration file and parses it into a JSON value tree.
//!
//! ## Format Selection
//!
//! The format is decided before any parse attempt:
//!
//! 1. An explicit [`Format`] hint always wins.
//! 2. Otherwise a `.json`, `.yaml` or `.yml` suffix selects the parser.
//! 3. Otherwise the content is sniffed: JSON first, then YAML.
//!
//! Branches 1 and 2 are strict. A `.json` file holding YAML is a JSON
//! syntax error, never a silent YAML fallback.
//!
//! ## Emptiness
//!
//! A document that parses to a vacuous value (null, `false`, zero, `""`,
//! `[]`, `{}`) is rejected. Such a config carries no data to gate on.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::error::ErrorCategory;
use crate::yaml::{self, YamlError};

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// RFC 8259 JSON.
    Json,
    /// YAML 1.1, safe subset, restricted to what JSON can represent.
    Yaml,
}

impl Format {
    /// Uppercase name used in user-facing messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }

    /// Infer a format from the path suffix.
    ///
    /// Matching is a case-sensitive suffix test on the whole path string,
    /// so `config.JSON` and `config.txt` are both inconclusive.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let path = path.to_string_lossy();
        if path.ends_with(".json") {
            Some(Self::Json)
        } else if path.ends_with(".yaml") || path.ends_with(".yml") {
            Some(Self::Yaml)
        } else {
            None
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Underlying parser failure for one format.
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// `serde_json` rejected the content.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The YAML loader rejected the content.
    #[error(transparent)]
    Yaml(#[from] YamlError),
}

/// Error while loading a configuration document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The path does not resolve to a file.
    #[error("Configuration file not found: {}", .path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
        /// The `NotFound` I/O error.
        #[source]
        source: io::Error,
    },

    /// The content is not valid in the selected format.
    #[error("Invalid {format} format in {}: {source}", .path.display())]
    InvalidSyntax {
        /// Format the content was parsed as.
        format: Format,
        /// Path of the offending file.
        path: PathBuf,
        /// Parser diagnostic.
        #[source]
        source: SyntaxError,
    },

    /// Autodetection saw nothing but whitespace.
    #[error("Configuration file {} is empty.", .path.display())]
    Empty {
        /// Path of the empty file.
        path: PathBuf,
    },

    /// Neither JSON nor YAML accepted the content.
    #[error(
        "Could not determine format of {}. Please specify format using -f/--format.",
        .path.display()
    )]
    FormatUndetermined {
        /// Path of the undetectable file.
        path: PathBuf,
    },

    /// The document parsed to a vacuous value.
    #[error("Configuration file {} is empty or contains no data.", .path.display())]
    NoData {
        /// Path of the vacuous document.
        path: PathBuf,
    },

    /// Any other I/O failure (permissions, directories, non-UTF-8 content).
    #[error("Error reading configuration file: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: io::Error,
    },
}

impl DocumentError {
    /// Taxonomy bucket for this failure.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } | Self::Io { .. } => ErrorCategory::Input,
            Self::InvalidSyntax { .. } | Self::Empty { .. } | Self::FormatUndetermined { .. } => {
                ErrorCategory::Format
            }
            Self::NoData { .. } => ErrorCategory::Emptiness,
        }
    }
}

/// A successfully loaded, non-vacuous configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    path: PathBuf,
    format: Format,
    value: Value,
}

impl ConfigDocument {
    /// Wrap an already parsed value, applying the emptiness check.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NoData`] if `value` is vacuous.
    pub fn from_value(
        path: impl Into<PathBuf>,
        format: Format,
        value: Value,
    ) -> Result<Self, DocumentError> {
        let path = path.into();
        if is_vacuous(&value) {
            return Err(DocumentError::NoData { path });
        }
        Ok(Self {
            path,
            format,
            value,
        })
    }

    /// Path the document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Format the content was parsed as.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Parsed value tree.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the document and returns the value tree.
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Load and parse a configuration file.
///
/// `hint` overrides extension-based selection. When it is `None` and the
/// extension is inconclusive, the content is tried as JSON, then YAML.
///
/// # Errors
///
/// Returns a [`DocumentError`] describing the first failure. No partially
/// loaded document is ever produced.
pub fn load_document(path: &Path, hint: Option<Format>) -> Result<ConfigDocument, DocumentError> {
    let content = read_config(path)?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "read configuration file");

    let (format, value) = match hint.or_else(|| Format::from_extension(path)) {
        Some(format) => {
            let reason = if hint.is_some() { "explicit" } else { "extension" };
            tracing::debug!(%format, reason, "selected configuration format");
            let value =
                parse_as(format, &content).map_err(|source| DocumentError::InvalidSyntax {
                    format,
                    path: path.to_path_buf(),
                    source,
                })?;
            (format, value)
        }
        None => detect(path, &content)?,
    };

    ConfigDocument::from_value(path, format, value)
}

/// Whether a value would coerce to "absent": null, `false`, zero, `""`,
/// `[]` or `{}`.
pub fn is_vacuous(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn read_config(path: &Path) -> Result<String, DocumentError> {
    std::fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DocumentError::NotFound {
            path: path.to_path_buf(),
            source,
        },
        _ => DocumentError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Content sniffing for paths with no recognised extension.
fn detect(path: &Path, content: &str) -> Result<(Format, Value), DocumentError> {
    if content.trim().is_empty() {
        return Err(DocumentError::Empty {
            path: path.to_path_buf(),
        });
    }

    match parse_as(Format::Json, content) {
        Ok(value) => {
            tracing::debug!(format = %Format::Json, reason = "content", "selected configuration format");
            return Ok((Format::Json, value));
        }
        Err(e) => tracing::debug!(error = %e, "content is not JSON, trying YAML"),
    }

    match parse_as(Format::Yaml, content) {
        Ok(value) => {
            tracing::debug!(format = %Format::Yaml, reason = "content", "selected configuration format");
            Ok((Format::Yaml, value))
        }
        Err(e) => {
            tracing::debug!(error = %e, "content is not YAML either");
            Err(DocumentError::FormatUndetermined {
                path: path.to_path_buf(),
            })
        }
    }
}

fn parse_as(format: Format, content: &str) -> Result<Value, SyntaxError> {
    match format {
        Format::Json => Ok(serde_json::from_str(content)?),
        Format::Yaml => Ok(yaml::from_str(content)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn json_extension_parses_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.json", r#"{"a": 1}"#);
        let doc = load_document(&path, None).unwrap();
        assert_eq!(doc.format(), Format::Json);
        assert_eq!(doc.value(), &json!({"a": 1}));
        assert_eq!(doc.path(), path.as_path());
    }

    #[test]
    fn yaml_and_yml_extensions_parse_as_yaml() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["app.yaml", "app.yml"] {
            let path = fixture(&dir, name, "a: 1\nb:\n  - x\n  - y\n");
            let doc = load_document(&path, None).unwrap();
            assert_eq!(doc.format(), Format::Yaml);
            assert_eq!(doc.into_value(), json!({"a": 1, "b": ["x", "y"]}));
        }
    }

    #[test]
    fn json_extension_with_yaml_content_is_json_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.json", "a: 1\n");
        let err = load_document(&path, None).unwrap_err();
        match &err {
            DocumentError::InvalidSyntax { format, .. } => assert_eq!(*format, Format::Json),
            other => panic!("Expected InvalidSyntax, got: {other}"),
        }
        assert_eq!(err.category(), ErrorCategory::Format);
        assert!(err.to_string().starts_with("Invalid JSON format in "));
    }

    #[test]
    fn malformed_yaml_reports_yaml_syntax() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.yml", "a: [1,2");
        let err = load_document(&path, None).unwrap_err();
        let expected = format!("Invalid YAML format in {}: ", path.display());
        assert!(
            err.to_string().starts_with(&expected),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn explicit_hint_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.json", "a: 1\n");
        let doc = load_document(&path, Some(Format::Yaml)).unwrap();
        assert_eq!(doc.format(), Format::Yaml);
        assert_eq!(doc.value(), &json!({"a": 1}));
    }

    #[test]
    fn explicit_json_hint_matches_extension_detection() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.json", r#"{"k": [true, null]}"#);
        let hinted = load_document(&path, Some(Format::Json)).unwrap();
        let inferred = load_document(&path, None).unwrap();
        assert_eq!(hinted, inferred);
    }

    #[test]
    fn explicit_json_hint_rejects_yaml_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.conf", "a: 1\n");
        let err = load_document(&path, Some(Format::Json)).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidSyntax {
                format: Format::Json,
                ..
            }
        ));
    }

    #[test]
    fn autodetect_prefers_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.txt", r#"{"a": "b"}"#);
        let doc = load_document(&path, None).unwrap();
        assert_eq!(doc.format(), Format::Json);
    }

    #[test]
    fn autodetect_falls_back_to_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.conf", "server:\n  port: 8080\n");
        let doc = load_document(&path, None).unwrap();
        assert_eq!(doc.format(), Format::Yaml);
        assert_eq!(doc.value(), &json!({"server": {"port": 8080}}));
    }

    #[test]
    fn autodetect_gives_up_when_neither_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.conf", "key: [unclosed\n  - : :");
        let err = load_document(&path, None).unwrap_err();
        assert!(
            matches!(err, DocumentError::FormatUndetermined { .. }),
            "Expected FormatUndetermined, got: {err}"
        );
        assert!(err.to_string().contains("-f/--format"));
    }

    #[test]
    fn autodetect_rejects_zero_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.conf", "");
        let err = load_document(&path, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Configuration file {} is empty.", path.display())
        );
    }

    #[test]
    fn autodetect_rejects_whitespace_only_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app", "  \n\t\n");
        let err = load_document(&path, None).unwrap_err();
        assert!(matches!(err, DocumentError::Empty { .. }));
    }

    #[test]
    fn empty_json_file_is_syntax_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.json", "");
        let err = load_document(&path, None).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidSyntax { .. }));
    }

    #[test]
    fn vacuous_documents_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in [
            ("a.json", "{}"),
            ("b.json", "[]"),
            ("c.json", "null"),
            ("d.json", "0"),
            ("e.json", "false"),
            ("f.json", r#""""#),
            ("g.yaml", "~\n"),
            ("h.yaml", "{}\n"),
        ] {
            let path = fixture(&dir, name, content);
            let err = load_document(&path, None).unwrap_err();
            assert!(
                matches!(err, DocumentError::NoData { .. }),
                "{name}: expected NoData, got: {err}"
            );
            assert_eq!(err.category(), ErrorCategory::Emptiness);
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = load_document(&path, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Configuration file not found: {}", path.display())
        );
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn directory_path_is_wrapped_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(dir.path(), None).unwrap_err();
        assert!(
            matches!(err, DocumentError::Io { .. }),
            "Expected Io, got: {err}"
        );
        assert!(err.to_string().starts_with("Error reading configuration file: "));
    }

    #[test]
    fn non_utf8_content_is_wrapped_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.json");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let err = load_document(&path, None).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }

    #[test]
    fn extension_matching_is_case_sensitive() {
        assert_eq!(Format::from_extension(Path::new("x.json")), Some(Format::Json));
        assert_eq!(Format::from_extension(Path::new("x.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_extension(Path::new("x.JSON")), None);
        assert_eq!(Format::from_extension(Path::new("x.json.bak")), None);
    }

    #[test]
    fn empty_yaml_file_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in [
            ("a.yaml", ""),
            ("b.yaml", "  \n"),
            ("c.yml", ""),
            ("d.yml", "  \n"),
        ] {
            let path = fixture(&dir, name, content);
            let err = load_document(&path, None).unwrap_err();
            assert!(
                matches!(err, DocumentError::NoData { .. }),
                "{name}: expected NoData, got: {err}"
            );
            assert_eq!(err.category(), ErrorCategory::Emptiness);
        }
    }

    #[test]
    fn yaml_resolves_core_scalars() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(
            &dir,
            "app.yaml",
            "enabled: yes\nmode: 010\nlabel: 'yes'\nport: \"8080\"\n",
        );
        let doc = load_document(&path, None).unwrap();
        assert_eq!(
            doc.value(),
            &json!({"enabled": true, "mode": 8, "label": "yes", "port": "8080"})
        );
    }

    #[test]
    fn yaml_falsy_scalar_document_is_no_data() {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in [("a.yaml", "no\n"), ("b.yml", "off\n"), ("c.yaml", "000\n")] {
            let path = fixture(&dir, name, content);
            let err = load_document(&path, None).unwrap_err();
            assert!(
                matches!(err, DocumentError::NoData { .. }),
                "{name}: expected NoData, got: {err}"
            );
        }
    }

    #[test]
    fn yaml_unrepresentable_value_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "app.yaml", "limit: .inf\n");
        let err = load_document(&path, None).unwrap_err();
        assert!(matches!(
            err,
            DocumentError::InvalidSyntax {
                format: Format::Yaml,
                ..
            }
        ));
        assert_eq!(err.category(), ErrorCategory::Format);
    }

    proptest! {
        #[test]
        fn non_empty_strings_are_never_vacuous(s in ".{1,32}") {
            prop_assert!(!is_vacuous(&Value::String(s)));
        }

        #[test]
        fn only_zero_numbers_are_vacuous(n in any::<i64>()) {
            prop_assert_eq!(is_vacuous(&json!(n)), n == 0);
        }

        #[test]
        fn json_hint_agrees_with_extension_detection(
            entries in proptest::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..5)
        ) {
            let dir = tempfile::tempdir().unwrap();
            let value = serde_json::to_value(&entries).unwrap();
            let path = fixture(&dir, "app.json", &value.to_string());
            let hinted = load_document(&path, Some(Format::Json)).map_err(|e| e.to_string());
            let inferred = load_document(&path, None).map_err(|e| e.to_string());
            prop_assert_eq!(hinted, inferred);
        }

        #[test]
        fn non_empty_objects_are_never_vacuous(key in "[a-z]{1,8}", n in any::<i64>()) {
            let mut map = serde_json::Map::new();
            map.insert(key, json!(n));
            prop_assert!(!is_vacuous(&Value::Object(map)));
        }
    }
}
