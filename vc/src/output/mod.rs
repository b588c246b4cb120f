//! Printable payloads and the printer that renders them
//!
//! A [`Printable`] carries optional content, the structural kind of that
//! content, and the stream it belongs on. The [`Printer`] turns it into text
//! for the output format chosen once per invocation.

use std::io::{self, Write};

use colored::Colorize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

mod csv;

/// Structural kind of a payload's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// A single mapping
    Object,
    /// An ordered sequence of mappings sharing one key set
    List,
    /// A string, emitted verbatim in every format
    Plaintext,
}

/// Stream a payload is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    Stderr,
}

/// Result of one command, ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Printable {
    pub content: Option<Value>,
    pub kind: ContentKind,
    pub destination: Destination,
}

impl Printable {
    pub fn stdout(content: Value, kind: ContentKind) -> Self {
        Self {
            content: Some(content),
            kind,
            destination: Destination::Stdout,
        }
    }

    pub fn stderr(content: Value, kind: ContentKind) -> Self {
        Self {
            content: Some(content),
            kind,
            destination: Destination::Stderr,
        }
    }

    /// Plain text for stdout
    pub fn message(text: impl Into<String>) -> Self {
        Self::stdout(Value::String(text.into()), ContentKind::Plaintext)
    }

    /// Plain text for stderr
    pub fn error(text: impl Into<String>) -> Self {
        Self::stderr(Value::String(text.into()), ContentKind::Plaintext)
    }

    /// Nothing to print
    pub fn empty() -> Self {
        Self {
            content: None,
            kind: ContentKind::Plaintext,
            destination: Destination::Stderr,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

/// Output format, chosen once per invocation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(format!("Unknown format: {}. Use: json or csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Errors raised while rendering a payload
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: &'static str },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Name of a JSON value's type, for error messages
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

/// Renders printables in one output format and writes them out
#[derive(Debug, Clone)]
pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    pub fn new(format: OutputFormat) -> Self {
        debug!(%format, "Printer::new: called");
        Self { format }
    }

    /// Render a printable to text
    ///
    /// Absent content renders to an empty string. Plaintext payloads are
    /// returned verbatim whatever the format.
    pub fn render(&self, printable: &Printable) -> Result<String, RenderError> {
        debug!(?printable.kind, format = %self.format, "render: called");
        let Some(content) = &printable.content else {
            return Ok(String::new());
        };

        if printable.kind == ContentKind::Plaintext {
            return plaintext(content);
        }

        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(content)?),
            OutputFormat::Csv => csv::render(content, printable.kind),
        }
    }

    /// Render a printable and write it, plus a newline, to its stream
    pub fn emit(&self, printable: &Printable) {
        let stdout = io::stdout();
        let stderr = io::stderr();
        if let Err(e) = self.emit_to(printable, &mut stdout.lock(), &mut stderr.lock()) {
            warn!(error = %e, "emit: failed to write output");
        }
    }

    /// Same as [`Printer::emit`] with explicit streams
    pub fn emit_to<'a>(
        &self,
        printable: &Printable,
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
    ) -> io::Result<()> {
        if printable.is_empty() {
            debug!("emit_to: nothing to print");
            return Ok(());
        }

        match self.render(printable) {
            Ok(text) => {
                let target = match printable.destination {
                    Destination::Stdout => out,
                    Destination::Stderr => err,
                };
                writeln!(target, "{}", text)?;
                target.flush()
            }
            Err(e) => {
                debug!(error = %e, "emit_to: render failed");
                writeln!(err, "Error: {}", e)?;
                err.flush()
            }
        }
    }

    /// Progress line on stderr, kept out of the rendered result stream
    pub fn status(&self, text: &str) {
        eprintln!("{}", text.dimmed());
    }
}

fn plaintext(content: &Value) -> Result<String, RenderError> {
    match content {
        Value::String(text) => Ok(text.clone()),
        other => Err(RenderError::TypeMismatch {
            expected: "string",
            found: value_type_name(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn emit_capture(printer: &Printer, printable: &Printable) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        printer.emit_to(printable, &mut out, &mut err).unwrap();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn test_render_json_object() {
        let printer = Printer::new(OutputFormat::Json);
        let printable = Printable::stdout(json!({"id": "acct1", "name": "Acme"}), ContentKind::Object);

        let text = printer.render(&printable).unwrap();
        assert_eq!(text, "{\n  \"id\": \"acct1\",\n  \"name\": \"Acme\"\n}");

        let parsed: Value = serde_json::from_str(&text).unwrap();
        let map = parsed.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["id"], "acct1");
        assert_eq!(map["name"], "Acme");
    }

    #[test]
    fn test_render_json_preserves_insertion_order() {
        let printer = Printer::new(OutputFormat::Json);
        let printable = Printable::stdout(json!({"zeta": 1, "alpha": 2, "mid": 3}), ContentKind::Object);

        let text = printer.render(&printable).unwrap();
        let zeta = text.find("zeta").unwrap();
        let alpha = text.find("alpha").unwrap();
        let mid = text.find("mid").unwrap();
        assert!(zeta < alpha && alpha < mid);
    }

    #[test]
    fn test_render_csv_list() {
        let printer = Printer::new(OutputFormat::Csv);
        let printable = Printable::stdout(json!([{"id": "c1"}, {"id": "c2"}]), ContentKind::List);

        assert_eq!(printer.render(&printable).unwrap(), "id\nc1\nc2\n");
    }

    #[test]
    fn test_render_absent_content() {
        let printer = Printer::new(OutputFormat::Json);
        assert_eq!(printer.render(&Printable::empty()).unwrap(), "");

        let (out, err) = emit_capture(&printer, &Printable::empty());
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_plaintext_kind_is_verbatim_in_every_format() {
        for format in [OutputFormat::Json, OutputFormat::Csv] {
            let printer = Printer::new(format);
            let text = printer.render(&Printable::error("Collection not found.")).unwrap();
            assert_eq!(text, "Collection not found.");
        }
    }

    #[test]
    fn test_plaintext_kind_with_non_string_content() {
        let printer = Printer::new(OutputFormat::Json);
        let printable = Printable::stdout(json!(42), ContentKind::Plaintext);
        assert!(matches!(
            printer.render(&printable),
            Err(RenderError::TypeMismatch { found: "number", .. })
        ));
    }

    #[test]
    fn test_emit_routes_by_destination() {
        let printer = Printer::new(OutputFormat::Json);

        let (out, err) = emit_capture(&printer, &Printable::message("done"));
        assert_eq!(out, "done\n");
        assert!(err.is_empty());

        let (out, err) = emit_capture(&printer, &Printable::error("failed"));
        assert!(out.is_empty());
        assert_eq!(err, "failed\n");
    }

    #[test]
    fn test_emit_reports_render_errors_on_stderr() {
        let printer = Printer::new(OutputFormat::Csv);
        let printable = Printable::stdout(json!([]), ContentKind::List);

        let (out, err) = emit_capture(&printer, &printable);
        assert!(out.is_empty());
        assert!(err.starts_with("Error: Malformed payload"));
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("table".parse::<OutputFormat>().is_err());
        assert!("text".parse::<OutputFormat>().is_err());
        assert!("plaintext".parse::<OutputFormat>().is_err());
    }
}
