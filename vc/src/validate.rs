//! Local validation of document files before upload

use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::{Field, Row};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::error::{ApiError, ValidationError};

/// Kind of collection documents are intended for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionType {
    UserProvidedEmbeddings,
    OpenAi,
    HuggingFace,
}

impl FromStr for CollectionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "upe" => Ok(Self::UserProvidedEmbeddings),
            "openai" => Ok(Self::OpenAi),
            "huggingface" => Ok(Self::HuggingFace),
            _ => Err(ValidationError::CollectionType(format!(
                "'{}', expected one of UPE, OpenAI, HuggingFace",
                s
            ))),
        }
    }
}

/// Embedding size produced by a known model
pub fn model_dimension(model_name: &str) -> Option<usize> {
    match model_name {
        "text-embedding-ada-002" | "text-embedding-3-small" => Some(1536),
        "text-embedding-3-large" => Some(3072),
        _ => None,
    }
}

/// What a file must satisfy for one collection type
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRules {
    pub collection_type: CollectionType,
    pub embeddings_dimension: Option<usize>,
}

impl ValidationRules {
    /// Combine the collection type with an optional model and dimension
    ///
    /// UPE collections need an explicit dimension. Otherwise the dimension
    /// may be inferred from a known model name.
    pub fn new(
        collection_type: CollectionType,
        model_name: Option<&str>,
        embeddings_dimension: Option<usize>,
    ) -> Result<Self, ValidationError> {
        debug!(?collection_type, ?model_name, ?embeddings_dimension, "ValidationRules::new: called");
        if collection_type == CollectionType::UserProvidedEmbeddings && embeddings_dimension.is_none() {
            return Err(ValidationError::MissingEmbeddingsDimension);
        }

        let embeddings_dimension = embeddings_dimension.or_else(|| model_name.and_then(model_dimension));
        Ok(Self {
            collection_type,
            embeddings_dimension,
        })
    }
}

/// One problem found in a file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub line: Option<usize>,
    pub field: Option<String>,
    pub message: String,
}

impl Finding {
    fn at(line: usize, field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            field: field.map(String::from),
            message: message.into(),
        }
    }

    fn file(message: impl Into<String>) -> Self {
        Self {
            line: None,
            field: None,
            message: message.into(),
        }
    }
}

/// Per-document checks shared by JSONL lines and Parquet rows
struct DocumentChecker<'a> {
    rules: &'a ValidationRules,
    seen: HashMap<String, usize>,
    documents: usize,
    findings: Vec<Finding>,
}

impl<'a> DocumentChecker<'a> {
    fn new(rules: &'a ValidationRules) -> Self {
        Self {
            rules,
            seen: HashMap::new(),
            documents: 0,
            findings: Vec::new(),
        }
    }

    fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Count a document that could not be read at all
    fn unreadable(&mut self, line_no: usize, message: impl Into<String>) {
        self.documents += 1;
        self.push(Finding::at(line_no, None, message));
    }

    fn check(&mut self, line_no: usize, document: &Map<String, Value>) {
        self.documents += 1;

        match document.get("id") {
            Some(Value::String(id)) if !id.trim().is_empty() => {
                if let Some(first) = self.seen.insert(id.clone(), line_no) {
                    self.push(Finding::at(
                        line_no,
                        Some("id"),
                        format!("duplicate id '{}', first seen on line {}", id, first),
                    ));
                }
            }
            Some(Value::String(_)) => self.push(Finding::at(line_no, Some("id"), "id must not be empty")),
            Some(Value::Null) | None => self.push(Finding::at(line_no, Some("id"), "id is required")),
            Some(_) => self.push(Finding::at(line_no, Some("id"), "id must be a string")),
        }

        match document.get("text") {
            Some(Value::String(_)) => {}
            Some(Value::Null) | None => self.push(Finding::at(line_no, Some("text"), "text is required")),
            Some(_) => self.push(Finding::at(line_no, Some("text"), "text must be a string")),
        }

        if let Some(finding) = check_embeddings(line_no, document.get("embeddings"), self.rules) {
            self.push(finding);
        }
    }

    fn finish(mut self) -> Vec<Finding> {
        if self.documents == 0 {
            self.push(Finding::file("file contains no documents"));
        }
        self.findings
    }
}

/// Check JSONL content line by line
pub fn validate_jsonl_str(content: &str, rules: &ValidationRules) -> Vec<Finding> {
    debug!(len = content.len(), ?rules, "validate_jsonl_str: called");
    let mut checker = DocumentChecker::new(rules);

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(document)) => checker.check(line_no, &document),
            Ok(_) => checker.unreadable(line_no, "line is not a JSON object"),
            Err(e) => checker.unreadable(line_no, format!("invalid JSON: {}", e)),
        }
    }

    let findings = checker.finish();
    debug!(count = findings.len(), "validate_jsonl_str: done");
    findings
}

fn check_embeddings(line_no: usize, embeddings: Option<&Value>, rules: &ValidationRules) -> Option<Finding> {
    let field = Some("embeddings");
    let embeddings = match embeddings {
        None | Some(Value::Null) if rules.collection_type == CollectionType::UserProvidedEmbeddings => {
            return Some(Finding::at(line_no, field, "embeddings are required for UPE collections"));
        }
        None | Some(Value::Null) => return None,
        Some(Value::Array(values)) => values,
        Some(_) => return Some(Finding::at(line_no, field, "embeddings must be an array of numbers")),
    };

    if embeddings.iter().any(|v| !v.is_number()) {
        return Some(Finding::at(line_no, field, "embeddings must be an array of numbers"));
    }

    match rules.embeddings_dimension {
        Some(dimension) if embeddings.len() != dimension => Some(Finding::at(
            line_no,
            field,
            format!("expected {} embedding values, found {}", dimension, embeddings.len()),
        )),
        _ => None,
    }
}

/// Read and check a JSONL file
pub fn validate_jsonl_file(path: &Path, rules: &ValidationRules) -> Result<Vec<Finding>, ApiError> {
    debug!(?path, "validate_jsonl_file: called");
    let content = fs::read_to_string(path)
        .map_err(|e| ApiError::Unknown(format!("Cannot read {}: {}", path.display(), e)))?;
    Ok(validate_jsonl_str(&content, rules))
}

/// Check the rows of a Parquet file
///
/// Rows get the same checks as JSONL lines; a finding's `line` is the
/// 1-based row number.
pub fn validate_parquet_file(path: &Path, rules: &ValidationRules) -> Result<Vec<Finding>, ApiError> {
    debug!(?path, ?rules, "validate_parquet_file: called");
    let file = File::open(path).map_err(|e| ApiError::Unknown(format!("Cannot read {}: {}", path.display(), e)))?;

    let reader = match SerializedFileReader::new(file) {
        Ok(reader) => reader,
        Err(e) => {
            debug!(error = %e, "validate_parquet_file: unreadable");
            return Ok(vec![Finding::file(format!("not a valid Parquet file: {}", e))]);
        }
    };
    let rows = match reader.get_row_iter(None) {
        Ok(rows) => rows,
        Err(e) => return Ok(vec![Finding::file(format!("cannot read Parquet rows: {}", e))]),
    };

    let mut checker = DocumentChecker::new(rules);
    for (index, row) in rows.enumerate() {
        let row_no = index + 1;
        match row {
            Ok(row) => checker.check(row_no, &row_to_json(&row)),
            Err(e) => {
                checker.unreadable(row_no, format!("cannot read row: {}", e));
                break;
            }
        }
    }

    let findings = checker.finish();
    debug!(count = findings.len(), "validate_parquet_file: done");
    Ok(findings)
}

fn row_to_json(row: &Row) -> Map<String, Value> {
    row.get_column_iter()
        .map(|(name, field)| (name.clone(), field_to_json(field)))
        .collect()
}

fn field_to_json(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Bool(b) => Value::Bool(*b),
        Field::Byte(n) => Value::from(*n),
        Field::Short(n) => Value::from(*n),
        Field::Int(n) => Value::from(*n),
        Field::Long(n) => Value::from(*n),
        Field::UByte(n) => Value::from(*n),
        Field::UShort(n) => Value::from(*n),
        Field::UInt(n) => Value::from(*n),
        Field::ULong(n) => Value::from(*n),
        Field::Float(n) => float_to_json(f64::from(*n)),
        Field::Double(n) => float_to_json(*n),
        Field::Str(text) => Value::String(text.clone()),
        Field::Group(row) => Value::Object(row_to_json(row)),
        Field::ListInternal(list) => Value::Array(list.elements().iter().map(field_to_json).collect()),
        // Remaining logical types render as text
        other => Value::String(other.to_string()),
    }
}

fn float_to_json(n: f64) -> Value {
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

/// True when the path names a `.parquet` file
pub fn has_parquet_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"))
}
