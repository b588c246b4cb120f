//! Document upload and deletion commands

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use super::CommandContext;
use crate::client::VantageApi;
use crate::error::{ApiError, ValidationError};
use crate::output::{ContentKind, Printable};
use crate::util::{on_not_found, split_list};
use crate::validate::has_parquet_extension;

const NOT_FOUND: &str = "Collection not found.";
const SENT: &str = "Successfully sent to processing.";

/// Where JSONL documents are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Stdin,
    File(PathBuf),
}

impl DocumentSource {
    /// `None` and `-` mean stdin
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if path.as_os_str() != "-" => Self::File(path),
            _ => Self::Stdin,
        }
    }

    /// File name, or a fresh UUID for stdin
    pub fn default_batch_identifier(&self) -> String {
        match self {
            Self::File(path) => file_name(path),
            Self::Stdin => Uuid::new_v4().to_string(),
        }
    }

    fn read(&self) -> io::Result<String> {
        match self {
            Self::File(path) => fs::read_to_string(path),
            Self::Stdin => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn upload_response(status: u16, failure: &str) -> Value {
    let message = if (200..300).contains(&status) {
        SENT.to_string()
    } else {
        format!("{} {}", failure, status)
    };
    json!({ "response": message })
}

pub fn upsert_documents_from_jsonl(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    collection_id: &str,
    batch_identifier: Option<String>,
    documents_file: Option<PathBuf>,
) -> Printable {
    let source = DocumentSource::from_arg(documents_file);
    let batch_identifier = batch_identifier.unwrap_or_else(|| source.default_batch_identifier());
    debug!(%collection_id, ?source, %batch_identifier, "upsert_documents_from_jsonl: called");

    match &source {
        DocumentSource::File(path) => ctx.printer.status(&format!("Uploading file '{}'...", path.display())),
        DocumentSource::Stdin => ctx.printer.status("Uploading from stdin..."),
    }

    let classifier = on_not_found(NOT_FOUND);
    ctx.executor.run(
        || -> Result<_, ApiError> {
            let documents = source.read()?;
            let status = client.upsert_documents_from_jsonl(collection_id, documents, &batch_identifier)?;
            Ok(upload_response(status, "Sending to processing failed with status"))
        },
        ContentKind::Object,
        Some(&classifier),
    )
}

/// Upsert a Parquet file
///
/// The batch identifier must end in `.parquet` for the platform to process
/// the upload, so one is appended when missing.
pub fn upsert_documents_from_parquet(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    collection_id: &str,
    batch_identifier: Option<String>,
    parquet_file: &Path,
) -> Result<Printable, ValidationError> {
    debug!(%collection_id, ?parquet_file, ?batch_identifier, "upsert_documents_from_parquet: called");
    if !has_parquet_extension(parquet_file) {
        debug!("upsert_documents_from_parquet: wrong extension");
        return Err(ValidationError::ParquetExtension);
    }

    let mut batch_identifier = batch_identifier.unwrap_or_else(|| file_name(parquet_file));
    if !batch_identifier.ends_with(".parquet") {
        batch_identifier.push_str(".parquet");
    }

    ctx.printer.status(&format!("Uploading file '{}'...", parquet_file.display()));

    let classifier = on_not_found(NOT_FOUND);
    Ok(ctx.executor.run(
        || -> Result<_, ApiError> {
            let content = fs::read(parquet_file)?;
            let status = client.upsert_documents_from_parquet(collection_id, content, &batch_identifier)?;
            Ok(upload_response(status, "Processing failed with status"))
        },
        ContentKind::Object,
        Some(&classifier),
    ))
}

pub fn delete_documents(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    collection_id: &str,
    document_ids: &str,
) -> Result<Printable, ValidationError> {
    let ids = split_list(document_ids);
    debug!(%collection_id, count = ids.len(), "delete_documents: called");
    if ids.is_empty() {
        return Err(ValidationError::MissingOption("--document-ids".to_string()));
    }

    let classifier = on_not_found(NOT_FOUND);
    Ok(ctx.executor.run(
        || -> Result<_, ApiError> {
            client.delete_documents(collection_id, &ids)?;
            Ok(json!({ "collection_id": collection_id, "document_ids": ids }))
        },
        ContentKind::Object,
        Some(&classifier),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockVantageApi;
    use crate::commands::testing::parts;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_document_source() {
        assert_eq!(DocumentSource::from_arg(None), DocumentSource::Stdin);
        assert_eq!(DocumentSource::from_arg(Some(PathBuf::from("-"))), DocumentSource::Stdin);
        assert_eq!(
            DocumentSource::from_arg(Some(PathBuf::from("/data/docs.jsonl"))),
            DocumentSource::File(PathBuf::from("/data/docs.jsonl"))
        );
    }

    #[test]
    fn test_default_batch_identifier() {
        let source = DocumentSource::File(PathBuf::from("/data/docs.jsonl"));
        assert_eq!(source.default_batch_identifier(), "docs.jsonl");

        let first = DocumentSource::Stdin.default_batch_identifier();
        let second = DocumentSource::Stdin.default_batch_identifier();
        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second);
    }

    #[test]
    fn test_upsert_jsonl_from_file() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"id": "1", "text": "hello"}}"#).unwrap();
        let name = file.path().file_name().unwrap().to_string_lossy().into_owned();

        let printable =
            upsert_documents_from_jsonl(&ctx, &client, "c1", None, Some(file.path().to_path_buf()));
        assert_eq!(printable.content, Some(json!({"response": "Successfully sent to processing."})));

        let uploads = client.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].0, "c1");
        assert_eq!(uploads[0].2, name);
    }

    #[test]
    fn test_upsert_jsonl_reports_status() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new().with_upload_status(500);

        let file = NamedTempFile::new().unwrap();
        let printable = upsert_documents_from_jsonl(
            &ctx,
            &client,
            "c1",
            Some("batch-7".to_string()),
            Some(file.path().to_path_buf()),
        );
        assert_eq!(
            printable.content,
            Some(json!({"response": "Sending to processing failed with status 500"}))
        );
        assert_eq!(client.uploads()[0].2, "batch-7");
    }

    #[test]
    fn test_upsert_jsonl_missing_file_is_operation_failure() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let printable = upsert_documents_from_jsonl(
            &ctx,
            &client,
            "c1",
            None,
            Some(PathBuf::from("/nonexistent/docs.jsonl")),
        );
        assert_eq!(printable.destination, crate::output::Destination::Stderr);
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_upsert_parquet_requires_extension() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let result = upsert_documents_from_parquet(&ctx, &client, "c1", None, Path::new("docs.csv"));
        assert_eq!(result, Err(ValidationError::ParquetExtension));
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_upsert_parquet_batch_identifier_suffix() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docs.parquet");
        fs::write(&path, b"PAR1....PAR1").unwrap();

        let printable =
            upsert_documents_from_parquet(&ctx, &client, "c1", Some("batch".to_string()), &path).unwrap();
        assert_eq!(printable.content, Some(json!({"response": "Successfully sent to processing."})));
        assert_eq!(client.uploads(), vec![("c1".to_string(), 12, "batch.parquet".to_string())]);
    }

    #[test]
    fn test_delete_documents() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);
        let client = MockVantageApi::new();

        let printable = delete_documents(&ctx, &client, "c1", "1, 2,,3").unwrap();
        assert_eq!(
            printable.content,
            Some(json!({"collection_id": "c1", "document_ids": ["1", "2", "3"]}))
        );
        assert_eq!(client.calls(), vec!["delete_documents:c1:1,2,3"]);
    }

    #[test]
    fn test_delete_documents_requires_ids() {
        let (executor, printer, config) = parts();
        let ctx = CommandContext::new(&executor, &printer, &config);

        let result = delete_documents(&ctx, &MockVantageApi::new(), "c1", " , ");
        assert!(matches!(result, Err(ValidationError::MissingOption(_))));
    }
}
