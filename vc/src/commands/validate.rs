//! Local document file validation

use std::path::Path;
use std::str::FromStr;

use serde_json::json;
use tracing::{debug, info};

use super::CommandContext;
use crate::cli::ValidateArgs;
use crate::error::{ApiError, ValidationError};
use crate::output::{ContentKind, Printable};
use crate::validate::{
    CollectionType, Finding, ValidationRules, has_parquet_extension, validate_jsonl_file, validate_parquet_file,
};

fn rules(args: &ValidateArgs) -> Result<ValidationRules, ValidationError> {
    let collection_type = CollectionType::from_str(&args.collection_type)?;
    ValidationRules::new(collection_type, args.model_name.as_deref(), args.embeddings_dimension)
}

fn report(findings: Vec<Finding>) -> Result<Printable, ApiError> {
    if findings.is_empty() {
        info!("validation passed");
        return Ok(Printable::stdout(json!({ "message": "OK." }), ContentKind::Object));
    }
    info!(count = findings.len(), "validation found problems");
    Ok(Printable::stdout(serde_json::to_value(findings)?, ContentKind::List))
}

pub fn validate_jsonl(
    ctx: &CommandContext,
    args: &ValidateArgs,
    jsonl_file: &Path,
) -> Result<Printable, ValidationError> {
    debug!(?args, ?jsonl_file, "validate_jsonl: called");
    let rules = rules(args)?;

    ctx.printer.status("Validating file...");
    Ok(ctx.executor.run_printable(
        || -> Result<_, ApiError> { report(validate_jsonl_file(jsonl_file, &rules)?) },
        None,
    ))
}

pub fn validate_parquet(
    ctx: &CommandContext,
    args: &ValidateArgs,
    parquet_file: &Path,
) -> Result<Printable, ValidationError> {
    debug!(?args, ?parquet_file, "validate_parquet: called");
    if !has_parquet_extension(parquet_file) {
        return Err(ValidationError::ParquetExtension);
    }
    let rules = rules(args)?;

    ctx.printer.status("Validating file...");
    Ok(ctx.executor.run_printable(
        || -> Result<_, ApiError> { report(validate_parquet_file(parquet_file, &rules)?) },
        None,
    ))
}
