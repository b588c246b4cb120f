//! Command handlers
//!
//! Each handler wraps one platform call in an operation, hands it to the
//! executor with the command's classifier, and returns the printable.
//! Local input problems are reported as [`ValidationError`] before any
//! operation runs.

use tracing::debug;

use crate::cli::Command;
use crate::client::VantageApi;
use crate::config::Config;
use crate::error::ValidationError;
use crate::executor::CommandExecutor;
use crate::output::{Printable, Printer};

pub mod account;
pub mod api_keys;
pub mod collections;
pub mod configure;
pub mod documents;
pub mod search;
pub mod validate;

/// What every handler needs besides the platform client
pub struct CommandContext<'a> {
    pub executor: &'a CommandExecutor,
    pub printer: &'a Printer,
    pub config: &'a Config,
}

impl<'a> CommandContext<'a> {
    pub fn new(executor: &'a CommandExecutor, printer: &'a Printer, config: &'a Config) -> Self {
        Self {
            executor,
            printer,
            config,
        }
    }
}

/// Run a command that needs no platform access
///
/// Returns `None` for commands that need a client.
pub fn dispatch_local(command: &Command, ctx: &CommandContext) -> Option<Result<Printable, ValidationError>> {
    debug!(?command, "dispatch_local: called");
    if !command.is_local() {
        return None;
    }
    match command {
        Command::ValidateJsonl { validate, jsonl_file } => Some(validate::validate_jsonl(ctx, validate, jsonl_file)),
        Command::ValidateParquet {
            validate,
            parquet_file,
        } => Some(validate::validate_parquet(ctx, validate, parquet_file)),
        _ => None,
    }
}

/// Run a platform command
pub fn dispatch(command: Command, ctx: &CommandContext, client: &dyn VantageApi) -> Result<Printable, ValidationError> {
    debug!(?command, "dispatch: called");
    let printable = match command {
        Command::GetAccount => account::get_account(ctx, client),
        Command::UpdateAccount { new_account_name } => account::update_account(ctx, client, &new_account_name),

        Command::GetVantageApiKeys => api_keys::get_vantage_api_keys(ctx, client),
        Command::GetVantageApiKey { vantage_api_key_id } => {
            api_keys::get_vantage_api_key(ctx, client, &vantage_api_key_id)
        }
        Command::CreateExternalApiKey {
            llm_provider,
            llm_secret,
            url,
        } => api_keys::create_external_api_key(ctx, client, llm_provider, llm_secret, url),
        Command::GetExternalApiKeys => api_keys::get_external_api_keys(ctx, client),
        Command::GetExternalApiKey { external_key_id } => api_keys::get_external_api_key(ctx, client, &external_key_id),
        Command::UpdateExternalApiKey {
            external_key_id,
            llm_provider,
            llm_secret,
            url,
        } => api_keys::update_external_api_key(ctx, client, &external_key_id, llm_provider, llm_secret, url),
        Command::DeleteExternalApiKey { external_key_id } => {
            api_keys::delete_external_api_key(ctx, client, &external_key_id)
        }

        Command::ListCollections => collections::list_collections(ctx, client),
        Command::GetCollection { collection_id } => collections::get_collection(ctx, client, &collection_id),
        Command::UpdateCollection {
            collection_id,
            collection_name,
            external_key_id,
            collection_preview_url_pattern,
        } => collections::update_collection(
            ctx,
            client,
            &collection_id,
            collection_name,
            external_key_id,
            collection_preview_url_pattern,
        ),
        Command::DeleteCollection { collection_id } => collections::delete_collection(ctx, client, &collection_id),
        Command::CreateCollectionOpenai {
            collection_id,
            collection_name,
            llm_secret,
            llm_model_name,
            external_account_id,
            secondary_external_account_id,
            collection_preview_url_pattern,
            embeddings_dimension,
        } => collections::create_collection_openai(
            ctx,
            client,
            collections::OpenAiCollectionArgs {
                collection_id,
                collection_name,
                llm_secret,
                llm_model_name,
                external_account_id,
                secondary_external_account_ids: secondary_external_account_id,
                collection_preview_url_pattern,
                embeddings_dimension,
            },
        ),
        Command::CreateCollectionHf {
            collection_id,
            collection_name,
            llm_secret,
            external_account_id,
            external_url,
            collection_preview_url_pattern,
            embeddings_dimension,
        } => collections::create_collection_hf(
            ctx,
            client,
            collections::HuggingFaceCollectionArgs {
                collection_id,
                collection_name,
                llm_secret,
                external_account_id,
                external_url,
                collection_preview_url_pattern,
                embeddings_dimension,
            },
        ),
        Command::CreateCollectionUpe {
            collection_id,
            collection_name,
            embeddings_dimension,
            collection_preview_url_pattern,
        } => collections::create_collection_upe(
            ctx,
            client,
            collection_id,
            collection_name,
            embeddings_dimension,
            collection_preview_url_pattern,
        ),

        Command::UpsertDocumentsFromJsonl {
            collection_id,
            batch_identifier,
            documents_file,
        } => documents::upsert_documents_from_jsonl(ctx, client, &collection_id, batch_identifier, documents_file),
        Command::UpsertDocumentsFromParquet {
            collection_id,
            batch_identifier,
            parquet_file,
        } => documents::upsert_documents_from_parquet(ctx, client, &collection_id, batch_identifier, &parquet_file)?,
        Command::DeleteDocuments {
            collection_id,
            document_ids,
        } => documents::delete_documents(ctx, client, &collection_id, &document_ids)?,

        Command::EmbeddingSearch { embedding, search } => search::embedding_search(ctx, client, &embedding, &search)?,
        Command::SemanticSearch { text, search } => search::semantic_search(ctx, client, text, &search)?,
        Command::MoreLikeThisSearch { document_id, search } => {
            search::more_like_this_search(ctx, client, document_id, &search)?
        }
        Command::MoreLikeTheseSearch { these, search } => search::more_like_these_search(ctx, client, &these, &search)?,

        local @ (Command::ValidateJsonl { .. } | Command::ValidateParquet { .. }) => {
            return dispatch_local(&local, ctx).unwrap_or_else(|| Ok(Printable::empty()));
        }
        Command::Configure => {
            debug!("dispatch: configure runs before client setup");
            Printable::empty()
        }
    };
    Ok(printable)
}
