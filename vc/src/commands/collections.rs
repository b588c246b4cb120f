//! Collection commands

use serde_json::json;
use tracing::debug;

use super::CommandContext;
use crate::client::{CollectionUpdate, CreateCollection, VantageApi};
use crate::error::ApiError;
use crate::output::{ContentKind, Printable};
use crate::util::{mask, mask_sensitive_string, on_not_found};

const NOT_FOUND: &str = "Collection not found.";

/// Arguments of `create-collection-openai`
#[derive(Debug, Clone)]
pub struct OpenAiCollectionArgs {
    pub collection_id: String,
    pub collection_name: String,
    pub llm_secret: String,
    pub llm_model_name: String,
    pub external_account_id: String,
    pub secondary_external_account_ids: Vec<String>,
    pub collection_preview_url_pattern: Option<String>,
    pub embeddings_dimension: u32,
}

/// Arguments of `create-collection-hf`
#[derive(Debug, Clone)]
pub struct HuggingFaceCollectionArgs {
    pub collection_id: String,
    pub collection_name: String,
    pub llm_secret: Option<String>,
    pub external_account_id: Option<String>,
    pub external_url: Option<String>,
    pub collection_preview_url_pattern: Option<String>,
    pub embeddings_dimension: u32,
}

pub fn list_collections(ctx: &CommandContext, client: &dyn VantageApi) -> Printable {
    debug!("list_collections: called");
    ctx.executor.run(|| client.list_collections(), ContentKind::List, None)
}

pub fn get_collection(ctx: &CommandContext, client: &dyn VantageApi, collection_id: &str) -> Printable {
    debug!(%collection_id, "get_collection: called");
    let classifier = on_not_found(NOT_FOUND);
    ctx.executor.run(
        || client.get_collection(collection_id),
        ContentKind::Object,
        Some(&classifier),
    )
}

pub fn update_collection(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    collection_id: &str,
    collection_name: Option<String>,
    external_key_id: Option<String>,
    collection_preview_url_pattern: Option<String>,
) -> Printable {
    debug!(
        %collection_id,
        ?collection_name,
        external_key_id = ?mask_sensitive_string(external_key_id.as_deref()),
        ?collection_preview_url_pattern,
        "update_collection: called"
    );
    let update = CollectionUpdate {
        collection_name,
        external_key_id,
        collection_preview_url_pattern,
    };
    let classifier = on_not_found(NOT_FOUND);
    ctx.executor.run(
        || client.update_collection(collection_id, &update),
        ContentKind::Object,
        Some(&classifier),
    )
}

pub fn delete_collection(ctx: &CommandContext, client: &dyn VantageApi, collection_id: &str) -> Printable {
    debug!(%collection_id, "delete_collection: called");
    let classifier = on_not_found(NOT_FOUND);
    ctx.executor.run(
        || -> Result<_, ApiError> {
            client.delete_collection(collection_id)?;
            Ok(json!({ "id": collection_id }))
        },
        ContentKind::Object,
        Some(&classifier),
    )
}

pub fn create_collection_openai(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    args: OpenAiCollectionArgs,
) -> Printable {
    debug!(
        collection_id = %args.collection_id,
        collection_name = %args.collection_name,
        llm_secret = %mask(&args.llm_secret),
        llm_model_name = %args.llm_model_name,
        external_account_id = %args.external_account_id,
        secondary = ?args.secondary_external_account_ids,
        embeddings_dimension = args.embeddings_dimension,
        "create_collection_openai: called"
    );
    let collection = CreateCollection::openai(
        args.collection_id,
        args.collection_name,
        args.embeddings_dimension,
        args.llm_model_name,
        args.llm_secret,
        args.external_account_id,
        args.secondary_external_account_ids,
    )
    .with_preview_url_pattern(args.collection_preview_url_pattern);

    ctx.executor.run(|| client.create_collection(&collection), ContentKind::Object, None)
}

pub fn create_collection_hf(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    args: HuggingFaceCollectionArgs,
) -> Printable {
    debug!(
        collection_id = %args.collection_id,
        collection_name = %args.collection_name,
        llm_secret = ?mask_sensitive_string(args.llm_secret.as_deref()),
        external_url = ?args.external_url,
        embeddings_dimension = args.embeddings_dimension,
        "create_collection_hf: called"
    );
    let collection = CreateCollection::hugging_face(
        args.collection_id,
        args.collection_name,
        args.embeddings_dimension,
        args.llm_secret,
        args.external_account_id,
        args.external_url,
    )
    .with_preview_url_pattern(args.collection_preview_url_pattern);

    ctx.executor.run(|| client.create_collection(&collection), ContentKind::Object, None)
}

pub fn create_collection_upe(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    collection_id: String,
    collection_name: String,
    embeddings_dimension: u32,
    collection_preview_url_pattern: Option<String>,
) -> Printable {
    debug!(%collection_id, %collection_name, embeddings_dimension, "create_collection_upe: called");
    let collection = CreateCollection::user_provided(collection_id, collection_name, embeddings_dimension)
        .with_preview_url_pattern(collection_preview_url_pattern);

    ctx.executor.run(|| client.create_collection(&collection), ContentKind::Object, None)
}
