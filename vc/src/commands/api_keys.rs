//! Vantage and external API key commands

use serde_json::json;
use tracing::debug;

use super::CommandContext;
use crate::client::{ExternalApiKeyRequest, VantageApi};
use crate::error::ApiError;
use crate::output::{ContentKind, Printable};
use crate::util::{mask, mask_sensitive_string, on_not_found};

const VANTAGE_KEY_NOT_FOUND: &str = "Vantage API key not found.";
const EXTERNAL_KEY_NOT_FOUND: &str = "External API key not found.";

pub fn get_vantage_api_keys(ctx: &CommandContext, client: &dyn VantageApi) -> Printable {
    debug!("get_vantage_api_keys: called");
    ctx.executor.run(|| client.get_vantage_api_keys(), ContentKind::List, None)
}

pub fn get_vantage_api_key(ctx: &CommandContext, client: &dyn VantageApi, key_id: &str) -> Printable {
    debug!(%key_id, "get_vantage_api_key: called");
    let classifier = on_not_found(VANTAGE_KEY_NOT_FOUND);
    ctx.executor.run(
        || client.get_vantage_api_key(key_id),
        ContentKind::Object,
        Some(&classifier),
    )
}

pub fn create_external_api_key(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    llm_provider: String,
    llm_secret: String,
    url: Option<String>,
) -> Printable {
    debug!(
        %llm_provider,
        llm_secret = %mask(&llm_secret),
        ?url,
        "create_external_api_key: called"
    );
    let request = ExternalApiKeyRequest {
        llm_provider: Some(llm_provider),
        llm_secret: Some(llm_secret),
        url,
    };
    ctx.executor.run(|| client.create_external_api_key(&request), ContentKind::Object, None)
}

pub fn get_external_api_keys(ctx: &CommandContext, client: &dyn VantageApi) -> Printable {
    debug!("get_external_api_keys: called");
    ctx.executor.run(|| client.get_external_api_keys(), ContentKind::List, None)
}

pub fn get_external_api_key(ctx: &CommandContext, client: &dyn VantageApi, key_id: &str) -> Printable {
    debug!(%key_id, "get_external_api_key: called");
    let classifier = on_not_found(EXTERNAL_KEY_NOT_FOUND);
    ctx.executor.run(
        || client.get_external_api_key(key_id),
        ContentKind::Object,
        Some(&classifier),
    )
}

pub fn update_external_api_key(
    ctx: &CommandContext,
    client: &dyn VantageApi,
    key_id: &str,
    llm_provider: Option<String>,
    llm_secret: Option<String>,
    url: Option<String>,
) -> Printable {
    debug!(
        %key_id,
        ?llm_provider,
        llm_secret = ?mask_sensitive_string(llm_secret.as_deref()),
        ?url,
        "update_external_api_key: called"
    );
    let request = ExternalApiKeyRequest {
        llm_provider,
        llm_secret,
        url,
    };
    let classifier = on_not_found(EXTERNAL_KEY_NOT_FOUND);
    ctx.executor.run(
        || client.update_external_api_key(key_id, &request),
        ContentKind::Object,
        Some(&classifier),
    )
}

pub fn delete_external_api_key(ctx: &CommandContext, client: &dyn VantageApi, key_id: &str) -> Printable {
    debug!(%key_id, "delete_external_api_key: called");
    let classifier = on_not_found(EXTERNAL_KEY_NOT_FOUND);
    ctx.executor.run(
        || -> Result<_, ApiError> {
            client.delete_external_api_key(key_id)?;
            Ok(json!({ "id": key_id }))
        },
        ContentKind::Object,
        Some(&classifier),
    )
}
