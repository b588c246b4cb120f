//! Records exchanged with the platform

use serde::{Deserialize, Serialize};

/// An account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    #[serde(default)]
    pub account_name: Option<String>,
}

/// A platform-issued API key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VantageApiKey {
    pub id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub vantage_api_key_obfuscated: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// A key for an external embeddings provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalApiKey {
    pub external_key_id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub llm_provider: Option<String>,
    #[serde(default)]
    pub llm_secret: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body of an external key create or update
///
/// Unset fields are left out so an update only touches what was given.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExternalApiKeyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A collection of searchable documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: Option<String>,
    #[serde(default)]
    pub collection_status: Option<String>,
    #[serde(default)]
    pub collection_state: Option<String>,
    #[serde(default)]
    pub user_provided_embeddings: Option<bool>,
    #[serde(default)]
    pub llm_provider: Option<String>,
    #[serde(default)]
    pub llm: Option<String>,
    #[serde(default)]
    pub embeddings_dimension: Option<u32>,
    #[serde(default)]
    pub external_key_id: Option<String>,
    #[serde(default)]
    pub collection_preview_url_pattern: Option<String>,
}

/// Additional external account a collection may fall back to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecondaryExternalAccount {
    pub external_type: String,
    pub external_account_id: String,
}

/// Body of a collection create request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateCollection {
    pub collection_id: String,
    pub collection_name: String,
    pub embeddings_dimension: u32,
    pub user_provided_embeddings: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secondary_external_accounts: Vec<SecondaryExternalAccount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_preview_url_pattern: Option<String>,
}

impl CreateCollection {
    fn base(collection_id: String, collection_name: String, embeddings_dimension: u32) -> Self {
        Self {
            collection_id,
            collection_name,
            embeddings_dimension,
            user_provided_embeddings: false,
            llm_provider: None,
            llm: None,
            llm_secret: None,
            external_account_id: None,
            external_url: None,
            secondary_external_accounts: Vec::new(),
            collection_preview_url_pattern: None,
        }
    }

    /// Collection embedded by OpenAI
    pub fn openai(
        collection_id: String,
        collection_name: String,
        embeddings_dimension: u32,
        llm: String,
        llm_secret: String,
        external_account_id: String,
        secondary_external_account_ids: Vec<String>,
    ) -> Self {
        Self {
            llm_provider: Some("OpenAI".to_string()),
            llm: Some(llm),
            llm_secret: Some(llm_secret),
            external_account_id: Some(external_account_id),
            secondary_external_accounts: secondary_external_account_ids
                .into_iter()
                .map(|external_account_id| SecondaryExternalAccount {
                    external_type: "OpenAI".to_string(),
                    external_account_id,
                })
                .collect(),
            ..Self::base(collection_id, collection_name, embeddings_dimension)
        }
    }

    /// Collection embedded by a HuggingFace endpoint
    pub fn hugging_face(
        collection_id: String,
        collection_name: String,
        embeddings_dimension: u32,
        llm_secret: Option<String>,
        external_account_id: Option<String>,
        external_url: Option<String>,
    ) -> Self {
        Self {
            llm_provider: Some("HuggingFace".to_string()),
            llm_secret,
            external_account_id,
            external_url,
            ..Self::base(collection_id, collection_name, embeddings_dimension)
        }
    }

    /// Collection whose documents carry their own embeddings
    pub fn user_provided(collection_id: String, collection_name: String, embeddings_dimension: u32) -> Self {
        Self {
            user_provided_embeddings: true,
            ..Self::base(collection_id, collection_name, embeddings_dimension)
        }
    }

    pub fn with_preview_url_pattern(mut self, pattern: Option<String>) -> Self {
        self.collection_preview_url_pattern = pattern;
        self
    }
}

/// Body of a collection update request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_preview_url_pattern: Option<String>,
}

/// One matching document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub sort_score: Option<f64>,
}

/// Search response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub request_id: Option<u64>,
    #[serde(default)]
    pub results: Vec<SearchResultItem>,
}
