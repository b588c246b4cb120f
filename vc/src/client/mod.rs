//! Platform client
//!
//! [`VantageApi`] is the seam between commands and the network. The
//! production implementation is [`HttpClient`]; tests use the mock below.

use tracing::debug;

use crate::error::ApiError;
use crate::search::SearchRequest;

mod http;
pub mod types;

pub use http::HttpClient;
pub use types::{
    Account, Collection, CollectionUpdate, CreateCollection, ExternalApiKey, ExternalApiKeyRequest, SearchResult,
    SearchResultItem, SecondaryExternalAccount, VantageApiKey,
};

/// Default platform API host
pub const DEFAULT_API_HOST: &str = "https://api.vanta.ge";

/// Default authentication host
pub const DEFAULT_AUTH_HOST: &str = "https://auth.vanta.ge";

/// Operations the platform offers
///
/// Upload methods return the HTTP status code of the accepted request.
pub trait VantageApi {
    fn get_account(&self) -> Result<Account, ApiError>;

    fn update_account(&self, account_name: &str) -> Result<Account, ApiError>;

    fn get_vantage_api_keys(&self) -> Result<Vec<VantageApiKey>, ApiError>;

    fn get_vantage_api_key(&self, key_id: &str) -> Result<VantageApiKey, ApiError>;

    fn create_external_api_key(&self, request: &ExternalApiKeyRequest) -> Result<ExternalApiKey, ApiError>;

    fn get_external_api_keys(&self) -> Result<Vec<ExternalApiKey>, ApiError>;

    fn get_external_api_key(&self, key_id: &str) -> Result<ExternalApiKey, ApiError>;

    fn update_external_api_key(
        &self,
        key_id: &str,
        request: &ExternalApiKeyRequest,
    ) -> Result<ExternalApiKey, ApiError>;

    fn delete_external_api_key(&self, key_id: &str) -> Result<(), ApiError>;

    fn list_collections(&self) -> Result<Vec<Collection>, ApiError>;

    fn get_collection(&self, collection_id: &str) -> Result<Collection, ApiError>;

    fn create_collection(&self, collection: &CreateCollection) -> Result<Collection, ApiError>;

    fn update_collection(&self, collection_id: &str, update: &CollectionUpdate) -> Result<Collection, ApiError>;

    fn delete_collection(&self, collection_id: &str) -> Result<(), ApiError>;

    fn upsert_documents_from_jsonl(
        &self,
        collection_id: &str,
        documents: String,
        batch_identifier: &str,
    ) -> Result<u16, ApiError>;

    fn upsert_documents_from_parquet(
        &self,
        collection_id: &str,
        content: Vec<u8>,
        batch_identifier: &str,
    ) -> Result<u16, ApiError>;

    fn delete_documents(&self, collection_id: &str, document_ids: &[String]) -> Result<(), ApiError>;

    fn search(&self, request: &SearchRequest) -> Result<SearchResult, ApiError>;
}

/// How requests are authenticated
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    ApiKey(String),
    Jwt(String),
    ClientCredentials { client_id: String, client_secret: String },
}

impl Credentials {
    /// Pick credentials by precedence: API key, then JWT, then client id and
    /// secret together
    ///
    /// Blank values count as missing.
    pub fn resolve(
        api_key: Option<&str>,
        jwt_token: Option<&str>,
        client_id: Option<&str>,
        client_secret: Option<&str>,
    ) -> Option<Self> {
        debug!(
            has_api_key = api_key.is_some(),
            has_jwt = jwt_token.is_some(),
            has_client_id = client_id.is_some(),
            has_client_secret = client_secret.is_some(),
            "Credentials::resolve: called"
        );
        let present = |v: Option<&str>| v.map(str::trim).filter(|v| !v.is_empty()).map(String::from);

        if let Some(key) = present(api_key) {
            debug!("Credentials::resolve: using API key");
            return Some(Self::ApiKey(key));
        }
        if let Some(token) = present(jwt_token) {
            debug!("Credentials::resolve: using JWT");
            return Some(Self::Jwt(token));
        }
        match (present(client_id), present(client_secret)) {
            (Some(client_id), Some(client_secret)) => {
                debug!("Credentials::resolve: using client credentials");
                Some(Self::ClientCredentials {
                    client_id,
                    client_secret,
                })
            }
            _ => {
                debug!("Credentials::resolve: no usable combination");
                None
            }
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::util::mask;
        match self {
            Self::ApiKey(key) => f.debug_tuple("ApiKey").field(&mask(key)).finish(),
            Self::Jwt(token) => f.debug_tuple("Jwt").field(&mask(token)).finish(),
            Self::ClientCredentials {
                client_id,
                client_secret,
            } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &mask(client_secret))
                .finish(),
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::cell::RefCell;

    /// Mock platform client for unit tests
    ///
    /// Records every call by name. When `failure` is set every call returns
    /// it; otherwise calls answer with canned records.
    #[derive(Default)]
    pub struct MockVantageApi {
        pub failure: Option<ApiError>,
        pub upload_status: u16,
        pub search_result: SearchResult,
        calls: RefCell<Vec<String>>,
        uploads: RefCell<Vec<(String, usize, String)>>,
        searches: RefCell<Vec<SearchRequest>>,
    }

    impl MockVantageApi {
        pub fn new() -> Self {
            debug!("MockVantageApi::new: called");
            Self {
                upload_status: 200,
                ..Default::default()
            }
        }

        pub fn failing(err: ApiError) -> Self {
            debug!(%err, "MockVantageApi::failing: called");
            Self {
                failure: Some(err),
                ..Self::new()
            }
        }

        pub fn with_upload_status(mut self, status: u16) -> Self {
            self.upload_status = status;
            self
        }

        pub fn with_search_result(mut self, result: SearchResult) -> Self {
            self.search_result = result;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        /// Uploads as (collection id, payload size, batch identifier)
        pub fn uploads(&self) -> Vec<(String, usize, String)> {
            self.uploads.borrow().clone()
        }

        pub fn searches(&self) -> Vec<SearchRequest> {
            self.searches.borrow().clone()
        }

        fn record(&self, call: impl Into<String>) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(call.into());
            match &self.failure {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn collection(collection_id: &str) -> Collection {
            Collection {
                collection_id: collection_id.to_string(),
                collection_name: Some(format!("{} name", collection_id)),
                collection_status: Some("Online".to_string()),
                collection_state: Some("Active".to_string()),
                user_provided_embeddings: Some(false),
                llm_provider: Some("OpenAI".to_string()),
                llm: Some("text-embedding-ada-002".to_string()),
                embeddings_dimension: Some(1536),
                external_key_id: None,
                collection_preview_url_pattern: None,
            }
        }

        fn external_key(key_id: &str, request: Option<&ExternalApiKeyRequest>) -> ExternalApiKey {
            ExternalApiKey {
                external_key_id: key_id.to_string(),
                account_id: Some("acct1".to_string()),
                llm_provider: request
                    .and_then(|r| r.llm_provider.clone())
                    .or_else(|| Some("OpenAI".to_string())),
                llm_secret: Some("sk-a*****".to_string()),
                url: request.and_then(|r| r.url.clone()),
                status: Some("Active".to_string()),
            }
        }
    }

    impl VantageApi for MockVantageApi {
        fn get_account(&self) -> Result<Account, ApiError> {
            self.record("get_account")?;
            Ok(Account {
                account_id: "acct1".to_string(),
                account_name: Some("Acme".to_string()),
            })
        }

        fn update_account(&self, account_name: &str) -> Result<Account, ApiError> {
            self.record(format!("update_account:{}", account_name))?;
            Ok(Account {
                account_id: "acct1".to_string(),
                account_name: Some(account_name.to_string()),
            })
        }

        fn get_vantage_api_keys(&self) -> Result<Vec<VantageApiKey>, ApiError> {
            self.record("get_vantage_api_keys")?;
            Ok(vec![VantageApiKey {
                id: "k1".to_string(),
                account_id: Some("acct1".to_string()),
                vantage_api_key_obfuscated: Some("vk-1****".to_string()),
                status: Some("Active".to_string()),
            }])
        }

        fn get_vantage_api_key(&self, key_id: &str) -> Result<VantageApiKey, ApiError> {
            self.record(format!("get_vantage_api_key:{}", key_id))?;
            Ok(VantageApiKey {
                id: key_id.to_string(),
                account_id: Some("acct1".to_string()),
                vantage_api_key_obfuscated: None,
                status: None,
            })
        }

        fn create_external_api_key(&self, request: &ExternalApiKeyRequest) -> Result<ExternalApiKey, ApiError> {
            self.record("create_external_api_key")?;
            Ok(Self::external_key("ek1", Some(request)))
        }

        fn get_external_api_keys(&self) -> Result<Vec<ExternalApiKey>, ApiError> {
            self.record("get_external_api_keys")?;
            Ok(vec![Self::external_key("ek1", None), Self::external_key("ek2", None)])
        }

        fn get_external_api_key(&self, key_id: &str) -> Result<ExternalApiKey, ApiError> {
            self.record(format!("get_external_api_key:{}", key_id))?;
            Ok(Self::external_key(key_id, None))
        }

        fn update_external_api_key(
            &self,
            key_id: &str,
            request: &ExternalApiKeyRequest,
        ) -> Result<ExternalApiKey, ApiError> {
            self.record(format!("update_external_api_key:{}", key_id))?;
            Ok(Self::external_key(key_id, Some(request)))
        }

        fn delete_external_api_key(&self, key_id: &str) -> Result<(), ApiError> {
            self.record(format!("delete_external_api_key:{}", key_id))
        }

        fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
            self.record("list_collections")?;
            Ok(vec![Self::collection("c1"), Self::collection("c2")])
        }

        fn get_collection(&self, collection_id: &str) -> Result<Collection, ApiError> {
            self.record(format!("get_collection:{}", collection_id))?;
            Ok(Self::collection(collection_id))
        }

        fn create_collection(&self, collection: &CreateCollection) -> Result<Collection, ApiError> {
            self.record(format!("create_collection:{}", collection.collection_id))?;
            Ok(Collection {
                collection_name: Some(collection.collection_name.clone()),
                embeddings_dimension: Some(collection.embeddings_dimension),
                user_provided_embeddings: Some(collection.user_provided_embeddings),
                llm_provider: collection.llm_provider.clone(),
                llm: collection.llm.clone(),
                ..Self::collection(&collection.collection_id)
            })
        }

        fn update_collection(&self, collection_id: &str, update: &CollectionUpdate) -> Result<Collection, ApiError> {
            self.record(format!("update_collection:{}", collection_id))?;
            let current = Self::collection(collection_id);
            Ok(Collection {
                collection_name: update.collection_name.clone().or(current.collection_name.clone()),
                external_key_id: update.external_key_id.clone(),
                collection_preview_url_pattern: update.collection_preview_url_pattern.clone(),
                ..current
            })
        }

        fn delete_collection(&self, collection_id: &str) -> Result<(), ApiError> {
            self.record(format!("delete_collection:{}", collection_id))
        }

        fn upsert_documents_from_jsonl(
            &self,
            collection_id: &str,
            documents: String,
            batch_identifier: &str,
        ) -> Result<u16, ApiError> {
            self.record(format!("upsert_documents_from_jsonl:{}", collection_id))?;
            self.uploads.borrow_mut().push((
                collection_id.to_string(),
                documents.len(),
                batch_identifier.to_string(),
            ));
            Ok(self.upload_status)
        }

        fn upsert_documents_from_parquet(
            &self,
            collection_id: &str,
            content: Vec<u8>,
            batch_identifier: &str,
        ) -> Result<u16, ApiError> {
            self.record(format!("upsert_documents_from_parquet:{}", collection_id))?;
            self.uploads.borrow_mut().push((
                collection_id.to_string(),
                content.len(),
                batch_identifier.to_string(),
            ));
            Ok(self.upload_status)
        }

        fn delete_documents(&self, collection_id: &str, document_ids: &[String]) -> Result<(), ApiError> {
            self.record(format!("delete_documents:{}:{}", collection_id, document_ids.join(",")))
        }

        fn search(&self, request: &SearchRequest) -> Result<SearchResult, ApiError> {
            self.record(format!("search:{}", request.query.endpoint()))?;
            self.searches.borrow_mut().push(request.clone());
            Ok(self.search_result.clone())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_mock_records_calls() {
            let client = MockVantageApi::new();
            client.get_account().unwrap();
            client.get_collection("c1").unwrap();

            assert_eq!(client.calls(), vec!["get_account", "get_collection:c1"]);
        }

        #[test]
        fn test_mock_failure() {
            let client = MockVantageApi::failing(ApiError::NotFound(String::new()));
            assert!(client.get_collection("c1").unwrap_err().is_not_found());
            assert_eq!(client.calls().len(), 1);
        }
    }
}
