//! Blocking HTTP implementation of [`VantageApi`]

use std::cell::OnceCell;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{
    Account, Collection, CollectionUpdate, CreateCollection, Credentials, ExternalApiKey, ExternalApiKeyRequest,
    SearchResult, VantageApi, VantageApiKey,
};
use crate::error::ApiError;
use crate::search::SearchRequest;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Platform client over HTTPS
pub struct HttpClient {
    api_host: String,
    auth_host: String,
    account_id: String,
    credentials: Credentials,
    http: Client,
    token: OnceCell<String>,
}

impl HttpClient {
    pub fn new(api_host: &str, auth_host: &str, account_id: &str, credentials: Credentials) -> Result<Self, ApiError> {
        debug!(%api_host, %auth_host, %account_id, ?credentials, "HttpClient::new: called");
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("vantage-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api_host: api_host.trim_end_matches('/').to_string(),
            auth_host: auth_host.trim_end_matches('/').to_string(),
            account_id: account_id.to_string(),
            credentials,
            http,
            token: OnceCell::new(),
        })
    }

    fn account_url(&self, path: &str) -> String {
        account_url(&self.api_host, &self.account_id, path)
    }

    /// Bearer token for the configured credentials
    ///
    /// Client credentials are exchanged once, on first use.
    fn bearer_token(&self) -> Result<String, ApiError> {
        match &self.credentials {
            Credentials::ApiKey(key) => Ok(key.clone()),
            Credentials::Jwt(token) => Ok(token.clone()),
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => {
                if let Some(token) = self.token.get() {
                    return Ok(token.clone());
                }
                let token = self.exchange_client_credentials(client_id, client_secret)?;
                let _ = self.token.set(token.clone());
                Ok(token)
            }
        }
    }

    fn exchange_client_credentials(&self, client_id: &str, client_secret: &str) -> Result<String, ApiError> {
        debug!(%client_id, "exchange_client_credentials: called");
        let url = format!("{}/oauth/token", self.auth_host);
        let body = json!({
            "grant_type": "client_credentials",
            "client_id": client_id,
            "client_secret": client_secret,
            "audience": self.api_host,
        });

        let response = self.http.post(&url).json(&body).send()?;
        let value: Value = decode(check(response)?)?;
        let token = value
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::InvalidResponse("token response has no access_token".to_string()))?;

        info!("exchange_client_credentials: obtained access token");
        Ok(token.to_string())
    }

    /// Send one authenticated request, whatever status comes back
    fn dispatch(
        &self,
        method: Method,
        url: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        debug!(%method, %url, "dispatch: called");
        let token = self.bearer_token()?;
        let request = build(self.http.request(method, url).bearer_auth(&token));
        Ok(request.send()?)
    }

    /// Send one authenticated request and check its status
    fn send(
        &self,
        method: Method,
        url: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        check(self.dispatch(method, url, build)?)
    }

    /// Post documents and report the status the platform answered with
    ///
    /// A missing collection is still an error; every other status is
    /// returned for the command to report.
    fn upload(&self, url: &str, build: impl FnOnce(RequestBuilder) -> RequestBuilder) -> Result<u16, ApiError> {
        let response = self.dispatch(Method::POST, url, build)?;
        match response.status() {
            StatusCode::NOT_FOUND => check(response).map(|_| StatusCode::NOT_FOUND.as_u16()),
            status => {
                info!(status = status.as_u16(), "upload: platform answered");
                Ok(status.as_u16())
            }
        }
    }

    fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        decode(self.send(Method::GET, url, |r| r)?)
    }

    fn with_body<B: Serialize, T: DeserializeOwned>(&self, method: Method, url: &str, body: &B) -> Result<T, ApiError> {
        decode(self.send(method, url, |r| r.json(body))?)
    }

    fn delete(&self, url: &str) -> Result<(), ApiError> {
        self.send(Method::DELETE, url, |r| r)?;
        Ok(())
    }
}

fn account_url(api_host: &str, account_id: &str, path: &str) -> String {
    if path.is_empty() {
        format!("{}/v1/account/{}", api_host, account_id)
    } else {
        format!("{}/v1/account/{}/{}", api_host, account_id, path)
    }
}

/// Turn an unsuccessful response into an error
fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        debug!(status = status.as_u16(), "check: success");
        return Ok(response);
    }

    let text = response.text().unwrap_or_default();
    debug!(status = status.as_u16(), "check: API error");
    Err(ApiError::from_status(status.as_u16(), extract_detail(&text)))
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text()?;
    Ok(serde_json::from_str(&text)?)
}

/// Server detail from an error body
///
/// Prefers a `message`, `detail` or `error` field; falls back to the raw body.
fn extract_detail(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "detail", "error"] {
            match map.get(key) {
                Some(Value::String(text)) => return text.clone(),
                Some(Value::Null) | None => continue,
                Some(other) => return other.to_string(),
            }
        }
    }
    body.trim().to_string()
}

impl VantageApi for HttpClient {
    fn get_account(&self) -> Result<Account, ApiError> {
        debug!("get_account: called");
        self.get(&self.account_url(""))
    }

    fn update_account(&self, account_name: &str) -> Result<Account, ApiError> {
        debug!(%account_name, "update_account: called");
        self.with_body(
            Method::PATCH,
            &self.account_url(""),
            &json!({ "account_name": account_name }),
        )
    }

    fn get_vantage_api_keys(&self) -> Result<Vec<VantageApiKey>, ApiError> {
        debug!("get_vantage_api_keys: called");
        self.get(&self.account_url("vantage-api-keys"))
    }

    fn get_vantage_api_key(&self, key_id: &str) -> Result<VantageApiKey, ApiError> {
        debug!(%key_id, "get_vantage_api_key: called");
        self.get(&self.account_url(&format!("vantage-api-keys/{}", key_id)))
    }

    fn create_external_api_key(&self, request: &ExternalApiKeyRequest) -> Result<ExternalApiKey, ApiError> {
        debug!(?request.llm_provider, "create_external_api_key: called");
        self.with_body(Method::POST, &self.account_url("external-api-keys"), request)
    }

    fn get_external_api_keys(&self) -> Result<Vec<ExternalApiKey>, ApiError> {
        debug!("get_external_api_keys: called");
        self.get(&self.account_url("external-api-keys"))
    }

    fn get_external_api_key(&self, key_id: &str) -> Result<ExternalApiKey, ApiError> {
        debug!(%key_id, "get_external_api_key: called");
        self.get(&self.account_url(&format!("external-api-keys/{}", key_id)))
    }

    fn update_external_api_key(
        &self,
        key_id: &str,
        request: &ExternalApiKeyRequest,
    ) -> Result<ExternalApiKey, ApiError> {
        debug!(%key_id, "update_external_api_key: called");
        self.with_body(
            Method::PATCH,
            &self.account_url(&format!("external-api-keys/{}", key_id)),
            request,
        )
    }

    fn delete_external_api_key(&self, key_id: &str) -> Result<(), ApiError> {
        debug!(%key_id, "delete_external_api_key: called");
        self.delete(&self.account_url(&format!("external-api-keys/{}", key_id)))
    }

    fn list_collections(&self) -> Result<Vec<Collection>, ApiError> {
        debug!("list_collections: called");
        self.get(&self.account_url("collections"))
    }

    fn get_collection(&self, collection_id: &str) -> Result<Collection, ApiError> {
        debug!(%collection_id, "get_collection: called");
        self.get(&self.account_url(&format!("collections/{}", collection_id)))
    }

    fn create_collection(&self, collection: &CreateCollection) -> Result<Collection, ApiError> {
        debug!(%collection.collection_id, "create_collection: called");
        self.with_body(Method::POST, &self.account_url("collections"), collection)
    }

    fn update_collection(&self, collection_id: &str, update: &CollectionUpdate) -> Result<Collection, ApiError> {
        debug!(%collection_id, "update_collection: called");
        self.with_body(
            Method::PATCH,
            &self.account_url(&format!("collections/{}", collection_id)),
            update,
        )
    }

    fn delete_collection(&self, collection_id: &str) -> Result<(), ApiError> {
        debug!(%collection_id, "delete_collection: called");
        self.delete(&self.account_url(&format!("collections/{}", collection_id)))
    }

    fn upsert_documents_from_jsonl(
        &self,
        collection_id: &str,
        documents: String,
        batch_identifier: &str,
    ) -> Result<u16, ApiError> {
        debug!(%collection_id, %batch_identifier, len = documents.len(), "upsert_documents_from_jsonl: called");
        let url = self.account_url(&format!("collections/{}/documents", collection_id));
        self.upload(&url, |r| {
            r.query(&[("batch_identifier", batch_identifier)])
                .header(reqwest::header::CONTENT_TYPE, "application/jsonl")
                .body(documents)
        })
    }

    fn upsert_documents_from_parquet(
        &self,
        collection_id: &str,
        content: Vec<u8>,
        batch_identifier: &str,
    ) -> Result<u16, ApiError> {
        debug!(%collection_id, %batch_identifier, len = content.len(), "upsert_documents_from_parquet: called");
        let url = self.account_url(&format!("collections/{}/documents/parquet", collection_id));
        self.upload(&url, |r| {
            r.query(&[("batch_identifier", batch_identifier)])
                .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
                .body(content)
        })
    }

    fn delete_documents(&self, collection_id: &str, document_ids: &[String]) -> Result<(), ApiError> {
        debug!(%collection_id, count = document_ids.len(), "delete_documents: called");
        let url = self.account_url(&format!("collections/{}/documents", collection_id));
        self.send(Method::DELETE, &url, |r| r.json(&json!({ "ids": document_ids })))?;
        Ok(())
    }

    fn search(&self, request: &SearchRequest) -> Result<SearchResult, ApiError> {
        debug!(endpoint = request.query.endpoint(), %request.collection_id, "search: called");
        let url = format!("{}/v1/search/{}", self.api_host, request.query.endpoint());
        self.with_body(Method::POST, &url, &request.to_body(&self.account_id))
    }
}
