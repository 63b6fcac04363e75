//! HTTP access to the hosted backend: PostgREST-style tables and the auth user endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, RequestBuilder, Response,
};
use serde_json::Value;
use shared::{
    domain::User,
    error::{ErrorCode, RemoteError},
    protocol::{Filter, Order},
};
use tracing::debug;
use url::Url;

use crate::{IdentityProvider, RemoteResult, RemoteTable};

const API_KEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "Prefer";
const RETURN_REPRESENTATION: &str = "return=representation";
const REST_PREFIX: &str = "rest/v1";
const AUTH_USER_PATH: &str = "auth/v1/user";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    base_url: String,
    pub anon_key: String,
    pub access_token: Option<String>,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> RemoteResult<Self> {
        let parsed = Url::parse(base_url.trim()).map_err(|err| {
            RemoteError::new(
                ErrorCode::Validation,
                format!("invalid service url '{base_url}': {err}"),
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(RemoteError::new(
                ErrorCode::Validation,
                format!("service url must be http(s), got '{}'", parsed.scheme()),
            ));
        }

        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    pub fn with_access_token(mut self, access_token: Option<String>) -> Self {
        self.access_token = access_token.filter(|token| !token.trim().is_empty());
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

/// One HTTP client serving both the table and identity capabilities of the backend.
pub struct RestBackend {
    http: Client,
    config: ServiceConfig,
}

impl RestBackend {
    pub fn new(config: ServiceConfig) -> RemoteResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, header_value(&config.anon_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.bearer()))?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self { http, config })
    }

    fn table_url(&self, table: &str) -> String {
        self.config.endpoint(&format!("{REST_PREFIX}/{table}"))
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = error_body(response).await;
        Err(RemoteError::from_response(status.as_u16(), &body))
    }
}

#[async_trait]
impl RemoteTable for RestBackend {
    async fn select(
        &self,
        table: &str,
        filters: &[Filter],
        order: Option<&Order>,
    ) -> RemoteResult<Vec<Value>> {
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filters.iter().map(Filter::to_query_pair));
        if let Some(order) = order {
            query.push(("order".to_string(), order.to_query_value()));
        }

        debug!(table, filters = filters.len(), "select rows");
        let response = self
            .send(self.http.get(self.table_url(table)).query(&query))
            .await?;
        decode_rows(response).await
    }

    async fn insert(&self, table: &str, row: Value) -> RemoteResult<Value> {
        debug!(table, "insert row");
        let response = self
            .send(
                self.http
                    .post(self.table_url(table))
                    .header(PREFER_HEADER, RETURN_REPRESENTATION)
                    .query(&[("select", "*")])
                    .json(&row),
            )
            .await?;

        decode_rows(response).await?.into_iter().next().ok_or_else(|| {
            RemoteError::new(ErrorCode::Decode, format!("insert into {table} returned no rows"))
        })
    }

    async fn update(&self, table: &str, filters: &[Filter], patch: Value) -> RemoteResult<Value> {
        require_filters("update", table, filters)?;
        let mut query = vec![("select".to_string(), "*".to_string())];
        query.extend(filters.iter().map(Filter::to_query_pair));

        debug!(table, filters = filters.len(), "update rows");
        let response = self
            .send(
                self.http
                    .patch(self.table_url(table))
                    .header(PREFER_HEADER, RETURN_REPRESENTATION)
                    .query(&query)
                    .json(&patch),
            )
            .await?;

        decode_rows(response).await?.into_iter().next().ok_or_else(|| {
            RemoteError::new(
                ErrorCode::NotFound,
                format!("update on {table} matched no rows"),
            )
        })
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> RemoteResult<()> {
        require_filters("delete", table, filters)?;
        let query: Vec<(String, String)> = filters.iter().map(Filter::to_query_pair).collect();

        debug!(table, filters = filters.len(), "delete rows");
        self.send(self.http.delete(self.table_url(table)).query(&query))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn current_user(&self) -> RemoteResult<Option<User>> {
        if self.config.access_token.is_none() {
            debug!("no access token configured; treating session as anonymous");
            return Ok(None);
        }

        let response = self
            .http
            .get(self.config.endpoint(AUTH_USER_PATH))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            let user = response.json::<User>().await.map_err(decode_error)?;
            return Ok(Some(user));
        }

        let body = error_body(response).await;
        let err = RemoteError::from_response(status.as_u16(), &body);
        if err.is_auth() {
            debug!(%status, "session rejected by auth service");
            return Ok(None);
        }
        Err(err)
    }
}

/// Text of a failed response. A body that cannot be read becomes empty so the status still maps.
async fn error_body(response: Response) -> String {
    match response.text().await {
        Ok(body) => body,
        Err(err) => {
            debug!(error = %err, "failed to read error response body");
            String::new()
        }
    }
}

async fn decode_rows(response: Response) -> RemoteResult<Vec<Value>> {
    response.json::<Vec<Value>>().await.map_err(decode_error)
}

fn require_filters(action: &str, table: &str, filters: &[Filter]) -> RemoteResult<()> {
    if filters.is_empty() {
        return Err(RemoteError::new(
            ErrorCode::Validation,
            format!("refusing to {action} {table} without a filter"),
        ));
    }
    Ok(())
}

fn header_value(raw: &str) -> RemoteResult<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|err| {
        RemoteError::new(
            ErrorCode::Validation,
            format!("credential is not a valid header value: {err}"),
        )
    })
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError::new(ErrorCode::Transport, err.to_string())
}

fn decode_error(err: reqwest::Error) -> RemoteError {
    RemoteError::new(
        ErrorCode::Decode,
        format!("unable to parse response from table service: {err}"),
    )
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
