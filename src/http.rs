use std::fmt::Debug;

use awc::http::header::AUTHORIZATION;
use awc::http::StatusCode;
use awc::{Client, ClientRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::Error;
use crate::session::Session;

pub const IDEMPOTENCY_KEY: &str = "Idempotency-Key";

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    session: Session,
    document_limit: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl HttpClient {
    pub fn new(config: &Config, session: Session) -> HttpClient {
        let client = Client::builder().timeout(config.request_timeout).finish();

        HttpClient {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            document_limit: config.document_limit,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: ClientRequest) -> ClientRequest {
        match self.session.token() {
            Some(token) => request.insert_header((AUTHORIZATION, format!("Bearer {}", token))),
            None => request,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_json<R>(&self, path: &str) -> Result<R, Error>
    where
        R: DeserializeOwned,
    {
        let request = self.authorize(self.client.get(self.url(path)));
        let mut response = request.send().await?;
        if !response.status().is_success() {
            return Err(rejected(response.status(), response.json().await.ok()));
        }

        Ok(response.json::<R>().await?)
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn post_json<B, R>(
        &self,
        path: &str,
        body: &B,
        idempotency_key: Option<Uuid>,
    ) -> Result<R, Error>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let mut request = self.authorize(self.client.post(self.url(path)));
        if let Some(key) = idempotency_key {
            request = request.insert_header((IDEMPOTENCY_KEY, key.to_string()));
        }
        let mut response = request.send_json(body).await?;
        if !response.status().is_success() {
            return Err(rejected(response.status(), response.json().await.ok()));
        }

        Ok(response.json::<R>().await?)
    }

    #[tracing::instrument(skip(self, body))]
    pub async fn post_for_document<B>(&self, path: &str, body: &B) -> Result<Vec<u8>, Error>
    where
        B: Serialize,
    {
        let request = self.authorize(self.client.post(self.url(path)));
        let mut response = request.send_json(body).await?;
        if !response.status().is_success() {
            return Err(rejected(response.status(), response.json().await.ok()));
        }
        let bytes = response.body().limit(self.document_limit).await?;
        debug!(len = bytes.len(), "received document");

        Ok(bytes.to_vec())
    }
}

fn rejected(status: StatusCode, body: Option<ErrorBody>) -> Error {
    let message = match body {
        Some(body) if !body.message.is_empty() => body.message,
        _ => status.canonical_reason().unwrap_or_default().to_string(),
    };
    warn!(status = status.as_u16(), %message, "backend rejected request");

    Error::BackendRejected {
        status: status.as_u16(),
        message,
    }
}

impl Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
