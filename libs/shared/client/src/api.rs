use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use shared_config::AppConfig;
use shared_models::AppError;

/// Authenticated JSON client for the portal backend and its sibling services.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_base_url(&config.api_base_url, Some(config.api_token.as_str()))
    }

    pub fn with_base_url(base_url: &str, auth_token: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token: auth_token.filter(|t| !t.is_empty()).map(str::to_string),
        }
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, */*"));

        if let Some(token) = &self.auth_token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Auth token contains invalid header characters, sending unauthenticated"),
            }
        }

        headers
    }

    fn build(&self, method: Method, path: &str, body: Option<Value>) -> RequestBuilder {
        let url = self.url_for(path);
        debug!("Making {} request to {}", method, url);

        let mut req = self.client.request(method, &url).headers(self.get_headers());

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        req
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, AppError> {
        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("API error ({}): {}", status, error_text);
            return Err(AppError::from_status(status.as_u16(), error_text));
        }

        Ok(response)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>) -> Result<T, AppError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(self.build(method, path, body)).await?;
        let text = response.text().await?;
        let data = serde_json::from_str::<T>(&text)?;
        Ok(data)
    }

    /// Sends a request whose response body is irrelevant to the caller.
    pub async fn request_unit(&self, method: Method, path: &str, body: Option<Value>) -> Result<(), AppError> {
        self.send(self.build(method, path, body)).await?;
        Ok(())
    }

    /// Fetches a binary payload such as a PDF or an audio file.
    pub async fn request_bytes(&self, method: Method, path: &str) -> Result<Vec<u8>, AppError> {
        let response = self.send(self.build(method, path, None)).await?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
