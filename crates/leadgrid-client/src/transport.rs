use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use leadgrid_core::error::AppError;
use leadgrid_core::traits::Transport;
use reqwest::{Client, Proxy, StatusCode};
use url::Url;

const USER_AGENT: &str = "leadgrid/0.1";

/// JSON-over-HTTP transport using reqwest.
///
/// Direct requests share one client. Proxied requests use one client per
/// proxy URI, built on first use and cached. Error messages never include the
/// request URL, since it carries the API key.
#[derive(Clone)]
pub struct ReqwestTransport {
    direct: Client,
    proxied: Arc<Mutex<HashMap<String, Client>>>,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(Duration::from_secs(30))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            direct: build_client(timeout, None)?,
            proxied: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        })
    }

    fn client_for(&self, proxy: Option<&Url>) -> Result<Client, AppError> {
        let Some(proxy) = proxy else {
            return Ok(self.direct.clone());
        };

        let mut cache = self
            .proxied
            .lock()
            .map_err(|_| AppError::Generic("proxy client cache poisoned".into()))?;
        if let Some(client) = cache.get(proxy.as_str()) {
            return Ok(client.clone());
        }
        let client = build_client(self.timeout, Some(proxy))?;
        cache.insert(proxy.to_string(), client.clone());
        Ok(client)
    }

    fn map_send_error(&self, e: reqwest::Error) -> AppError {
        let e = e.without_url();
        if e.is_timeout() {
            AppError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            AppError::NetworkError(format!("Connection failed: {e}"))
        } else {
            AppError::HttpError(e.to_string())
        }
    }
}

fn build_client(timeout: Duration, proxy: Option<&Url>) -> Result<Client, AppError> {
    let mut builder = Client::builder().user_agent(USER_AGENT).timeout(timeout);
    // Direct means direct: system proxy variables are not consulted.
    builder = match proxy {
        Some(proxy) => builder.proxy(Proxy::all(proxy.as_str()).map_err(|e| {
            AppError::ConfigError(format!("Unusable proxy: {}", e.without_url()))
        })?),
        None => builder.no_proxy(),
    };
    builder
        .build()
        .map_err(|e| AppError::HttpError(e.to_string()))
}

impl Transport for ReqwestTransport {
    async fn get_json(&self, url: &Url, proxy: Option<&Url>) -> Result<serde_json::Value, AppError> {
        let client = self.client_for(proxy)?;
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimitExceeded);
        }
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url.path()
            )));
        }

        response.json().await.map_err(|e| {
            AppError::HttpError(format!(
                "Failed to decode response body: {}",
                e.without_url()
            ))
        })
    }
}
