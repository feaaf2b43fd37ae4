//! Client for the remote record API

use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::header;
use serde_json::{Value, json};

use crate::config::{RemoteConfig, Target};
use crate::{Error, Result};

/// Request timeout for every remote call
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// One destination record as sent to the remote
pub type Payload = serde_json::Map<String, Value>;

/// Operations the reconciliation run needs from the remote side.
pub trait RemoteApi {
    /// Identifiers the remote already holds for `target`, newest first.
    fn get_idents(&self, target: Target) -> Result<Vec<String>>;

    /// Create all `payloads` in one call.
    fn bulk_create(&self, target: Target, payloads: &[Payload]) -> Result<()>;

    /// Update the record matching the payload's identifier.
    fn update_by_ident(&self, target: Target, payload: &Payload) -> Result<()>;

    /// Field schema the remote accepts when creating `target` records.
    fn field_schema(&self, target: Target) -> Result<serde_json::Map<String, Value>>;
}

/// Blocking HTTP implementation of [`RemoteApi`].
pub struct HttpRemote {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpRemote {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::connection(config.base_url(), e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build a client and prove the key is accepted.
    pub fn healthy(config: &RemoteConfig) -> Result<Self> {
        let remote = Self::new(config)?;
        remote.check_health()?;
        Ok(remote)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Probe `healthchecks/`; the key must carry permission.
    pub fn check_health(&self) -> Result<()> {
        let health = self.request(Method::GET, "healthchecks/", None)?;
        let permitted = health
            .pointer("/auth_status/has_permission")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !permitted {
            return Err(Error::connection(
                self.url("healthchecks/"),
                format!("not allowed to connect: {health}"),
            ));
        }
        tracing::info!(remote = %self.base_url, "remote API healthy");
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!(%method, %url, "remote request");

        let mut builder = self
            .client
            .request(method.clone(), &url)
            .header(header::AUTHORIZATION, format!("Api-Key {}", self.api_key));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .map_err(|e| Error::connection(&url, e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::connection(&url, e.to_string()))?;

        if !status.is_success() {
            tracing::error!(%method, %url, %status, body = %text, "remote request failed");
            return Err(Error::connection(&url, format!("HTTP {status}: {text}")));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| Error::connection(&url, format!("response is not JSON: {e}")))
    }
}

impl RemoteApi for HttpRemote {
    fn get_idents(&self, target: Target) -> Result<Vec<String>> {
        let path = format!("sync/{target}/get_idents/");
        let response = self.request(Method::GET, &path, None)?;
        let Some(idents) = response.get("idents").and_then(Value::as_array) else {
            return Err(Error::connection(
                self.url(&path),
                format!("unexpected response {response}"),
            ));
        };
        Ok(idents
            .iter()
            .map(|ident| match ident {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect())
    }

    fn bulk_create(&self, target: Target, payloads: &[Payload]) -> Result<()> {
        let body = json!({ "new_data": payloads });
        self.request(Method::POST, &format!("sync/{target}/bulk/"), Some(&body))?;
        Ok(())
    }

    fn update_by_ident(&self, target: Target, payload: &Payload) -> Result<()> {
        let body = json!({ "new_data": payload });
        self.request(
            Method::POST,
            &format!("sync/{target}/update_by_ident/"),
            Some(&body),
        )?;
        Ok(())
    }

    fn field_schema(&self, target: Target) -> Result<serde_json::Map<String, Value>> {
        let path = target.collection_path();
        let response = self.request(Method::OPTIONS, path, None)?;
        match response.pointer("/actions/POST") {
            Some(Value::Object(schema)) => Ok(schema.clone()),
            _ => Err(Error::connection(
                self.url(path),
                "response carries no actions.POST schema",
            )),
        }
    }
}
