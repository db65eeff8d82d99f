//! REST Resource Client
//!
//! Thin reqwest transport shared by the appliance and network adapters.
//! It owns the status rules of the control channel:
//! - below 400 is success
//! - 401 is an authentication failure (`BackendUnavailable` with `auth` set)
//! - any other status from 400 up is `BackendRejected`
//! - connection errors are `BackendUnavailable`

use super::xml_body;
use crate::domain::error::{DriverError, Result};
use reqwest::header::{HeaderMap, ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Encoding of request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyFormat {
    #[default]
    Json,
    Xml,
}

impl BodyFormat {
    fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Xml => "application/xml",
        }
    }
}

/// Configuration for a REST endpoint.
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Base URL including the service path (e.g., "https://edge.local/api")
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub format: BodyFormat,
    /// List element name -> entry element name, for XML bodies
    pub plurals: HashMap<String, String>,
    /// Headers added to every request
    pub headers: HashMap<String, String>,
    /// Return every response as-is instead of applying the status rules
    pub proxy_mode: bool,
    pub timeout_secs: u64,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            username: None,
            password: None,
            format: BodyFormat::Json,
            plurals: HashMap::new(),
            headers: HashMap::new(),
            proxy_mode: false,
            timeout_secs: 30,
        }
    }
}

/// A response that passed the status rules (or any response in proxy mode).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestResponse {
    pub status: u16,
    pub location: Option<String>,
    pub body: String,
}

impl RestResponse {
    /// Location header of a creation response.
    pub fn require_location(&self, resource: &str) -> Result<&str> {
        self.location
            .as_deref()
            .ok_or_else(|| DriverError::MissingLocation {
                resource: resource.to_string(),
            })
    }

    /// Decode a JSON body.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| DriverError::InvalidResponse(format!("{}: {}", e, self.body)))
    }
}

pub struct RestClient {
    config: RestClientConfig,
    base: Url,
    client: reqwest::Client,
}

impl RestClient {
    /// Create a client. Only http and https endpoints are accepted.
    pub fn new(config: RestClientConfig) -> Result<Self> {
        if config.uri.is_empty() {
            return Err(DriverError::Configuration(
                "no uri passed, cannot connect".to_string(),
            ));
        }

        let base = Url::parse(&config.uri)
            .map_err(|e| DriverError::Configuration(format!("invalid uri {}: {}", config.uri, e)))?;

        match base.scheme() {
            "http" | "https" => {}
            other => {
                tracing::error!("scheme in uri is unrecognized: {}", other);
                return Err(DriverError::Configuration(format!(
                    "unsupported scheme {}",
                    other
                )));
            }
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DriverError::Configuration(e.to_string()))?;

        Ok(Self {
            config,
            base,
            client,
        })
    }

    /// Base URL of the endpoint.
    pub fn uri(&self) -> &str {
        &self.config.uri
    }

    /// Merge extra headers into every following request.
    pub fn update_headers(&mut self, headers: HashMap<String, String>) {
        self.config.headers.extend(headers);
    }

    pub async fn create_resource(
        &self,
        resource_path: &str,
        object_name: &str,
        object: &Value,
    ) -> Result<RestResponse> {
        let body = self.encode(object_name, object)?;
        self.send(Method::POST, resource_path, &[], Some(body)).await
    }

    pub async fn retrieve_resource(&self, resource_path: &str) -> Result<RestResponse> {
        self.send(Method::GET, resource_path, &[], None).await
    }

    /// GET with query parameters, e.g. collection filters.
    pub async fn retrieve_resource_with_query(
        &self,
        resource_path: &str,
        query: &[(&str, &str)],
    ) -> Result<RestResponse> {
        self.send(Method::GET, resource_path, query, None).await
    }

    pub async fn update_resource(
        &self,
        resource_path: &str,
        object_name: &str,
        object: &Value,
    ) -> Result<RestResponse> {
        let body = self.encode(object_name, object)?;
        self.send(Method::PUT, resource_path, &[], Some(body)).await
    }

    pub async fn remove_resource(&self, resource_path: &str) -> Result<RestResponse> {
        self.send(Method::DELETE, resource_path, &[], None).await
    }

    fn encode(&self, object_name: &str, object: &Value) -> Result<String> {
        match self.config.format {
            BodyFormat::Json => serde_json::to_string(object)
                .map_err(|e| DriverError::InvalidResponse(format!("cannot encode body: {}", e))),
            BodyFormat::Xml => Ok(xml_body::render(object_name, object, &self.config.plurals)),
        }
    }

    fn url_for(&self, resource_path: &str) -> String {
        format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            resource_path.trim_start_matches('/')
        )
    }

    async fn send(
        &self,
        method: Method,
        resource_path: &str,
        query: &[(&str, &str)],
        body: Option<String>,
    ) -> Result<RestResponse> {
        let url = self.url_for(resource_path);
        tracing::debug!("request {} {}", method, url);

        let content_type = self.config.format.content_type();
        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, content_type);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(user) = &self.config.username {
            request = request.basic_auth(user, self.config.password.as_ref());
        }
        for (name, value) in &self.config.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            tracing::debug!("request body: {}", body);
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("error while connecting to {}: {}", self.config.uri, e);
            DriverError::unavailable(self.config.uri.clone(), e.to_string())
        })?;

        let status = response.status();
        let location = location_of(response.headers());
        let body = response.text().await.map_err(|e| {
            DriverError::unavailable(
                self.config.uri.clone(),
                format!("failed reading response body: {}", e),
            )
        })?;

        tracing::debug!("response {} for {} {}: {}", status, method, url, body);

        let response = RestResponse {
            status: status.as_u16(),
            location,
            body,
        };

        if self.config.proxy_mode {
            return Ok(response);
        }

        self.check_status(&method, &url, status, response)
    }

    fn check_status(
        &self,
        method: &Method,
        url: &str,
        status: StatusCode,
        response: RestResponse,
    ) -> Result<RestResponse> {
        if status == StatusCode::UNAUTHORIZED {
            tracing::error!(
                "unable to login, invalid credentials passed for {}",
                self.config.uri
            );
            return Err(DriverError::auth_failed(self.config.uri.clone()));
        }

        if status.as_u16() >= 400 {
            tracing::error!("{} {} failed with status {}", method, url, status);
            return Err(DriverError::BackendRejected {
                status: status.as_u16(),
                body: response.body,
            });
        }

        Ok(response)
    }
}

fn location_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
