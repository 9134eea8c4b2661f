use std::sync::{Arc, Mutex, PoisonError};

use reqwest::{Method, RequestBuilder, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::{
    ApiConfig,
    activity::{ActivityEntry, ActivityLog, PendingCall, curl_command},
    error::ApiError,
    types::{CreatedSwap, Network, QuoteRoute, RouteRequest, Swap},
};

/// Name of the header carrying the API key.
pub const API_KEY_HEADER: &str = "X-LS-APIKEY";

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client for the swap API.
///
/// Cloning is cheap; clones share the connection pool and the
/// [`ActivityLog`].
#[derive(Clone, derive_more::Debug)]
pub struct ApiClient {
    #[debug(skip)]
    http: reqwest::Client,
    config: ApiConfig,
    #[debug(skip)]
    activity: Arc<Mutex<ActivityLog>>,
}

/// Outcome of a single HTTP exchange, before it is logged.
struct Exchange {
    status: Option<u16>,
    payload: Option<Value>,
    result: Result<Value, ApiError>,
}

impl Exchange {
    fn transport(err: ApiError) -> Self {
        Self {
            status: None,
            payload: None,
            result: Err(err),
        }
    }

    fn failed(status: u16, payload: Value, err: ApiError) -> Self {
        Self {
            status: Some(status),
            payload: Some(payload),
            result: Err(err),
        }
    }
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            config,
            activity: Arc::new(Mutex::new(ActivityLog::default())),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Replaces the API key; blank keys disable the header.
    pub fn set_api_key(&mut self, api_key: Option<&str>) {
        self.config.set_api_key(api_key);
    }

    /// Snapshot of the activity log, most recent first.
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.with_activity(|log| log.entries().cloned().collect())
    }

    pub fn clear_activity(&self) {
        self.with_activity(ActivityLog::clear)
    }

    fn with_activity<R>(&self, f: impl FnOnce(&mut ActivityLog) -> R) -> R {
        let mut log = self.activity.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut log)
    }

    /// Networks that can fund a deposit into the given destination.
    pub async fn get_sources(
        &self,
        destination_network: &str,
        destination_token: Option<&str>,
    ) -> Result<Vec<Network>, ApiError> {
        let value = self
            .call(
                "Get sources",
                Method::GET,
                "/sources",
                &[
                    ("destination_network", Some(destination_network)),
                    ("destination_token", destination_token),
                    ("has_deposit_address", Some("true")),
                ],
                None,
            )
            .await?;
        decode_data(value)
    }

    /// Networks and tokens reachable from the given source.
    pub async fn get_destinations(
        &self,
        source_network: &str,
        source_token: &str,
        destination_network: Option<&str>,
    ) -> Result<Vec<Network>, ApiError> {
        let value = self
            .call(
                "Get destinations",
                Method::GET,
                "/destinations",
                &[
                    ("source_network", Some(source_network)),
                    ("source_token", Some(source_token)),
                    ("destination_network", destination_network),
                ],
                None,
            )
            .await?;
        decode_data(value)
    }

    pub async fn get_quote(&self, request: &RouteRequest) -> Result<Vec<QuoteRoute>, ApiError> {
        let value = self
            .call(
                "Get detailed quote",
                Method::GET,
                "/detailed_quote",
                &request.quote_query(),
                None,
            )
            .await?;
        decode_data(value)
    }

    /// Creates a swap funded through a generated deposit address.
    pub async fn create_swap(&self, request: &RouteRequest) -> Result<CreatedSwap, ApiError> {
        let body = serde_json::to_value(request.swap_body())?;
        let value = self
            .call("Create swap", Method::POST, "/swaps", &[], Some(&body))
            .await?;
        decode_data(value)
    }

    pub async fn get_swap(&self, swap_id: &str) -> Result<Swap, ApiError> {
        if swap_id.trim().is_empty() {
            return Err(ApiError::validation("Swap id is required"));
        }
        let value = self
            .call(
                "Get swap",
                Method::GET,
                &format!("/swaps/{swap_id}"),
                &[],
                None,
            )
            .await?;
        // `data` is either the swap itself or `{ "swap": ..., "quote": ... }`
        match unwrap_data(value) {
            Value::Object(mut map) if map.get("swap").is_some_and(Value::is_object) => {
                Ok(serde_json::from_value(map.remove("swap").unwrap_or_default())?)
            }
            other => Ok(serde_json::from_value(other)?),
        }
    }

    /// Issues a request and records it in the activity log.
    ///
    /// Query parameters with `None` or empty values are omitted. Each
    /// `/`-separated segment of `endpoint` is percent-encoded.
    pub async fn call(
        &self,
        label: &str,
        method: Method,
        endpoint: &str,
        query: &[(&str, Option<&str>)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let headers = self.headers();
        let header_refs: Vec<(&str, &str)> = headers.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let url = self.url(endpoint, query);
        let display_url = match &url {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.config.base_url(), endpoint),
        };
        let call = PendingCall {
            label: label.to_string(),
            method: method.clone(),
            endpoint: endpoint.to_string(),
            url: display_url.clone(),
            request_payload: body.cloned(),
            curl: curl_command(&method, &display_url, &header_refs, body),
        };

        let exchange = match url {
            Ok(url) => {
                debug!(%method, %url, label, "API request");
                let mut request = self.http.request(method.clone(), url);
                for (name, value) in &header_refs {
                    request = request.header(*name, *value);
                }
                if let Some(body) = body {
                    request = request.body(body.to_string());
                }
                Self::execute(request).await
            }
            Err(e) => Exchange::transport(e),
        };

        if let Err(e) = &exchange.result {
            warn!(%method, url = %display_url, status = ?exchange.status, %e, "API request failed");
        }

        let error = exchange.result.as_ref().err().map(ToString::to_string);
        self.with_activity(|log| log.record(call, exchange.status, exchange.payload, error));
        exchange.result
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Content-Type", JSON_CONTENT_TYPE.to_string())];
        if let Some(key) = self.config.api_key() {
            headers.push((API_KEY_HEADER, key.to_string()));
        }
        headers
    }

    fn url(&self, endpoint: &str, query: &[(&str, Option<&str>)]) -> Result<Url, ApiError> {
        let mut url = self.config.base_url().clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::validation("Base URL cannot carry a path"))?;
            segments.pop_if_empty();
            segments.extend(endpoint.split('/').filter(|s| !s.is_empty()));
        }

        let pairs: Vec<(&str, &str)> = query
            .iter()
            .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (*name, v)))
            .collect();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    async fn execute(request: RequestBuilder) -> Exchange {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return Exchange::transport(e.into()),
        };

        let status = response.status();
        let code = status.as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                return Exchange {
                    status: Some(code),
                    payload: None,
                    result: Err(e.into()),
                };
            }
        };

        if !status.is_success() {
            let payload =
                serde_json::from_str::<Value>(&text).unwrap_or_else(|_| json!({ "raw": text }));
            let message = error_message(&payload)
                .unwrap_or_else(|| format!("Request failed with status {code}"));
            return Exchange::failed(code, payload, ApiError::Http { status: code, message });
        }

        if text.trim().is_empty() {
            return Exchange {
                status: Some(code),
                payload: None,
                result: Err(ApiError::EmptyBody),
            };
        }

        if !content_type.to_ascii_lowercase().contains(JSON_CONTENT_TYPE) {
            let shown = if content_type.is_empty() { "none".to_string() } else { content_type };
            return Exchange::failed(
                code,
                json!({ "raw": text }),
                ApiError::UnexpectedContentType(shown),
            );
        }

        let payload = match serde_json::from_str::<Value>(&text) {
            Ok(payload) => payload,
            Err(e) => return Exchange::failed(code, json!({ "raw": text }), e.into()),
        };

        if payload.get("error").is_some_and(|e| !e.is_null()) {
            let message = error_message(&payload).unwrap_or_else(|| payload["error"].to_string());
            return Exchange::failed(code, payload, ApiError::Api(message));
        }

        Exchange {
            status: Some(code),
            payload: Some(payload.clone()),
            result: Ok(payload),
        }
    }
}

/// Extracts a human-readable message from an error payload.
fn error_message(payload: &Value) -> Option<String> {
    let error = payload.get("error");
    error
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .or_else(|| error.and_then(Value::as_str))
        .or_else(|| payload.get("message").and_then(Value::as_str))
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
}

fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}

fn decode_data<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    Ok(serde_json::from_value(unwrap_data(value))?)
}
