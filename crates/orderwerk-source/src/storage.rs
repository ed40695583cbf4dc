// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object-storage order source (Supabase Storage REST API).
//
// Downloads `GET <url>/storage/v1/object/<bucket>/<object>` with the project
// key as bearer token.  Each path segment is percent-encoded; `/` inside the
// object name separates folders.  The storage API reports a missing object either as a
// plain 404 or as a 400 whose JSON body carries `statusCode: "404"` /
// `error: "not_found"`; both map to `PollOutcome::NotFound`.  Anything else
// is transient.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use orderwerk_core::config::StorageConfig;
use orderwerk_core::digest;
use orderwerk_core::error::{OrderwerkError, Result};
use orderwerk_core::types::{Order, OrderId, PollOutcome};

use crate::source::OrderSource;

/// Longest error body kept in `StorageStatus` errors.
const MAX_ERROR_BODY: usize = 512;

/// Error payload returned by the storage API.
#[derive(Debug, Deserialize)]
struct StorageErrorBody {
    #[serde(rename = "statusCode", default)]
    status_code: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Order source backed by a storage bucket.
///
/// Built once at startup from an explicit `StorageConfig` and held for the
/// life of the process.
pub struct StorageSource {
    client: reqwest::Client,
    base: Url,
    config: StorageConfig,
}

impl StorageSource {
    pub fn new(config: StorageConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OrderwerkError::InvalidConfig(format!("HTTP client: {e}")))?;
        let base = Url::parse(&config.url)
            .map_err(|e| OrderwerkError::InvalidConfig(format!("storage URL '{}': {e}", config.url)))?;
        if base.cannot_be_a_base() {
            return Err(OrderwerkError::InvalidConfig(format!(
                "storage URL '{}' cannot hold a path",
                config.url
            )));
        }
        Ok(Self {
            client,
            base,
            config,
        })
    }

    /// Download URL for an object in the configured bucket.
    pub fn object_url(&self, object_name: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| OrderwerkError::Storage(format!("cannot extend URL {}", self.base)))?
            .pop_if_empty()
            .extend(["storage", "v1", "object", self.config.bucket.as_str()])
            .extend(object_name.split('/'));
        Ok(url)
    }

    async fn download(&self, id: OrderId, object_name: String) -> PollOutcome {
        let url = match self.object_url(&object_name) {
            Ok(url) => url,
            Err(e) => return PollOutcome::TransientError(e),
        };
        let response = match self
            .client
            .get(url)
            .bearer_auth(&self.config.key)
            .header("apikey", &self.config.key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return PollOutcome::TransientError(OrderwerkError::Storage(format!(
                    "GET {object_name}: {e}"
                )));
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.bytes().await {
                Ok(bytes) => {
                    let order = Order::new(id, object_name, bytes.to_vec());
                    info!(
                        order_id = %id,
                        object = %order.object_name,
                        bytes = order.bytes.len(),
                        sha256 = digest::short(&order.sha256),
                        "order downloaded"
                    );
                    PollOutcome::Found(order)
                }
                Err(e) => PollOutcome::TransientError(OrderwerkError::Storage(format!(
                    "reading body of {object_name}: {e}"
                ))),
            };
        }

        let body = response.text().await.unwrap_or_default();
        if is_not_found(status, &body) {
            debug!(order_id = %id, object = %object_name, "order not uploaded yet");
            PollOutcome::NotFound
        } else {
            warn!(order_id = %id, status = status.as_u16(), "unexpected storage response");
            PollOutcome::TransientError(OrderwerkError::StorageStatus {
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY),
            })
        }
    }
}

#[async_trait]
impl OrderSource for StorageSource {
    #[instrument(skip(self), fields(bucket = %self.config.bucket))]
    async fn fetch(&self, id: OrderId) -> PollOutcome {
        let object_name = id.object_name(&self.config.object_prefix, &self.config.object_extension);
        self.download(id, object_name).await
    }
}

/// Whether a non-success response means "no such object".
pub fn is_not_found(status: StatusCode, body: &str) -> bool {
    if status == StatusCode::NOT_FOUND {
        return true;
    }
    if status != StatusCode::BAD_REQUEST {
        return false;
    }

    let Ok(parsed) = serde_json::from_str::<StorageErrorBody>(body) else {
        return false;
    };

    let status_code_404 = match parsed.status_code {
        Some(serde_json::Value::String(code)) => code == "404",
        Some(serde_json::Value::Number(code)) => code.as_u64() == Some(404),
        _ => false,
    };
    let named_not_found = [parsed.error.as_deref(), parsed.code.as_deref()]
        .into_iter()
        .flatten()
        .any(|tag| tag.eq_ignore_ascii_case("not_found") || tag == "NoSuchKey");

    status_code_404 || named_not_found
}

fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        return body.to_string();
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &body[..end])
}
