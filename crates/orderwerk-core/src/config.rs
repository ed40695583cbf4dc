// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{OrderwerkError, Result};

/// Where order documents are fetched from.
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base URL of the storage project (e.g. `https://xyz.supabase.co`).
    pub url: String,
    /// Service or anon key sent as bearer token. Never serialized.
    #[serde(skip_serializing, default)]
    pub key: String,
    /// Bucket holding the order documents.
    pub bucket: String,
    /// Object name prefix before the order id.
    pub object_prefix: String,
    /// Object name extension after the order id.
    pub object_extension: String,
    /// Timeout for a single download request.
    pub request_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            bucket: String::new(),
            object_prefix: "wempy_order_".into(),
            object_extension: "docx".into(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("url", &self.url)
            .field("key", &if self.key.is_empty() { "" } else { "<redacted>" })
            .field("bucket", &self.bucket)
            .field("object_prefix", &self.object_prefix)
            .field("object_extension", &self.object_extension)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// The single receipt printer orders are sent to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrinterConfig {
    /// Substring matched against installed printer names.
    pub model: String,
    /// Directory where documents are staged before submission.
    pub spool_dir: PathBuf,
    /// Fixed wait after submission so the spooler can pick the file up
    /// before the default printer is restored.
    pub spool_delay: Duration,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            model: "XP-80C".into(),
            spool_dir: PathBuf::from("./temp_orders"),
            spool_delay: Duration::from_secs(3),
        }
    }
}

/// Cursor location and loop pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// File holding the last printed order id.
    pub state_file: PathBuf,
    /// Wait after a not-found probe or a failed print.
    pub poll_interval: Duration,
    /// Wait after the source reports a transient error.
    pub transient_delay: Duration,
    /// Wait after an unexpected failure inside a cycle.
    pub fault_delay: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("./last_order.txt"),
            poll_interval: Duration::from_secs(10),
            transient_delay: Duration::from_secs(15),
            fault_delay: Duration::from_secs(15),
        }
    }
}

/// Complete process configuration, assembled once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub printer: PrinterConfig,
    pub poller: PollerConfig,
}

impl AppConfig {
    /// Check that everything the poller needs before entering its loop is
    /// present. Reports every missing field at once.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.storage.url.trim().is_empty() {
            missing.push("SUPABASE_URL");
        }
        if self.storage.key.trim().is_empty() {
            missing.push("SUPABASE_KEY");
        }
        if self.storage.bucket.trim().is_empty() {
            missing.push("BUCKET_NAME");
        }
        if !missing.is_empty() {
            return Err(OrderwerkError::MissingConfig(missing));
        }

        if !(self.storage.url.starts_with("http://") || self.storage.url.starts_with("https://")) {
            return Err(OrderwerkError::InvalidConfig(format!(
                "storage URL must start with http:// or https://, got '{}'",
                self.storage.url
            )));
        }
        self.validate_local()
    }

    /// Checks that do not involve remote storage settings.
    pub fn validate_local(&self) -> Result<()> {
        if self.printer.model.trim().is_empty() {
            return Err(OrderwerkError::InvalidConfig(
                "printer model must not be empty".into(),
            ));
        }
        if self.poller.poll_interval.is_zero() {
            return Err(OrderwerkError::InvalidConfig(
                "poll interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.url = "https://example.supabase.co".into();
        config.storage.key = "service-key".into();
        config.storage.bucket = "orders".into();
        config
    }

    #[test]
    fn defaults_match_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.poller.poll_interval, Duration::from_secs(10));
        assert_eq!(config.poller.transient_delay, Duration::from_secs(15));
        assert!(config.poller.transient_delay > config.poller.poll_interval);
        assert_eq!(config.printer.model, "XP-80C");
        assert_eq!(config.poller.state_file, PathBuf::from("./last_order.txt"));
    }

    #[test]
    fn empty_config_reports_all_missing_fields() {
        match AppConfig::default().validate() {
            Err(OrderwerkError::MissingConfig(fields)) => {
                assert_eq!(fields, vec!["SUPABASE_URL", "SUPABASE_KEY", "BUCKET_NAME"]);
            }
            other => panic!("expected MissingConfig, got {other:?}"),
        }
    }

    #[test]
    fn complete_config_validates() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn non_http_url_is_rejected() {
        let mut config = configured();
        config.storage.url = "example.supabase.co".into();
        assert!(matches!(config.validate(), Err(OrderwerkError::InvalidConfig(_))));
    }

    #[test]
    fn key_is_redacted_and_not_serialized() {
        let config = configured();
        assert!(!format!("{:?}", config.storage).contains("service-key"));
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("service-key"));
    }
}
