// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line flags.  Every flag can also come from the environment (or a
// `.env` file next to the binary); anything left unset keeps the
// `AppConfig` default.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

use orderwerk_core::AppConfig;

/// Where orders are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// The configured storage bucket.
    Storage,
    /// A local directory (`dir:<path>`).
    Directory(PathBuf),
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "storage" {
            return Ok(Self::Storage);
        }
        match s.strip_prefix("dir:") {
            Some(path) if !path.is_empty() => Ok(Self::Directory(PathBuf::from(path))),
            _ => Err(format!("expected 'storage' or 'dir:<path>', got '{s}'")),
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "orderwerk",
    version,
    about = "Polls for numbered order documents and prints each one on the receipt printer"
)]
pub struct Cli {
    /// Storage project URL.
    #[arg(long, env = "SUPABASE_URL")]
    pub storage_url: Option<String>,

    /// Storage API key.
    #[arg(long, env = "SUPABASE_KEY", hide_env_values = true)]
    pub storage_key: Option<String>,

    /// Bucket holding the order documents.
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket: Option<String>,

    /// Object name prefix before the order id.
    #[arg(long, env = "ORDERWERK_OBJECT_PREFIX")]
    pub object_prefix: Option<String>,

    /// Object name extension after the order id.
    #[arg(long, env = "ORDERWERK_OBJECT_EXTENSION")]
    pub object_extension: Option<String>,

    /// Order source: `storage` or `dir:<path>`.
    #[arg(long, env = "ORDERWERK_SOURCE", default_value = "storage")]
    pub source: SourceKind,

    /// Substring of the receipt printer's name.
    #[arg(long, env = "ORDERWERK_PRINTER_MODEL")]
    pub printer_model: Option<String>,

    /// Directory for documents waiting to be spooled.
    #[arg(long, env = "ORDERWERK_SPOOL_DIR")]
    pub spool_dir: Option<PathBuf>,

    /// Seconds to wait after submitting a job.
    #[arg(long, env = "ORDERWERK_SPOOL_DELAY_SECS")]
    pub spool_delay_secs: Option<u64>,

    /// File holding the last printed order id.
    #[arg(long, env = "ORDERWERK_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Seconds between checks while no new order exists.
    #[arg(long, env = "ORDERWERK_POLL_INTERVAL_SECS")]
    pub poll_interval_secs: Option<u64>,

    /// Seconds to wait after a storage error.
    #[arg(long, env = "ORDERWERK_TRANSIENT_DELAY_SECS")]
    pub transient_delay_secs: Option<u64>,

    /// Seconds to wait after an unexpected failure.
    #[arg(long, env = "ORDERWERK_FAULT_DELAY_SECS")]
    pub fault_delay_secs: Option<u64>,

    /// Seconds before a download attempt times out.
    #[arg(long, env = "ORDERWERK_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    /// Emit JSON log lines.
    #[arg(long, env = "ORDERWERK_LOG_JSON")]
    pub log_json: bool,

    /// Verify configuration and printer, then exit.
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    /// Overlay the flags onto the default configuration.
    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        let secs = Duration::from_secs;

        let storage = &mut config.storage;
        set(&mut storage.url, self.storage_url.clone());
        set(&mut storage.key, self.storage_key.clone());
        set(&mut storage.bucket, self.bucket.clone());
        set(&mut storage.object_prefix, self.object_prefix.clone());
        set(&mut storage.object_extension, self.object_extension.clone());
        set(&mut storage.request_timeout, self.request_timeout_secs.map(secs));

        let printer = &mut config.printer;
        set(&mut printer.model, self.printer_model.clone());
        set(&mut printer.spool_dir, self.spool_dir.clone());
        set(&mut printer.spool_delay, self.spool_delay_secs.map(secs));

        let poller = &mut config.poller;
        set(&mut poller.state_file, self.state_file.clone());
        set(&mut poller.poll_interval, self.poll_interval_secs.map(secs));
        set(&mut poller.transient_delay, self.transient_delay_secs.map(secs));
        set(&mut poller.fault_delay, self.fault_delay_secs.map(secs));

        config
    }
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_parses() {
        assert_eq!("storage".parse::<SourceKind>(), Ok(SourceKind::Storage));
        assert_eq!(
            "dir:/srv/orders".parse::<SourceKind>(),
            Ok(SourceKind::Directory(PathBuf::from("/srv/orders")))
        );
        assert!("dir:".parse::<SourceKind>().is_err());
        assert!("s3".parse::<SourceKind>().is_err());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "orderwerk",
            "--storage-url",
            "https://example.supabase.co",
            "--poll-interval-secs",
            "3",
            "--state-file",
            "/var/lib/orderwerk/last_order.txt",
            "--printer-model",
            "TM-T20",
        ])
        .unwrap();
        let config = cli.config();

        assert_eq!(config.storage.url, "https://example.supabase.co");
        assert_eq!(config.poller.poll_interval, Duration::from_secs(3));
        assert_eq!(
            config.poller.state_file,
            PathBuf::from("/var/lib/orderwerk/last_order.txt")
        );
        assert_eq!(config.printer.model, "TM-T20");
        assert_eq!(config.poller.fault_delay, Duration::from_secs(15));
    }

    #[test]
    fn check_flag_and_dir_source() {
        let cli = Cli::try_parse_from(["orderwerk", "--check", "--source", "dir:./orders"]).unwrap();
        assert!(cli.check);
        assert_eq!(cli.source, SourceKind::Directory(PathBuf::from("./orders")));
    }
}
