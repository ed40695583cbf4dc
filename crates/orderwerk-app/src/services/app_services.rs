// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Startup wiring: validates configuration, finds the printer, and builds
// the order source and cursor store.  Everything that can make the poller
// refuse to start happens here, before the loop is entered.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use orderwerk_core::error::Result;
use orderwerk_core::types::{OrderId, PollOutcome};
use orderwerk_core::AppConfig;
use orderwerk_poller::{BackoffPolicy, Coordinator, FileCursorStore};
use orderwerk_print::{SinglePrinter, SpoolBackend, system_backend};
use orderwerk_source::{DirectorySource, OrderSource, StorageSource};

use crate::cli::SourceKind;

/// The order source selected on the command line.
pub enum OrdersFrom {
    Storage(StorageSource),
    Directory(DirectorySource),
}

#[async_trait]
impl OrderSource for OrdersFrom {
    async fn fetch(&self, id: OrderId) -> PollOutcome {
        match self {
            Self::Storage(source) => source.fetch(id).await,
            Self::Directory(source) => source.fetch(id).await,
        }
    }
}

pub type PollingCoordinator = Coordinator<OrdersFrom, SinglePrinter, FileCursorStore>;

/// Everything the coordinator needs, built once at startup.
pub struct AppServices {
    source: OrdersFrom,
    printer: SinglePrinter,
    store: FileCursorStore,
    policy: BackoffPolicy,
}

impl AppServices {
    /// Initialise all services against the system spooler.
    pub fn init(config: AppConfig, source: SourceKind) -> Result<Self> {
        Self::init_with_backend(config, source, Arc::new(system_backend()))
    }

    /// Initialise all services against a specific spooler backend.
    pub fn init_with_backend(
        config: AppConfig,
        source: SourceKind,
        backend: Arc<dyn SpoolBackend>,
    ) -> Result<Self> {
        match source {
            SourceKind::Storage => config.validate()?,
            SourceKind::Directory(_) => config.validate_local()?,
        }

        let printer = SinglePrinter::discover(backend, &config.printer)?;

        let source = match source {
            SourceKind::Storage => {
                info!(
                    url = %config.storage.url,
                    bucket = %config.storage.bucket,
                    "reading orders from storage"
                );
                OrdersFrom::Storage(StorageSource::new(config.storage.clone())?)
            }
            SourceKind::Directory(dir) => {
                info!(dir = %dir.display(), "reading orders from local directory");
                OrdersFrom::Directory(DirectorySource::new(
                    dir,
                    config.storage.object_prefix.clone(),
                    config.storage.object_extension.clone(),
                ))
            }
        };

        info!(
            printer = printer.name(),
            state_file = %config.poller.state_file.display(),
            "services initialised"
        );

        Ok(Self {
            source,
            printer,
            store: FileCursorStore::new(config.poller.state_file.clone()),
            policy: BackoffPolicy::from(&config.poller),
        })
    }

    pub fn printer_name(&self) -> &str {
        self.printer.name()
    }

    pub fn state_file(&self) -> PathBuf {
        self.store.path().to_path_buf()
    }

    /// Hand everything over to the polling loop.  Loads the cursor.
    pub fn into_coordinator(self) -> PollingCoordinator {
        Coordinator::new(self.source, self.printer, self.store, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use orderwerk_core::error::OrderwerkError;

    use super::*;

    struct FakeSpooler {
        printers: Vec<String>,
        submitted: Mutex<Vec<String>>,
    }

    impl FakeSpooler {
        fn new(printers: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                printers: printers.iter().map(|p| p.to_string()).collect(),
                submitted: Mutex::new(Vec::new()),
            })
        }
    }

    impl SpoolBackend for FakeSpooler {
        fn printers(&self) -> Result<Vec<String>> {
            Ok(self.printers.clone())
        }

        fn default_printer(&self) -> Result<Option<String>> {
            Ok(None)
        }

        fn set_default_printer(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        fn clear_default_printer(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        fn submit(&self, _path: &Path, title: &str, _printer: &str) -> Result<String> {
            self.submitted.lock().unwrap().push(title.to_string());
            Ok("job-1".into())
        }
    }

    fn local_config(root: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.printer.spool_dir = root.join("spool");
        config.printer.spool_delay = std::time::Duration::ZERO;
        config.poller.state_file = root.join("last_order.txt");
        config
    }

    #[test]
    fn storage_source_requires_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppServices::init_with_backend(
            local_config(dir.path()),
            SourceKind::Storage,
            FakeSpooler::new(&["XP-80C"]),
        )
        .err()
        .expect("missing credentials must be fatal");
        assert!(matches!(err, OrderwerkError::MissingConfig(_)));
    }

    #[test]
    fn missing_printer_refuses_to_start() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppServices::init_with_backend(
            local_config(dir.path()),
            SourceKind::Directory(dir.path().to_path_buf()),
            FakeSpooler::new(&["Office_Laser"]),
        )
        .err()
        .expect("missing printer must be fatal");
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn directory_orders_flow_through_to_the_printer() {
        let dir = tempfile::tempdir().unwrap();
        let orders = dir.path().join("orders");
        std::fs::create_dir(&orders).unwrap();
        std::fs::write(orders.join("wempy_order_1.docx"), b"first").unwrap();
        std::fs::write(dir.path().join("last_order.txt"), "0").unwrap();

        let spooler = FakeSpooler::new(&["Office_Laser", "XP-80C (USB)"]);
        let services = AppServices::init_with_backend(
            local_config(dir.path()),
            SourceKind::Directory(orders),
            spooler.clone(),
        )
        .unwrap();
        assert_eq!(services.printer_name(), "XP-80C (USB)");

        let state_file = services.state_file();
        let mut coordinator = services.into_coordinator();
        coordinator.cycle().await;
        coordinator.cycle().await;

        assert_eq!(coordinator.cursor(), 1);
        assert_eq!(std::fs::read_to_string(state_file).unwrap(), "1");
        assert_eq!(*spooler.submitted.lock().unwrap(), vec!["wempy_order_1.docx"]);
    }
}
