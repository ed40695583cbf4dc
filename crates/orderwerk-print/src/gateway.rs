// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer gateway: one receipt printer, one job per order.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::{error, info, instrument, warn};

use orderwerk_core::config::PrinterConfig;
use orderwerk_core::digest;
use orderwerk_core::error::{OrderwerkError, Result};
use orderwerk_core::types::{JobId, Order, PrintOutcome};

use crate::backend::SpoolBackend;
use crate::default_printer::DefaultPrinterGuard;
use crate::discovery::find_printer;

/// Anything that can print an order document.
///
/// Each call is an independent job submission and must be safe to repeat for
/// the same order.
#[async_trait]
pub trait PrinterGateway: Send + Sync {
    async fn print(&self, order: &Order) -> PrintOutcome;
}

/// The single receipt printer found at startup.
pub struct SinglePrinter {
    backend: Arc<dyn SpoolBackend>,
    name: String,
    spool_dir: PathBuf,
    spool_delay: Duration,
}

impl SinglePrinter {
    /// Locate the printer named by `config.model` and prepare the spool
    /// directory.  Fails fast if either is impossible.
    pub fn discover(backend: Arc<dyn SpoolBackend>, config: &PrinterConfig) -> Result<Self> {
        let name = find_printer(backend.as_ref(), &config.model)?;
        std::fs::create_dir_all(&config.spool_dir)?;
        Ok(Self {
            backend,
            name,
            spool_dir: config.spool_dir.clone(),
            spool_delay: config.spool_delay,
        })
    }

    /// Spooler name of the receipt printer.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl PrinterGateway for SinglePrinter {
    #[instrument(skip_all, fields(order_id = %order.id, printer = %self.name))]
    async fn print(&self, order: &Order) -> PrintOutcome {
        let job = JobId::new();
        let backend = Arc::clone(&self.backend);
        let name = self.name.clone();
        let spool_dir = self.spool_dir.clone();
        let delay = self.spool_delay;
        let order = order.clone();

        let submitted = tokio::task::spawn_blocking(move || {
            submit_blocking(backend.as_ref(), &name, &spool_dir, delay, &order, job)
        })
        .await;

        match submitted {
            Ok(Ok(request)) => {
                info!(%job, request = %request, "order sent to printer");
                PrintOutcome::Printed { job }
            }
            Ok(Err(e)) => {
                warn!(%job, error = %e, "print submission failed");
                PrintOutcome::Failed {
                    reason: e.to_string(),
                }
            }
            Err(e) => {
                error!(%job, error = %e, "print task aborted");
                PrintOutcome::Failed {
                    reason: format!("print task aborted: {e}"),
                }
            }
        }
    }
}

/// Stage, switch default, submit, wait for the spooler, restore default.
fn submit_blocking(
    backend: &dyn SpoolBackend,
    printer: &str,
    spool_dir: &Path,
    delay: Duration,
    order: &Order,
    job: JobId,
) -> Result<String> {
    let staged = stage(spool_dir, order)?;
    info!(
        %job,
        path = %staged.path().display(),
        bytes = order.bytes.len(),
        sha256 = digest::short(&order.sha256),
        "printing staged order"
    );

    let guard = DefaultPrinterGuard::acquire(backend, printer)?;
    let request = backend.submit(staged.path(), &order.object_name, printer)?;

    // No completion signal exists; give the spooler a fixed window before
    // the default is switched back and the staged file is removed.
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
    drop(guard);
    Ok(request)
}

/// Write the order to a uniquely named file directly in the spool directory,
/// keeping the original extension so the spooler picks the right filter.
/// Folder components of the object name are dropped.  Removed when the
/// returned handle drops.
fn stage(spool_dir: &Path, order: &Order) -> Result<NamedTempFile> {
    use std::io::Write;

    let file_name = Path::new(&order.object_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("order");
    let (stem, extension) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{ext}")),
        _ => (file_name, String::new()),
    };

    let mut file = tempfile::Builder::new()
        .prefix(&format!("{stem}."))
        .suffix(&extension)
        .tempfile_in(spool_dir)?;
    file.write_all(&order.bytes)?;
    file.as_file()
        .sync_all()
        .map_err(|e| OrderwerkError::Submission(format!("staging {}: {e}", order.object_name)))?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use orderwerk_core::types::OrderId;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        SetDefault(String),
        ClearDefault(String),
        Submit {
            title: String,
            printer: String,
            existed: bool,
        },
    }

    #[derive(Default)]
    struct FakeSpooler {
        printers: Vec<String>,
        default: Mutex<Option<String>>,
        calls: Mutex<Vec<Call>>,
        staged: Mutex<Vec<PathBuf>>,
        fail_submit: bool,
        panic_submit: bool,
    }

    impl FakeSpooler {
        fn with_default(default: Option<&str>) -> Self {
            Self {
                printers: vec!["Office_Laser".into(), "XP-80C_USB".into()],
                default: Mutex::new(default.map(String::from)),
                ..Default::default()
            }
        }

        fn staged_paths(&self) -> Vec<PathBuf> {
            self.staged.lock().unwrap().clone()
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn current_default(&self) -> Option<String> {
            self.default.lock().unwrap().clone()
        }
    }

    impl SpoolBackend for FakeSpooler {
        fn printers(&self) -> Result<Vec<String>> {
            Ok(self.printers.clone())
        }

        fn default_printer(&self) -> Result<Option<String>> {
            Ok(self.current_default())
        }

        fn set_default_printer(&self, name: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::SetDefault(name.into()));
            *self.default.lock().unwrap() = Some(name.into());
            Ok(())
        }

        fn clear_default_printer(&self, name: &str) -> Result<()> {
            self.calls.lock().unwrap().push(Call::ClearDefault(name.into()));
            let mut default = self.default.lock().unwrap();
            if default.as_deref() == Some(name) {
                *default = None;
            }
            Ok(())
        }

        fn submit(&self, path: &Path, title: &str, printer: &str) -> Result<String> {
            self.staged.lock().unwrap().push(path.to_path_buf());
            self.calls.lock().unwrap().push(Call::Submit {
                title: title.into(),
                printer: printer.into(),
                existed: path.exists(),
            });
            if self.panic_submit {
                panic!("spooler crashed");
            }
            if self.fail_submit {
                return Err(OrderwerkError::Submission("printer busy".into()));
            }
            Ok("XP-80C_USB-1".into())
        }
    }

    fn config(spool_dir: &Path) -> PrinterConfig {
        PrinterConfig {
            model: "XP-80C".into(),
            spool_dir: spool_dir.to_path_buf(),
            spool_delay: Duration::ZERO,
        }
    }

    fn order() -> Order {
        Order::new(OrderId::new(7).unwrap(), "wempy_order_7.docx", b"receipt".to_vec())
    }

    fn spool_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    #[test]
    fn discover_picks_matching_printer() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler::with_default(None));
        let printer = SinglePrinter::discover(spooler, &config(dir.path())).unwrap();
        assert_eq!(printer.name(), "XP-80C_USB");
    }

    #[test]
    fn discover_without_match_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler {
            printers: vec!["Office_Laser".into()],
            ..Default::default()
        });
        let err = SinglePrinter::discover(spooler, &config(dir.path()))
            .err()
            .expect("discovery must fail");
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Office_Laser"));
    }

    #[tokio::test]
    async fn success_restores_previous_default() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler::with_default(Some("Office_Laser")));
        let printer = SinglePrinter::discover(spooler.clone(), &config(dir.path())).unwrap();

        let outcome = printer.print(&order()).await;

        assert!(outcome.is_printed());
        assert_eq!(
            spooler.calls(),
            vec![
                Call::SetDefault("XP-80C_USB".into()),
                Call::Submit {
                    title: "wempy_order_7.docx".into(),
                    printer: "XP-80C_USB".into(),
                    existed: true
                },
                Call::SetDefault("Office_Laser".into()),
            ]
        );
        assert_eq!(spooler.current_default().as_deref(), Some("Office_Laser"));
        assert!(spool_is_empty(dir.path()), "staged file must be removed");
    }

    #[tokio::test]
    async fn failure_still_restores_previous_default() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler {
            fail_submit: true,
            ..FakeSpooler::with_default(Some("Office_Laser"))
        });
        let printer = SinglePrinter::discover(spooler.clone(), &config(dir.path())).unwrap();

        let outcome = printer.print(&order()).await;

        assert!(matches!(outcome, PrintOutcome::Failed { ref reason } if reason.contains("busy")));
        assert_eq!(spooler.current_default().as_deref(), Some("Office_Laser"));
        assert!(spool_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn panic_during_submit_restores_default_and_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler {
            panic_submit: true,
            ..FakeSpooler::with_default(Some("Office_Laser"))
        });
        let printer = SinglePrinter::discover(spooler.clone(), &config(dir.path())).unwrap();

        let outcome = printer.print(&order()).await;

        assert!(!outcome.is_printed());
        assert_eq!(spooler.current_default().as_deref(), Some("Office_Laser"));
    }

    #[tokio::test]
    async fn already_default_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler::with_default(Some("XP-80C_USB")));
        let printer = SinglePrinter::discover(spooler.clone(), &config(dir.path())).unwrap();

        assert!(printer.print(&order()).await.is_printed());
        assert!(
            spooler
                .calls()
                .iter()
                .all(|call| !matches!(call, Call::SetDefault(_)))
        );
    }

    #[tokio::test]
    async fn each_print_is_a_separate_job() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler::with_default(None));
        let printer = SinglePrinter::discover(spooler, &config(dir.path())).unwrap();

        let first = printer.print(&order()).await;
        let second = printer.print(&order()).await;
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn folder_style_object_name_is_staged_in_spool_dir() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler::with_default(Some("Office_Laser")));
        let printer = SinglePrinter::discover(spooler.clone(), &config(dir.path())).unwrap();
        let order = Order::new(
            OrderId::new(7).unwrap(),
            "orders/2026/wempy_order_7.docx",
            b"receipt".to_vec(),
        );

        assert!(printer.print(&order).await.is_printed());

        let staged = spooler.staged_paths();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].parent(), Some(dir.path()));
        let name = staged[0].file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("wempy_order_7."));
        assert!(name.ends_with(".docx"));
    }

    #[tokio::test]
    async fn no_previous_default_is_restored_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let spooler = Arc::new(FakeSpooler::with_default(None));
        let printer = SinglePrinter::discover(spooler.clone(), &config(dir.path())).unwrap();

        assert!(printer.print(&order()).await.is_printed());

        assert_eq!(spooler.current_default(), None);
        assert_eq!(
            spooler.calls().last(),
            Some(&Call::ClearDefault("XP-80C_USB".into()))
        );
    }
}
