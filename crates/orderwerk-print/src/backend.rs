// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OS print spooling capability.
//
// `SpoolBackend` is the narrow surface the gateway needs from the operating
// system: list printers, read and change the default printer, and hand a file
// to the spooler.  `CupsBackend` implements it with the CUPS command-line
// tools (`lpstat`, `lpoptions`, `lp`), run under the C locale so their output
// can be parsed.  `WindowsBackend` (Windows only) uses the Win32 spooler and
// the shell `print` verb.  All calls are blocking.

use std::path::Path;
use std::process::Command;

use tracing::{debug, instrument};

use orderwerk_core::error::{OrderwerkError, Result};

/// Blocking access to the OS print spooler.
pub trait SpoolBackend: Send + Sync {
    /// Names of all installed printers.
    fn printers(&self) -> Result<Vec<String>>;

    /// Current default printer, if one is set.
    fn default_printer(&self) -> Result<Option<String>>;

    /// Make `name` the default printer.
    fn set_default_printer(&self, name: &str) -> Result<()>;

    /// Undo `set_default_printer(name)` when no default existed before it.
    fn clear_default_printer(&self, name: &str) -> Result<()>;

    /// Submit the file at `path` to `printer`.  Returns the spooler's request
    /// id.  Submission is fire-and-forget: success means the spooler accepted
    /// the job, not that paper came out.
    fn submit(&self, path: &Path, title: &str, printer: &str) -> Result<String>;
}

/// The spooler backend for the platform this binary was built for.
#[cfg(not(windows))]
pub fn system_backend() -> CupsBackend {
    CupsBackend::new()
}

/// The spooler backend for the platform this binary was built for.
#[cfg(windows)]
pub fn system_backend() -> crate::win32::WindowsBackend {
    crate::win32::WindowsBackend::new()
}

/// CUPS spooler driven through its command-line clients.
#[derive(Debug, Clone, Default)]
pub struct CupsBackend;

impl CupsBackend {
    pub fn new() -> Self {
        Self
    }

    /// Spooler command with untranslated messages.
    fn command(program: &str, args: &[&str]) -> Command {
        let mut command = Command::new(program);
        command.args(args).env("LC_ALL", "C").env("LANG", "C");
        command
    }

    fn run(program: &str, args: &[&str]) -> std::result::Result<String, String> {
        debug!(program, ?args, "running spooler command");
        let output = Self::command(program, args)
            .output()
            .map_err(|e| format!("{program}: {e}"))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!("{program} exited with {}: {}", output.status, stderr.trim()))
        }
    }
}

impl SpoolBackend for CupsBackend {
    #[instrument(skip(self))]
    fn printers(&self) -> Result<Vec<String>> {
        let out = Self::run("lpstat", &["-e"]).map_err(OrderwerkError::Discovery)?;
        Ok(parse_printer_list(&out))
    }

    fn default_printer(&self) -> Result<Option<String>> {
        // `lpstat -d` exits non-zero on some systems when no default is set;
        // the message still tells us which case we are in.
        match Self::run("lpstat", &["-d"]) {
            Ok(out) => Ok(parse_default_printer(&out)),
            Err(e) if e.contains("no system default") => Ok(None),
            Err(e) => Err(OrderwerkError::DefaultPrinter(e)),
        }
    }

    fn set_default_printer(&self, name: &str) -> Result<()> {
        Self::run("lpoptions", &["-d", name])
            .map(|_| ())
            .map_err(OrderwerkError::DefaultPrinter)
    }

    fn clear_default_printer(&self, name: &str) -> Result<()> {
        // Drops the user's lpoptions entry for `name`, default mark included.
        Self::run("lpoptions", &["-x", name])
            .map(|_| ())
            .map_err(OrderwerkError::DefaultPrinter)
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn submit(&self, path: &Path, title: &str, printer: &str) -> Result<String> {
        let path_str = path.to_str().ok_or_else(|| {
            OrderwerkError::Submission(format!("non UTF-8 spool path: {}", path.display()))
        })?;
        let out = Self::run("lp", &lp_args(printer, title, path_str))
            .map_err(OrderwerkError::Submission)?;
        Ok(parse_request_id(&out).unwrap_or_else(|| out.trim().to_string()))
    }
}

/// `lp` arguments naming the destination explicitly, so `LPDEST` and
/// `PRINTER` in the environment cannot redirect the job.
pub fn lp_args<'a>(printer: &'a str, title: &'a str, path: &'a str) -> [&'a str; 5] {
    ["-d", printer, "-t", title, path]
}

/// One destination name per line (`lpstat -e`).
pub fn parse_printer_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// `system default destination: NAME` or `no system default destination`.
pub fn parse_default_printer(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("system default destination:")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(String::from)
    })
}

/// `request id is NAME-42 (1 file(s))` → `NAME-42`.
pub fn parse_request_id(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("request id is "))
        .and_then(|rest| rest.split_whitespace().next())
        .map(String::from)
}
