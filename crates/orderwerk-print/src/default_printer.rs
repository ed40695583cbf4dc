// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scoped default-printer switching.
//
// Submitting to "the default printer" is the only portable way some spoolers
// accept a document, so the gateway points the default at the receipt printer
// for the duration of one submission.  The previous default, or the absence
// of one, is restored when the guard drops, on every exit path including
// unwinding.

use tracing::{debug, warn};

use orderwerk_core::error::Result;

use crate::backend::SpoolBackend;

/// Holds the receipt printer as OS default until dropped.
pub struct DefaultPrinterGuard<'a> {
    backend: &'a dyn SpoolBackend,
    target: String,
    previous: Option<String>,
    switched: bool,
}

impl<'a> DefaultPrinterGuard<'a> {
    /// Capture the current default and switch it to `target`.
    ///
    /// If reading the current default fails nothing is changed.  If switching
    /// fails there is nothing to restore, so no guard is returned.
    pub fn acquire(backend: &'a dyn SpoolBackend, target: &str) -> Result<Self> {
        let previous = backend.default_printer()?;
        let switched = previous.as_deref() != Some(target);
        if switched {
            backend.set_default_printer(target)?;
            debug!(printer = target, previous = ?previous, "default printer switched");
        }
        Ok(Self {
            backend,
            target: target.to_string(),
            previous,
            switched,
        })
    }
}

impl Drop for DefaultPrinterGuard<'_> {
    fn drop(&mut self) {
        if !self.switched {
            return;
        }
        match self.previous.as_deref() {
            Some(previous) => match self.backend.set_default_printer(previous) {
                Ok(()) => debug!(previous, "default printer restored"),
                Err(e) => warn!(previous, error = %e, "failed to restore default printer"),
            },
            None => match self.backend.clear_default_printer(&self.target) {
                Ok(()) => debug!(printer = %self.target, "default printer cleared"),
                Err(e) => {
                    warn!(printer = %self.target, error = %e, "failed to clear default printer")
                }
            },
        }
    }
}
