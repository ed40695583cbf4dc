// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receipt printer discovery by model substring.

use tracing::{info, warn};

use orderwerk_core::error::{OrderwerkError, Result};

use crate::backend::SpoolBackend;

/// Find the first installed printer whose name contains `model`.
///
/// Runs once at startup.  Not finding the printer is fatal: the poller must
/// not start downloading orders it cannot print.
pub fn find_printer(backend: &dyn SpoolBackend, model: &str) -> Result<String> {
    let printers = backend.printers()?;

    match match_model(&printers, model) {
        Some(name) => {
            info!(printer = %name, model, "receipt printer found");
            Ok(name.to_string())
        }
        None => {
            warn!(model, count = printers.len(), "no printer matches model");
            Err(OrderwerkError::PrinterNotFound {
                model: model.to_string(),
                available: if printers.is_empty() {
                    "none".into()
                } else {
                    printers.join(", ")
                },
            })
        }
    }
}

/// First name containing `model`, in enumeration order.
pub fn match_model<'a>(names: &'a [String], model: &str) -> Option<&'a str> {
    names
        .iter()
        .map(String::as_str)
        .find(|name| name.contains(model))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_match_wins() {
        let list = names(&["Office_Laser", "XP-80C_USB", "XP-80C_Net"]);
        assert_eq!(match_model(&list, "XP-80C"), Some("XP-80C_USB"));
    }

    #[test]
    fn match_is_substring_and_case_sensitive() {
        let list = names(&["kitchen-xp-80c"]);
        assert_eq!(match_model(&list, "XP-80C"), None);
        assert_eq!(match_model(&list, "xp-80c"), Some("kitchen-xp-80c"));
    }
}
