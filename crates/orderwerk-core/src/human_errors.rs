// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language messages for the person running the shop counter.
//
// The poller runs unattended next to a receipt printer. When it refuses to
// start, or keeps retrying the same order, the log line alone is not enough
// for a non-technical operator, so every error maps to a short message and a
// concrete next step.

use crate::error::{ErrorClass, OrderwerkError};

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether the poller keeps retrying on its own.
    pub retriable: bool,
}

/// Convert an `OrderwerkError` into a `HumanError`.
pub fn humanize_error(err: &OrderwerkError) -> HumanError {
    let retriable = err.class() == ErrorClass::Transient;
    let (message, suggestion) = match err {
        OrderwerkError::MissingConfig(fields) => (
            "Orderwerk is not configured yet.".to_string(),
            format!(
                "Set {} in the .env file next to the program, then start it again.",
                fields.join(", ")
            ),
        ),
        OrderwerkError::InvalidConfig(detail) => (
            "A setting is not valid.".to_string(),
            format!("Fix the setting and start again. ({detail})"),
        ),
        OrderwerkError::PrinterNotFound { model, .. } => (
            format!("The {model} receipt printer was not found."),
            "Check that the printer is switched on, plugged in, and that its driver is installed."
                .to_string(),
        ),
        OrderwerkError::Discovery(_) => (
            "The list of printers could not be read.".to_string(),
            "Make sure the printing service (CUPS, or the Windows print spooler) is running.".to_string(),
        ),
        OrderwerkError::Submission(_) | OrderwerkError::DefaultPrinter(_) => (
            "The order could not be sent to the printer.".to_string(),
            "Check paper and cable. The same order will be tried again automatically.".to_string(),
        ),
        OrderwerkError::Storage(_) | OrderwerkError::StorageStatus { .. } => (
            "New orders could not be checked.".to_string(),
            "Check the internet connection. Checking resumes automatically.".to_string(),
        ),
        OrderwerkError::Cursor(_) | OrderwerkError::Io(_) => (
            "Progress could not be saved to disk.".to_string(),
            "Check free disk space and folder permissions.".to_string(),
        ),
    };

    HumanError {
        message,
        suggestion,
        retriable,
    }
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.message, self.suggestion)
    }
}
