// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Orderwerk.

use thiserror::Error;

/// Top-level error type for all Orderwerk operations.
#[derive(Debug, Error)]
pub enum OrderwerkError {
    // -- Configuration --
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Printer --
    #[error("no printer matching '{model}' found (available: {available})")]
    PrinterNotFound { model: String, available: String },

    #[error("printer enumeration failed: {0}")]
    Discovery(String),

    #[error("print submission failed: {0}")]
    Submission(String),

    #[error("default printer change failed: {0}")]
    DefaultPrinter(String),

    // -- Order storage --
    #[error("storage request failed: {0}")]
    Storage(String),

    #[error("storage returned HTTP {status}: {body}")]
    StorageStatus { status: u16, body: String },

    // -- Persistence --
    #[error("cursor persistence failed: {0}")]
    Cursor(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether an error can be retried on a later cycle or must stop startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network, printer, or storage hiccup; retry on a later cycle.
    Transient,
    /// Missing configuration or hardware; the poller must not start.
    Fatal,
}

impl OrderwerkError {
    /// Classify this error for the retry-or-refuse decision.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingConfig(_) | Self::InvalidConfig(_) | Self::PrinterNotFound { .. } => {
                ErrorClass::Fatal
            }
            Self::Discovery(_)
            | Self::Submission(_)
            | Self::DefaultPrinter(_)
            | Self::Storage(_)
            | Self::StorageStatus { .. }
            | Self::Cursor(_)
            | Self::Io(_) => ErrorClass::Transient,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OrderwerkError>;
