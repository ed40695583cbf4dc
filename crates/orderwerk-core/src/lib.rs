// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orderwerk: Core types, configuration, and error definitions shared across
// all crates.

pub mod config;
pub mod digest;
pub mod error;
pub mod human_errors;
pub mod types;

pub use config::{AppConfig, PollerConfig, PrinterConfig, StorageConfig};
pub use error::{ErrorClass, OrderwerkError};
pub use types::*;
