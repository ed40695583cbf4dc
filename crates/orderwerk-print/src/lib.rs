// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orderwerk Print: the printer gateway.  Finds the receipt printer once at
// startup and submits each order document to it, switching the OS default
// printer for the duration of the submission and restoring it afterwards.

pub mod backend;
pub mod default_printer;
pub mod discovery;
pub mod gateway;
#[cfg(windows)]
pub mod win32;

pub use backend::{CupsBackend, SpoolBackend, system_backend};
pub use default_printer::DefaultPrinterGuard;
pub use discovery::find_printer;
pub use gateway::{PrinterGateway, SinglePrinter};
#[cfg(windows)]
pub use win32::WindowsBackend;
