// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Windows print spooler.
//
// Printers and the default printer go through the Win32 spooler API.  The
// document itself is handed to its registered application with the shell
// `print` verb, which is how `.docx` orders reach a receipt driver: the
// application renders the document and prints it on the default printer.

use std::path::Path;

use ::windows::Win32::Graphics::Printing::{
    EnumPrintersW, GetDefaultPrinterW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL,
    PRINTER_INFO_4W, SetDefaultPrinterW,
};
use ::windows::Win32::UI::Shell::ShellExecuteW;
use ::windows::Win32::UI::WindowsAndMessaging::SW_HIDE;
use ::windows::core::{PCWSTR, PWSTR, w};
use tracing::{debug, instrument};

use orderwerk_core::error::{OrderwerkError, Result};

use crate::backend::SpoolBackend;

/// Win32 spooler plus shell printing.
#[derive(Debug, Clone, Default)]
pub struct WindowsBackend;

impl WindowsBackend {
    pub fn new() -> Self {
        Self
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// `ShellExecuteW` reports success with a value greater than 32.
fn shell_execute_succeeded(code: isize) -> bool {
    code > 32
}

impl SpoolBackend for WindowsBackend {
    #[instrument(skip(self))]
    fn printers(&self) -> Result<Vec<String>> {
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;

        unsafe {
            let _ = EnumPrintersW(flags, None, 4, None, &mut needed, &mut returned);
            if needed == 0 {
                return Ok(Vec::new());
            }

            let mut buf: Vec<u8> = vec![0; needed as usize];
            EnumPrintersW(
                flags,
                None,
                4,
                Some(buf.as_mut_slice()),
                &mut needed,
                &mut returned,
            )
            .map_err(|e| OrderwerkError::Discovery(format!("EnumPrintersW: {e}")))?;

            let infos = std::slice::from_raw_parts(
                buf.as_ptr() as *const PRINTER_INFO_4W,
                returned as usize,
            );
            Ok(infos
                .iter()
                .filter(|info| !info.pPrinterName.is_null())
                .filter_map(|info| PWSTR(info.pPrinterName.0).to_string().ok())
                .collect())
        }
    }

    fn default_printer(&self) -> Result<Option<String>> {
        unsafe {
            let mut needed: u32 = 0;
            let _ = GetDefaultPrinterW(None, &mut needed);
            if needed == 0 {
                return Ok(None);
            }

            let mut buf: Vec<u16> = vec![0; needed as usize];
            if !GetDefaultPrinterW(Some(PWSTR(buf.as_mut_ptr())), &mut needed).as_bool() {
                return Ok(None);
            }
            PWSTR(buf.as_mut_ptr())
                .to_string()
                .map(Some)
                .map_err(|e| OrderwerkError::DefaultPrinter(format!("UTF-16 decode: {e}")))
        }
    }

    fn set_default_printer(&self, name: &str) -> Result<()> {
        let wide = to_wide(name);
        let ok = unsafe { SetDefaultPrinterW(PCWSTR::from_raw(wide.as_ptr())) };
        if ok.as_bool() {
            Ok(())
        } else {
            Err(OrderwerkError::DefaultPrinter(format!(
                "SetDefaultPrinterW({name}): {}",
                std::io::Error::last_os_error()
            )))
        }
    }

    fn clear_default_printer(&self, name: &str) -> Result<()> {
        Err(OrderwerkError::DefaultPrinter(format!(
            "Windows cannot unset the default printer; {name} stays default"
        )))
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    fn submit(&self, path: &Path, title: &str, printer: &str) -> Result<String> {
        let file = to_wide(&path.to_string_lossy());
        debug!(printer, "shell print verb");
        let instance = unsafe {
            ShellExecuteW(
                None,
                w!("print"),
                PCWSTR::from_raw(file.as_ptr()),
                PCWSTR::null(),
                PCWSTR::null(),
                SW_HIDE,
            )
        };

        let code = instance.0 as isize;
        if shell_execute_succeeded(code) {
            Ok(format!("{printer}:{title}"))
        } else {
            Err(OrderwerkError::Submission(format!(
                "ShellExecuteW print {} failed with code {code}",
                path.display()
            )))
        }
    }
}
