// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Orderwerk order poller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::digest::hash_bytes;
use crate::error::OrderwerkError;

/// Identifier of a numbered order document. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(u64);

impl OrderId {
    /// Wrap a raw id. Returns `None` for 0, which is never a valid order.
    pub fn new(id: u64) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    /// The candidate that follows a cursor value (`cursor + 1`).  `None`
    /// once the id space is exhausted.
    pub fn next_after(cursor: u64) -> Option<Self> {
        cursor.checked_add(1).map(Self)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Object name in the order bucket, e.g. `wempy_order_42.docx`.
    pub fn object_name(self, prefix: &str, extension: &str) -> String {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            format!("{prefix}{}", self.0)
        } else {
            format!("{prefix}{}.{extension}", self.0)
        }
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An order document in flight between the source and the printer.
///
/// Created on a successful fetch and dropped once the print attempt is over.
#[derive(Clone)]
pub struct Order {
    pub id: OrderId,
    /// Name of the object the bytes were read from.
    pub object_name: String,
    pub bytes: Vec<u8>,
    pub fetched_at: DateTime<Utc>,
    /// SHA-256 of `bytes`, lowercase hex.
    pub sha256: String,
}

impl Order {
    pub fn new(id: OrderId, object_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let sha256 = hash_bytes(&bytes);
        Self {
            id,
            object_name: object_name.into(),
            bytes,
            fetched_at: Utc::now(),
            sha256,
        }
    }

}

impl std::fmt::Debug for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Order")
            .field("id", &self.id)
            .field("object_name", &self.object_name)
            .field("len", &self.bytes.len())
            .field("fetched_at", &self.fetched_at)
            .field("sha256", &self.sha256)
            .finish()
    }
}

/// Result of one fetch attempt against the order source.
#[derive(Debug)]
pub enum PollOutcome {
    /// The order exists and was downloaded.
    Found(Order),
    /// No such order yet. This is the steady state while waiting for work.
    NotFound,
    /// Anything else went wrong; retry on a later cycle.
    TransientError(OrderwerkError),
}

/// Unique identifier for one print submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of handing an order to the printer gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    /// The job was accepted by the spooler.
    Printed { job: JobId },
    /// The printer is known but the submission failed.
    Failed { reason: String },
}

impl PrintOutcome {
    pub fn is_printed(&self) -> bool {
        matches!(self, Self::Printed { .. })
    }
}

/// Summary of one coordinator cycle, used to pick the delay before the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Candidate printed and cursor advanced.
    Printed,
    /// Candidate does not exist yet.
    NotFound,
    /// The source reported a transient error.
    FetchFailed,
    /// The order was fetched but the print submission failed.
    PrintFailed,
    /// Unexpected failure inside the cycle.
    Fault,
}

impl CycleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Printed => "printed",
            Self::NotFound => "not_found",
            Self::FetchFailed => "fetch_failed",
            Self::PrintFailed => "print_failed",
            Self::Fault => "fault",
        }
    }
}

impl std::fmt::Display for CycleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
