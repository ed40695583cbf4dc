// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use async_trait::async_trait;

use orderwerk_core::types::{OrderId, PollOutcome};

/// Lookup of order documents by id.
///
/// `PollOutcome::NotFound` is the expected answer while waiting for the next
/// order and must only be returned when the order does not exist.  Every
/// other failure is `PollOutcome::TransientError`.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn fetch(&self, id: OrderId) -> PollOutcome;
}
