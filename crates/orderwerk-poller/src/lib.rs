// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orderwerk Poller: the polling coordinator.  Owns the cursor (highest order
// id fetched *and* printed), walks order ids strictly in sequence, and only
// advances after a successful print.

pub mod backoff;
pub mod coordinator;
pub mod cursor;

pub use backoff::BackoffPolicy;
pub use coordinator::{Coordinator, CoordinatorState};
pub use cursor::{CursorStore, FileCursorStore, MemoryCursorStore};
