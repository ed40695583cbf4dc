// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Orderwerk Source: where numbered order documents come from.  Every source
// answers a fetch with a tagged `PollOutcome` so that "not uploaded yet" is
// never confused with a real failure.

pub mod directory;
pub mod source;
pub mod storage;

pub use directory::DirectorySource;
pub use source::OrderSource;
pub use storage::StorageSource;
