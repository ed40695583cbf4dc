// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delay policy between coordinator cycles.
//
// Retries are unbounded: the next order cannot be printed before the current
// one, so giving up would stall the shop.  What changes with the outcome is
// only how long to wait.  Failures wait longer than an empty poll so a
// struggling dependency is not hammered.

use std::time::Duration;

use orderwerk_core::config::PollerConfig;
use orderwerk_core::types::CycleOutcome;

/// Fixed delays per cycle outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// After a not-found probe or a failed print.
    pub poll_interval: Duration,
    /// After the source reported a transient error.
    pub transient_delay: Duration,
    /// After an unexpected failure inside a cycle.
    pub fault_delay: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&PollerConfig::default())
    }
}

impl From<&PollerConfig> for BackoffPolicy {
    fn from(config: &PollerConfig) -> Self {
        Self {
            poll_interval: config.poll_interval,
            transient_delay: config.transient_delay,
            fault_delay: config.fault_delay,
        }
    }
}

impl BackoffPolicy {
    /// How long to wait before the next cycle.  `None` means go again
    /// immediately: after a print there may be a burst of orders waiting.
    pub fn delay_for(&self, outcome: CycleOutcome) -> Option<Duration> {
        match outcome {
            CycleOutcome::Printed => None,
            CycleOutcome::NotFound | CycleOutcome::PrintFailed => Some(self.poll_interval),
            CycleOutcome::FetchFailed => Some(self.transient_delay),
            CycleOutcome::Fault => Some(self.fault_delay),
        }
    }
}
