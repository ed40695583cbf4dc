// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Polling coordinator: the fetch → print → advance loop.
//
// One cycle at a time, one order id at a time, in strictly increasing order.
// The cursor only moves after the printer accepted the order, and is saved
// before the next cycle starts.  Nothing that goes wrong inside a cycle ends
// the loop; only the shutdown token does, and only between cycles.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use orderwerk_core::digest;
use orderwerk_core::types::{CycleOutcome, OrderId, PollOutcome, PrintOutcome};
use orderwerk_print::PrinterGateway;
use orderwerk_source::OrderSource;

use crate::backoff::BackoffPolicy;
use crate::cursor::CursorStore;

/// Where the coordinator is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Between cycles.
    Idle,
    /// Waiting on the order source.
    Fetching,
    /// Waiting on the printer gateway.
    Printing,
    /// Recording the printed order as the new cursor.
    Advancing,
    /// Sleeping before the next cycle.
    Backoff,
}

pub struct Coordinator<S, P, C> {
    source: S,
    printer: P,
    store: C,
    policy: BackoffPolicy,
    cursor: u64,
    state: CoordinatorState,
}

impl<S, P, C> Coordinator<S, P, C>
where
    S: OrderSource,
    P: PrinterGateway,
    C: CursorStore,
{
    /// Build a coordinator resuming from the persisted cursor.
    pub fn new(source: S, printer: P, store: C, policy: BackoffPolicy) -> Self {
        let cursor = store.load();
        info!(
            cursor,
            next = OrderId::next_after(cursor).map(OrderId::get),
            "cursor restored"
        );
        Self {
            source,
            printer,
            store,
            policy,
            cursor,
            state: CoordinatorState::Idle,
        }
    }

    /// Highest order id fetched and printed.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// The order id the next cycle will attempt.  `None` once the cursor
    /// holds the largest representable id.
    pub fn candidate(&self) -> Option<OrderId> {
        OrderId::next_after(self.cursor)
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Poll until `shutdown` is cancelled.
    ///
    /// Cancellation is honoured between cycles and during the waits between
    /// them; a print that has started always runs to completion.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!(next = self.candidate().map(OrderId::get), "polling started");

        while !shutdown.is_cancelled() {
            self.transition(CoordinatorState::Idle);
            let attempted = self.candidate().map(OrderId::get);
            let outcome = self.cycle().await;

            let Some(delay) = self.policy.delay_for(outcome) else {
                continue;
            };

            match outcome {
                CycleOutcome::NotFound => {
                    info!(order_id = attempted, retry_in = ?delay, "no new order yet");
                }
                _ => {
                    info!(
                        order_id = attempted,
                        outcome = %outcome,
                        retry_in = ?delay,
                        next = self.candidate().map(OrderId::get),
                        "backing off"
                    );
                }
            }

            self.transition(CoordinatorState::Backoff);
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.transition(CoordinatorState::Idle);
        info!(cursor = self.cursor, "polling stopped");
    }

    /// Run a single cycle for the current candidate without sleeping.
    ///
    /// A panic inside a collaborator is contained here and reported as
    /// `CycleOutcome::Fault`, as is a cursor with no id left after it.
    pub async fn cycle(&mut self) -> CycleOutcome {
        let Some(candidate) = self.candidate() else {
            error!(cursor = self.cursor, "order ids exhausted; nothing left to fetch");
            return CycleOutcome::Fault;
        };
        match AssertUnwindSafe(self.attempt(candidate)).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                error!(
                    order_id = %candidate,
                    panic = panic_message(panic.as_ref()),
                    "unexpected failure in cycle"
                );
                CycleOutcome::Fault
            }
        }
    }

    async fn attempt(&mut self, candidate: OrderId) -> CycleOutcome {
        self.transition(CoordinatorState::Fetching);
        debug!(order_id = %candidate, "checking for order");

        let order = match self.source.fetch(candidate).await {
            PollOutcome::Found(order) => order,
            PollOutcome::NotFound => return CycleOutcome::NotFound,
            PollOutcome::TransientError(e) => {
                warn!(order_id = %candidate, error = %e, "fetch failed");
                return CycleOutcome::FetchFailed;
            }
        };

        self.transition(CoordinatorState::Printing);
        let job = match self.printer.print(&order).await {
            PrintOutcome::Printed { job } => job,
            PrintOutcome::Failed { reason } => {
                warn!(
                    order_id = %candidate,
                    reason = %reason,
                    "printing failed; the same order will be retried"
                );
                return CycleOutcome::PrintFailed;
            }
        };
        let sha256 = digest::short(&order.sha256).to_string();
        drop(order);

        self.transition(CoordinatorState::Advancing);
        self.cursor = candidate.get();
        match self.store.save(self.cursor) {
            Ok(()) => {
                info!(order_id = %candidate, %job, sha256 = %sha256, "order processed");
                CycleOutcome::Printed
            }
            Err(e) => {
                // The order is on paper, so the in-memory cursor stays
                // advanced; the next successful save catches the file up.
                error!(
                    order_id = %candidate,
                    error = %e,
                    "order printed but cursor could not be saved"
                );
                CycleOutcome::Fault
            }
        }
    }

    fn transition(&mut self, next: CoordinatorState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "state change");
            self.state = next;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}
