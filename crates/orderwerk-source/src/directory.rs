// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local directory source.  Reads `<dir>/<prefix><id>.<ext>`; handy for bench
// testing a printer without touching the cloud bucket.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, info};

use orderwerk_core::error::OrderwerkError;
use orderwerk_core::types::{Order, OrderId, PollOutcome};

use crate::source::OrderSource;

pub struct DirectorySource {
    dir: PathBuf,
    object_prefix: String,
    object_extension: String,
}

impl DirectorySource {
    pub fn new(
        dir: impl Into<PathBuf>,
        object_prefix: impl Into<String>,
        object_extension: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            object_prefix: object_prefix.into(),
            object_extension: object_extension.into(),
        }
    }
}

#[async_trait]
impl OrderSource for DirectorySource {
    async fn fetch(&self, id: OrderId) -> PollOutcome {
        let name = id.object_name(&self.object_prefix, &self.object_extension);
        let path = self.dir.join(&name);

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                info!(order_id = %id, path = %path.display(), bytes = bytes.len(), "order found");
                PollOutcome::Found(Order::new(id, name, bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(order_id = %id, path = %path.display(), "order not present");
                PollOutcome::NotFound
            }
            Err(e) => PollOutcome::TransientError(OrderwerkError::Io(e)),
        }
    }
}
