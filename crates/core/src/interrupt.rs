// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! External cancellation of a run
//!
//! An [`Interrupt`] is a cloneable token. Poll loops check it at every
//! boundary and race it against their sleeps, so a trigger stops the
//! current wait promptly.

use crate::clock::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Notify;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("interrupted")]
pub struct Interrupted;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    triggered: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Fail fast at a check boundary
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_triggered() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Resolve once the token is triggered
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }

    /// Sleep on `clock`, returning early if the token is triggered
    pub async fn sleep<C: Clock>(&self, clock: &C, duration: Duration) -> Result<(), Interrupted> {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.wait() => Err(Interrupted),
            _ = clock.sleep(duration) => self.check(),
        }
    }
}

#[cfg(test)]
#[path = "interrupt_tests.rs"]
mod tests;
