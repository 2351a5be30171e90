// SPDX-FileCopyrightText: 2026 Socio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender serialization of message processing.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per sender. Messages from the same sender are processed
/// one at a time; different senders run concurrently.
///
/// An entry lives only while some task holds or waits on it.
#[derive(Debug, Clone, Default)]
pub struct SenderLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

/// Held while a sender's message is processed.
pub struct SenderGuard {
    key: String,
    locks: SenderLocks,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SenderLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other message from `sender` is in flight.
    pub async fn acquire(&self, sender: &str) -> SenderGuard {
        let mutex = self.inner.entry(sender.to_string()).or_default().clone();
        let guard = mutex.lock_owned().await;
        SenderGuard {
            key: sender.to_string(),
            locks: self.clone(),
            guard: Some(guard),
        }
    }

    /// Number of senders currently holding or waiting on a lock.
    pub fn active(&self) -> usize {
        self.inner.len()
    }
}

impl Drop for SenderGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: nobody is waiting.
        self.locks
            .inner
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn entries_are_dropped_after_release() {
        let locks = SenderLocks::new();
        {
            let _guard = locks.acquire("549111").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn same_sender_is_serialized() {
        let locks = SenderLocks::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let first = locks.acquire("549111").await;
        let waiter = {
            let locks = locks.clone();
            let order = order.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("549111").await;
                order.lock().unwrap().push("second");
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        order.lock().unwrap().push("first");
        drop(first);
        waiter.await.unwrap();

        assert_eq!(*order.lock().unwrap(), ["first", "second"]);
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn different_senders_do_not_block() {
        let locks = SenderLocks::new();
        let _a = locks.acquire("549111").await;
        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("549222")).await;
        assert!(b.is_ok());
        assert_eq!(locks.active(), 2);
    }
}
