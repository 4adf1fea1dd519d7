//! # Cart State
//!
//! Holds the cart ledger and publishes every change.
//!
//! ## Snapshot Publishing
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Shell Command            CartStore               Observers             │
//! │  ─────────────            ─────────               ─────────             │
//! │                                                                         │
//! │  add <id> ──────────────► update(add) ──────────► totals re-rendered   │
//! │  qty <id> <n> ──────────► update(set_quantity) ─►                       │
//! │  rm <id> ───────────────► update(remove) ───────►                       │
//! │  clear ─────────────────► update(clear) ────────►                       │
//! │                                                                         │
//! │  NOTE: A mutation that leaves the ledger unchanged (removing an absent │
//! │        id) publishes nothing.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The dispatch loop is single threaded; the watch channel is the
//! observer hook, not a lock.

use tokio::sync::watch;
use vital_core::CartLedger;

/// Owner of the cart ledger.
#[derive(Debug)]
pub struct CartStore {
    tx: watch::Sender<CartLedger>,
}

impl CartStore {
    /// Creates an empty cart.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(CartLedger::new());
        CartStore { tx }
    }

    /// Registers an observer. It sees the current ledger as already seen.
    pub fn subscribe(&self) -> watch::Receiver<CartLedger> {
        self.tx.subscribe()
    }

    /// Applies a mutation; observers are notified only if the ledger changed.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// cart.update(|ledger| ledger.add(&item));
    /// ```
    pub fn update<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut CartLedger),
    {
        self.tx.send_if_modified(|ledger| {
            let before = ledger.clone();
            mutate(ledger);
            *ledger != before
        })
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, read: F) -> R
    where
        F: FnOnce(&CartLedger) -> R,
    {
        read(&self.tx.borrow())
    }

    /// Owned copy of the current ledger.
    pub fn snapshot(&self) -> CartLedger {
        self.tx.borrow().clone()
    }
}

impl Default for CartStore {
    fn default() -> Self {
        Self::new()
    }
}
