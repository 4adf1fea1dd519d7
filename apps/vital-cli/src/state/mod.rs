//! # State Module
//!
//! Application state for the terminal checkout desk.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────────────────┐      ┌──────────────────────────────┐    │
//! │  │       CartStore          │      │         AppConfig            │    │
//! │  │                          │      │                              │    │
//! │  │  watch::Sender<Ledger>   │      │  client  (API URL, session)  │    │
//! │  │  one owner: the shell    │      │  billing (issuer, tax, terms)│    │
//! │  └──────────────────────────┘      └──────────────────────────────┘    │
//! │                                                                         │
//! │  • CartStore: mutated only by the dispatch loop                        │
//! │  • AppConfig: read-only after startup                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;

pub use cart::CartStore;
pub use config::{AppConfig, BillingConfig};
