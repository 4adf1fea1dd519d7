//! # Commands Module
//!
//! Operations invoked by the shell and by one-shot subcommands.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── auth.rs       ◄─── login, register, logout, whoami, facility resolution
//! ├── cart.rs       ◄─── Cart manipulation
//! ├── checkout.rs   ◄─── Bill generation, sale recording
//! ├── inventory.rs  ◄─── Catalog, item create/delete, stats
//! └── nearby.rs     ◄─── Facility finder
//! ```
//!
//! Each command takes only the state it needs and returns
//! `Result<T, UserError>`; rendering is left to the caller.

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod nearby;
