//! # vital-client: Backend Access for VitalConnect
//!
//! Everything that leaves the process: the inventory REST backend and the
//! session file.
//!
//! ## Module Organization
//! ```text
//! vital_client/
//! ├── lib.rs          ◄─── You are here
//! ├── config.rs       ◄─── ClientConfig (env + defaults)
//! ├── api.rs          ◄─── ApiClient (reqwest, bearer auth)
//! ├── auth.rs         ◄─── AuthService (login, me, logout)
//! ├── session.rs      ◄─── Session + SessionStore (JSON file)
//! └── error.rs        ◄─── ClientError
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vital_client::{ApiClient, AuthService, ClientConfig, SessionStore};
//!
//! let config = ClientConfig::load()?;
//! let store = SessionStore::from_config(&config)?;
//! let mut auth = AuthService::restore(ApiClient::new(&config), store)?;
//!
//! if auth.is_logged_in() {
//!     let facility = auth.current_facility().await?;
//!     let stock = auth.api().facility_inventory(&facility.id).await?;
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;

pub use api::{ApiClient, InventoryFilter, TransactionFilter};
pub use auth::AuthService;
pub use config::{ClientConfig, ConfigError, DEFAULT_API_URL};
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};
