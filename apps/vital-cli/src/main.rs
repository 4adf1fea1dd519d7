//! # VitalConnect Checkout Desk Binary
//!
//! ```text
//! vital                      interactive shell (default)
//! vital login --email ...    store a session
//! vital nearby --lat --lon   closest facilities
//! vital inventory [query]    list stock
//! ```
//!
//! The actual setup is in lib.rs for better testability.

use clap::Parser;

use vital_cli::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    vital_cli::init_tracing();

    // One command at a time; a single thread is all the desk needs.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(vital_cli::run(cli))
}
