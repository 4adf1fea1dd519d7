//! Command-line interface.
//!
//! Without a subcommand the interactive shell starts.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vital_core::RegisterFacility;

#[derive(Debug, Parser)]
#[command(name = "vital", version, about = "VitalConnect checkout desk")]
pub struct Cli {
    /// Backend base URL (overrides VITAL_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file (overrides VITAL_SESSION_PATH)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Print results of one-shot commands as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in as a facility and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "VITAL_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Register a new clinic and log in as it
    Register(RegisterArgs),

    /// Forget the stored session
    Logout,

    /// Show the logged-in facility
    Whoami,

    /// List facilities closest to a point (San Francisco by default)
    Nearby {
        #[arg(long, allow_negative_numbers = true)]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true)]
        lon: Option<f64>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// List the current facility's inventory
    Inventory {
        /// Filter on name, category or description
        query: Option<String>,
    },

    /// Show the current facility's dashboard figures
    Stats,

    /// Interactive checkout shell (default)
    Shell,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: String,
    #[arg(long)]
    pub state: String,
    #[arg(long)]
    pub zip_code: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "VITAL_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(long)]
    pub confirm_password: String,
    #[arg(long)]
    pub contact_person: String,
    #[arg(long)]
    pub license_number: String,
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,
}

impl RegisterArgs {
    /// The registration form and the password confirmation.
    pub fn into_form(self) -> (RegisterFacility, String) {
        let form = RegisterFacility {
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            phone_number: self.phone,
            email: self.email,
            password: self.password,
            contact_person: self.contact_person,
            license_number: self.license_number,
            latitude: self.lat,
            longitude: self.lon,
        };
        (form, self.confirm_password)
    }
}
