//! # Auth Commands
//!
//! Login, registration, logout, and working out which facility the desk
//! sells for.

use tracing::{info, warn};

use vital_client::{AuthService, ClientError};
use vital_core::validation::validate_registration;
use vital_core::{Facility, LoginCredentials, RegisterFacility};

use crate::error::UserError;

pub async fn login(auth: &mut AuthService, email: &str, password: &str) -> Result<Facility, UserError> {
    let credentials = LoginCredentials {
        email: email.trim().to_string(),
        password: password.to_string(),
    };
    let session = auth.login(&credentials).await?;

    session
        .facility
        .clone()
        .ok_or_else(|| UserError::internal("Login response had no facility"))
}

/// Validates the registration form, then registers and logs in.
pub async fn register(
    auth: &mut AuthService,
    form: &RegisterFacility,
    confirm_password: &str,
) -> Result<Facility, UserError> {
    validate_registration(form, confirm_password)?;
    let session = auth.register(form).await?;

    session
        .facility
        .clone()
        .ok_or_else(|| UserError::internal("Registration response had no facility"))
}

pub fn logout(auth: &mut AuthService) -> Result<(), UserError> {
    auth.logout()?;
    info!("Logged out");
    Ok(())
}

/// The logged-in facility, confirmed by the backend.
pub async fn whoami(auth: &mut AuthService) -> Result<Facility, UserError> {
    Ok(auth.current_facility().await?)
}

/// Picks the facility the checkout desk sells for.
///
/// ## Resolution Order
/// 1. The logged-in facility, confirmed with `/auth/me/`
/// 2. The stored session facility, when the backend cannot be reached
/// 3. The first facility the backend lists
pub async fn resolve_facility(auth: &mut AuthService) -> Result<Facility, UserError> {
    if auth.is_logged_in() {
        match auth.current_facility().await {
            Ok(facility) => return Ok(facility),
            Err(ClientError::Unauthorized) => {
                warn!("Session rejected; falling back to facility list");
            }
            Err(e) => match auth.facility().cloned() {
                Some(stored) => {
                    warn!(error = %e, facility_id = %stored.id, "Using stored facility");
                    return Ok(stored);
                }
                None => return Err(e.into()),
            },
        }
    }

    let facilities = auth.api().list_facilities().await?;
    let first = facilities
        .into_iter()
        .next()
        .ok_or_else(|| UserError::not_found("Facility", "(none registered)"))?;

    info!(facility_id = %first.id, name = %first.name, "Using first listed facility");
    Ok(first)
}
