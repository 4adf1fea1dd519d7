//! # Authentication Service
//!
//! Login, registration and logout on top of [`ApiClient`] and
//! [`SessionStore`].
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  login / register ──► {token, hospital} ──► save session ──► set token │
//! │                                                                         │
//! │  current_facility ──► GET /auth/me/                                     │
//! │                         ├── 200: refresh stored facility               │
//! │                         └── 401: clear session, drop token             │
//! │                                                                         │
//! │  logout ─────────────► clear session, drop token                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only a 401 ends the session. A backend that cannot be reached leaves the
//! stored session alone.

use tracing::{info, warn};

use vital_core::{Facility, LoginCredentials, RegisterFacility};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::session::{Session, SessionStore};

/// Owns the API client and keeps its token in step with the session file.
#[derive(Debug)]
pub struct AuthService {
    api: ApiClient,
    store: SessionStore,
    session: Session,
}

impl AuthService {
    /// Loads the stored session and hands its token to the client.
    pub fn restore(mut api: ApiClient, store: SessionStore) -> ClientResult<Self> {
        let session = store.load()?;
        api.set_token(session.token.clone());

        Ok(AuthService {
            api,
            store,
            session,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// The facility stored with the session, without asking the backend.
    pub fn facility(&self) -> Option<&Facility> {
        self.session.facility.as_ref()
    }

    pub async fn login(&mut self, credentials: &LoginCredentials) -> ClientResult<&Session> {
        let response = self.api.login(credentials).await?;
        info!(facility_id = %response.hospital.id, "Logged in");
        self.start(Session::new(response.token, response.hospital))
    }

    pub async fn register(&mut self, form: &RegisterFacility) -> ClientResult<&Session> {
        let response = self.api.register(form).await?;
        info!(facility_id = %response.hospital.id, "Facility registered");
        self.start(Session::new(response.token, response.hospital))
    }

    /// Asks the backend who the token belongs to.
    pub async fn current_facility(&mut self) -> ClientResult<Facility> {
        if !self.is_logged_in() {
            return Err(ClientError::NotLoggedIn);
        }

        match self.api.me().await {
            Ok(facility) => {
                self.session.facility = Some(facility.clone());
                self.store.save(&self.session)?;
                Ok(facility)
            }
            Err(ClientError::Unauthorized) => {
                warn!("Stored token rejected; clearing session");
                self.logout()?;
                Err(ClientError::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }

    pub fn logout(&mut self) -> ClientResult<()> {
        self.store.clear()?;
        self.session = Session::default();
        self.api.set_token(None);
        Ok(())
    }

    fn start(&mut self, session: Session) -> ClientResult<&Session> {
        self.store.save(&session)?;
        self.api.set_token(session.token.clone());
        self.session = session;
        Ok(&self.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::serve_once;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_login_persists_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let (config, server) = serve_once(
            "200 OK",
            r#"{"token": "jwt-abc", "hospital": {"id": 5, "name": "Mercy Clinic", "email": "desk@mercy.example"}}"#,
        )
        .await;

        let mut auth = AuthService::restore(ApiClient::new(&config), store.clone()).unwrap();
        assert!(!auth.is_logged_in());

        let credentials = LoginCredentials {
            email: "desk@mercy.example".to_string(),
            password: "s3cret".to_string(),
        };
        let session = auth.login(&credentials).await.unwrap();
        assert_eq!(session.facility_id(), Some("5"));
        assert!(auth.api().has_token());

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/auth/login/ "));

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.token.as_deref(), Some("jwt-abc"));
    }

    #[tokio::test]
    async fn test_rejected_token_clears_session() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let facility: Facility =
            serde_json::from_value(serde_json::json!({"id": 5, "name": "Mercy Clinic"})).unwrap();
        store.save(&Session::new("expired", facility)).unwrap();

        let (config, server) = serve_once("401 Unauthorized", r#"{"error": "Invalid or expired token"}"#).await;
        let mut auth = AuthService::restore(ApiClient::new(&config), store.clone()).unwrap();
        assert!(auth.is_logged_in());

        let err = auth.current_facility().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(!auth.is_logged_in());
        assert!(!auth.api().has_token());
        assert!(!store.load().unwrap().is_logged_in());

        let raw = server.await.unwrap();
        assert!(raw.to_lowercase().contains("authorization: bearer expired"));
    }

    #[tokio::test]
    async fn test_current_facility_requires_login() {
        let dir = tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let config = crate::config::ClientConfig::default();

        let mut auth = AuthService::restore(ApiClient::new(&config), store).unwrap();
        assert!(matches!(
            auth.current_facility().await,
            Err(ClientError::NotLoggedIn)
        ));
    }
}
