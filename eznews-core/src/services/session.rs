//! Session store - the single source of truth for "who is logged in"
//!
//! Holds the token and identity in memory, mirrors them into the persisted
//! key/value store under `token` and `user`, and broadcasts a
//! `SessionEvent` whenever the session changes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;
use tokio::sync::broadcast;

use crate::domain::result::{Error, Result};
use crate::domain::validation::validate_recovery_email;
use crate::domain::{
    AuthResponse, Identity, IdentityPatch, LoginForm, PasswordResetForm, PasswordResetTicket,
    RegistrationForm, Session, SessionSnapshot,
};
use crate::ports::{HttpTransport, KeyValueStore, Method};
use crate::services::api::{server_message, ApiClient, TokenSource};

pub const TOKEN_KEY: &str = "token";
pub const IDENTITY_KEY: &str = "user";

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Restored,
    LoggedIn,
    LoggedOut,
    IdentityUpdated,
}

struct SessionState {
    session: Option<Session>,
    loading: bool,
}

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    api: ApiClient,
    state: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// Create an empty store in the loading state; call `restore()` next
    pub fn new(storage: Arc<dyn KeyValueStore>, transport: Arc<dyn HttpTransport>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            api: ApiClient::anonymous(transport),
            state: Mutex::new(SessionState {
                session: None,
                loading: true,
            }),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Rebuild the session from persisted storage.
    ///
    /// Half-written or corrupt entries are cleared and leave the client
    /// logged out. Ends the loading phase.
    pub fn restore(&self) -> SessionSnapshot {
        let session = self.read_persisted();
        {
            let mut state = self.state();
            state.session = session;
            state.loading = false;
        }
        self.notify(SessionEvent::Restored);
        self.snapshot()
    }

    fn read_persisted(&self) -> Option<Session> {
        let token = self.storage.get_item(TOKEN_KEY);
        let user = self.storage.get_item(IDENTITY_KEY);

        match (token, user) {
            (Ok(None), Ok(None)) => None,
            (Ok(Some(token)), Ok(Some(user))) if !token.is_empty() => {
                match serde_json::from_str::<Identity>(&user) {
                    Ok(identity) => Some(Session { token, identity }),
                    Err(_) => {
                        self.clear_persisted();
                        None
                    }
                }
            }
            _ => {
                self.clear_persisted();
                None
            }
        }
    }

    /// Remove both persisted entries, falling back to per-key removal and
    /// then to discarding the store. False if the entries may still be there.
    fn clear_persisted(&self) -> bool {
        let keys = [TOKEN_KEY, IDENTITY_KEY];
        if self.storage.remove_items(&keys).is_ok() {
            return true;
        }
        let each_removed = keys
            .iter()
            .fold(true, |ok, key| self.storage.remove_item(key).is_ok() && ok);
        each_removed || self.storage.discard().is_ok()
    }

    /// Persist then publish a new session
    fn establish(&self, session: Session, event: SessionEvent) -> Result<Identity> {
        let user = serde_json::to_string(&session.identity)?;
        let identity = session.identity.clone();
        {
            let mut state = self.state();
            self.storage
                .set_items(&[(TOKEN_KEY, session.token.as_str()), (IDENTITY_KEY, user.as_str())])?;
            state.session = Some(session);
            state.loading = false;
        }
        self.notify(event);
        Ok(identity)
    }

    /// Log in with email and password.
    ///
    /// On failure the session is left exactly as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let form = LoginForm::new(email, password);
        form.validate()?;

        let response: AuthResponse = self
            .api
            .post("/auth/login", json!({"email": form.email.trim(), "password": form.password}))
            .await?;
        self.establish(response.into(), SessionEvent::LoggedIn)
    }

    /// Create an account and log straight into it
    pub async fn register(&self, form: &RegistrationForm) -> Result<Identity> {
        form.validate()?;

        let response: AuthResponse = self
            .api
            .post(
                "/auth/register",
                json!({
                    "full_name": form.full_name.trim(),
                    "email": form.email.trim(),
                    "password": form.password,
                    "confirm_password": form.confirm_password,
                }),
            )
            .await?;
        self.establish(response.into(), SessionEvent::LoggedIn)
    }

    /// Ask the server for a password reset token. Leaves the session alone.
    pub async fn forgot_password(&self, email: &str) -> Result<PasswordResetTicket> {
        validate_recovery_email(email)?;
        self.api
            .post("/auth/forgot-password", json!({"email": email.trim()}))
            .await
    }

    /// Set a new password with a reset token; returns the server's message.
    /// The user still has to log in afterwards.
    pub async fn reset_password(&self, form: &PasswordResetForm) -> Result<String> {
        form.validate()?;
        let response = self
            .api
            .request(
                Method::Post,
                "/auth/reset-password",
                Vec::new(),
                Some(json!({
                    "token": form.token.trim(),
                    "new_password": form.new_password,
                    "confirm_password": form.confirm_password,
                })),
            )
            .await?;
        Ok(server_message(&response.data).unwrap_or_else(|| "Password reset successful".to_string()))
    }

    /// Drop the session everywhere. Never fails; calling it twice is a no-op.
    ///
    /// The in-memory session is always cleared. Returns false when the
    /// persisted entries could not be removed, so a later `restore()` may
    /// bring the session back.
    pub fn logout(&self) -> bool {
        let (was_logged_in, cleared) = {
            let mut state = self.state();
            let cleared = self.clear_persisted();
            state.loading = false;
            (state.session.take().is_some(), cleared)
        };
        if was_logged_in {
            self.notify(SessionEvent::LoggedOut);
        }
        cleared
    }

    /// Merge a partial update into the identity and persist it
    pub fn update_identity(&self, patch: IdentityPatch) -> Result<Identity> {
        let identity = {
            let mut state = self.state();
            let Some(session) = state.session.as_mut() else {
                return Err(Error::Unauthorized("Not logged in".to_string()));
            };

            let mut identity = session.identity.clone();
            identity.merge(patch);
            self.storage
                .set_item(IDENTITY_KEY, &serde_json::to_string(&identity)?)?;
            session.identity = identity.clone();
            identity
        };
        self.notify(SessionEvent::IdentityUpdated);
        Ok(identity)
    }

    /// Log out when a collaborator's request was rejected with HTTP 401.
    ///
    /// Returns true when the session was dropped.
    pub fn invalidate_if_unauthorized(&self, error: &Error) -> bool {
        if error.is_unauthorized() {
            self.logout();
            true
        } else {
            false
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            identity: state.session.as_ref().map(|s| s.identity.clone()),
            loading: state.loading,
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state().session.as_ref().map(|s| s.identity.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.state().session.as_ref().map(|s| s.token.clone())
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.state()
            .session
            .as_ref()
            .is_some_and(|s| s.identity.is_admin())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

impl TokenSource for SessionStore {
    fn bearer_token(&self) -> Option<String> {
        self.token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryStore;
    use crate::domain::Role;
    use crate::ports::{HttpRequest, HttpResponse};
    use async_trait::async_trait;

    /// Answers every request with the same response
    struct FixedTransport(HttpResponse);

    #[async_trait]
    impl HttpTransport for FixedTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Ok(self.0.clone())
        }
    }

    fn store_with(response: HttpResponse) -> (Arc<MemoryStore>, SessionStore) {
        let storage = Arc::new(MemoryStore::new());
        let store = SessionStore::new(storage.clone(), Arc::new(FixedTransport(response)));
        (storage, store)
    }

    fn login_ok() -> HttpResponse {
        HttpResponse::new(
            200,
            json!({
                "access_token": "tok-1",
                "user": {"id": 5, "full_name": "Rina", "email": "rina@example.com", "role": "user"}
            }),
        )
    }

    #[test]
    fn test_loading_until_restored() {
        let (_, store) = store_with(login_ok());
        assert!(store.snapshot().loading);

        let snapshot = store.restore();
        assert!(!snapshot.loading);
        assert!(!snapshot.is_authenticated());
    }

    #[test]
    fn test_restore_clears_half_written_entries() {
        let (storage, store) = store_with(login_ok());
        storage.set_item(TOKEN_KEY, "orphan").unwrap();

        store.restore();
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_login_persists_both_entries() {
        let (storage, store) = store_with(login_ok());
        store.restore();
        let mut events = store.subscribe();

        let identity = store.login("rina@example.com", "secret").await.unwrap();
        assert_eq!(identity.role, Role::User);
        assert_eq!(store.bearer_token().as_deref(), Some("tok-1"));
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert!(storage.get_item(IDENTITY_KEY).unwrap().unwrap().contains("Rina"));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::LoggedIn);
    }

    #[tokio::test]
    async fn test_login_empty_fields_never_hit_network() {
        // A 500 here would surface as Api, not Validation
        let (_, store) = store_with(HttpResponse::new(500, serde_json::Value::Null));
        store.restore();

        let err = store.login("", "").await.unwrap_err();
        match err {
            Error::Validation(fields) => {
                assert_eq!(fields.get("email"), Some("Email is required"));
                assert_eq!(fields.get("password"), Some("Password is required"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_untouched() {
        let (storage, store) = store_with(HttpResponse::new(
            401,
            json!({"error": "Invalid email or password"}),
        ));
        store.restore();

        let err = store.login("rina@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_update_identity_requires_session() {
        let (storage, store) = store_with(login_ok());
        store.restore();

        let err = store
            .update_identity(IdentityPatch {
                full_name: Some("Nobody".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.is_unauthorized());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_error_forces_logout() {
        let (storage, store) = store_with(login_ok());
        store.restore();
        store.login("rina@example.com", "secret").await.unwrap();

        assert!(!store.invalidate_if_unauthorized(&Error::Network("down".into())));
        assert!(store.is_authenticated());

        assert!(store.invalidate_if_unauthorized(&Error::Unauthorized("Token has expired".into())));
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
    }
}
