//! Authentication gate and the session-lifetime contact store.
//!
//! The identity provider itself lives outside this crate.  What the client
//! needs is the contract around it: which routes render for which auth
//! state, where a signed-out user is sent, and where they come back to.

use tracing::{debug, info};
use url::form_urlencoded;

use friendtracker_shared::constants::{DEFAULT_LANDING_PATH, LOGIN_PATH};

use crate::config::ClientConfig;
use crate::service::{ContactService, HttpContactService};
use crate::store::ContactStore;

const REDIRECT_PARAM: &str = "redirectTo";

/// An authenticated user as reported by the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub access_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// The provider has not answered yet.
    Loading,
    SignedOut,
    SignedIn(Session),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Show a loading indicator and decide again once auth settles.
    Wait,
    Render,
    Redirect(String),
}

/// Decide what a protected route shows for the current auth state.
pub fn guard(auth: &AuthState, requested_path: &str) -> RouteDecision {
    match auth {
        AuthState::Loading => RouteDecision::Wait,
        AuthState::SignedOut => {
            debug!(path = requested_path, "Redirecting signed-out user to login");
            RouteDecision::Redirect(login_redirect(requested_path))
        }
        AuthState::SignedIn(_) => RouteDecision::Render,
    }
}

/// `/login?redirectTo=<path>` with the path percent-encoded.
pub fn login_redirect(requested_path: &str) -> String {
    format!(
        "{LOGIN_PATH}?{REDIRECT_PARAM}={}",
        urlencoding::encode(requested_path)
    )
}

/// Where to go after a successful login, given the login page's query string.
///
/// Only same-origin absolute paths are honoured; anything else lands on the
/// contact list.
pub fn redirect_target(query: &str) -> String {
    form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, path)| path.into_owned())
        .filter(|path| is_local_path(path))
        .unwrap_or_else(|| DEFAULT_LANDING_PATH.to_string())
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

/// The contact store scoped to one signed-in session.
///
/// Signing in opens the store (initial fetch); signing out drops it together
/// with everything it cached.
pub struct ContactSession<S = HttpContactService> {
    session: Session,
    store: ContactStore<S>,
}

impl ContactSession<HttpContactService> {
    pub async fn sign_in(config: &ClientConfig, session: Session) -> Self {
        let service = HttpContactService::from_config(config)
            .with_access_token(session.access_token.clone());
        Self::open(service, session).await
    }
}

impl<S: ContactService> ContactSession<S> {
    pub async fn open(service: S, session: Session) -> Self {
        info!(user_id = %session.user_id, "Opening contact session");
        let store = ContactStore::open(service).await;
        Self { session, store }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn store(&self) -> &ContactStore<S> {
        &self.store
    }

    pub fn sign_out(self) {
        info!(user_id = %self.session.user_id, "Contact session closed");
    }
}
