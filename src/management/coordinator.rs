use std::{future::Future, net::SocketAddr, sync::Arc, sync::OnceLock};

use axum::Router;
use tokio::sync::{Mutex, oneshot};

use crate::{
    config::{AuthSettings, StatePolicy},
    error::{AuthError, Error, Result},
    management::TokenStore,
    server,
    spotify::TokenExchange,
    types::AuthSession,
    utils::{self, AuthorizeParams},
};

/// Shows the login link to the user. How (terminal hyperlink, browser, test
/// channel) is up to the implementation.
pub trait AuthorizationPrompt: Send + Sync {
    fn present(&self, url: &str);
}

/// A login link that has been handed out and not yet answered.
pub struct PendingAuth {
    pub(crate) state: String,
    pub(crate) code_verifier: String,
    sender: oneshot::Sender<std::result::Result<AuthSession, AuthError>>,
}

impl PendingAuth {
    /// Hands the outcome to the waiting coordinator. Never blocks: if the
    /// waiter already gave up the outcome is dropped.
    pub(crate) fn complete(self, outcome: std::result::Result<AuthSession, AuthError>) {
        if self.sender.send(outcome).is_err() {
            tracing::debug!("login waiter is gone, dropping callback outcome");
        }
    }
}

#[derive(Default)]
pub struct AuthSlots {
    pub(crate) session: Option<AuthSession>,
    pub(crate) pending: Option<PendingAuth>,
    process_state: Option<String>,
}

/// State shared between the coordinator and the callback listener.
#[derive(Clone)]
pub struct AuthState {
    pub(crate) slots: Arc<Mutex<AuthSlots>>,
    pub(crate) exchanger: Arc<dyn TokenExchange>,
    store: Option<TokenStore>,
}

impl AuthState {
    /// Writes `session` to the token cache, if one is attached. Failures only
    /// warn; the in-memory session stays usable.
    pub(crate) async fn persist(&self, session: &AuthSession) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(session).await {
                crate::warning!("Failed to save token to cache: {}", e);
            }
        }
    }
}

/// Owns the single authorization session of the process.
///
/// Built once at startup and passed by reference to everything that needs
/// catalog access. The session slot and the pending-login slot sit behind one
/// mutex that the callback listener shares; the lock is never held across a
/// network call.
pub struct AuthorizationCoordinator {
    settings: AuthSettings,
    state: AuthState,
    prompt: Arc<dyn AuthorizationPrompt>,
    listener: OnceLock<SocketAddr>,
}

impl AuthorizationCoordinator {
    pub fn new(
        settings: AuthSettings,
        exchanger: Arc<dyn TokenExchange>,
        prompt: Arc<dyn AuthorizationPrompt>,
    ) -> Self {
        AuthorizationCoordinator {
            settings,
            state: AuthState {
                slots: Arc::new(Mutex::new(AuthSlots::default())),
                exchanger,
                store: None,
            },
            prompt,
            listener: OnceLock::new(),
        }
    }

    /// Persist sessions to `store` and seed from it in [`restore`](Self::restore).
    /// The callback listener shares the store, so a login that completes
    /// after its waiter gave up is still saved.
    pub fn with_store(mut self, store: TokenStore) -> Self {
        self.state.store = Some(store);
        self
    }

    /// The callback routes, bound to this coordinator's slots.
    pub fn router(&self) -> Router {
        server::router(self.state.clone())
    }

    /// Binds the callback listener and serves it on a background task for
    /// the rest of the process. Fails if the port is taken or the listener is
    /// already running.
    pub async fn listen(&self) -> Result<SocketAddr> {
        if let Some(addr) = self.listener.get() {
            return Err(Error::Config(format!(
                "callback listener already running on {}",
                addr
            )));
        }

        let listener = server::bind(self.settings.listen_addr).await?;
        let addr = listener.local_addr()?;
        server::spawn(listener, self.router());

        self.listener
            .set(addr)
            .map_err(|_| Error::Config("callback listener started twice".to_string()))?;
        tracing::info!(%addr, "callback listener running");
        Ok(addr)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.get().copied()
    }

    /// Loads a cached session from the attached store, if any.
    pub async fn restore(&self) -> bool {
        let Some(store) = &self.state.store else {
            return false;
        };

        match store.load().await {
            Ok(Some(session)) => {
                tracing::debug!(expires_at = %session.expires_at, "restored cached session");
                self.state.slots.lock().await.session = Some(session);
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable token cache");
                false
            }
        }
    }

    pub async fn current_session(&self) -> Option<AuthSession> {
        self.state.slots.lock().await.session.clone()
    }

    pub async fn is_pending(&self) -> bool {
        self.state.slots.lock().await.pending.is_some()
    }

    /// Returns the live session, logging the user in first if needed.
    ///
    /// Waits until the callback arrives or the configured timeout passes.
    pub async fn ensure_authenticated(&self) -> Result<AuthSession> {
        self.ensure_authenticated_until(std::future::pending::<()>())
            .await
    }

    /// Like [`ensure_authenticated`](Self::ensure_authenticated), but the wait
    /// for the browser login also ends with [`AuthError::Cancelled`] as soon
    /// as `cancel` completes.
    pub async fn ensure_authenticated_until<F>(&self, cancel: F) -> Result<AuthSession>
    where
        F: Future<Output = ()>,
    {
        let refresh_token = {
            let slots = self.state.slots.lock().await;
            match &slots.session {
                Some(session) if !session.is_expired() => return Ok(session.clone()),
                Some(session) => session.refresh_token.clone(),
                None => None,
            }
        };

        if let Some(refresh_token) = refresh_token {
            match self.refresh(&refresh_token).await {
                Ok(session) => return Ok(session),
                Err(e) => tracing::warn!(error = %e, "token refresh failed, logging in again"),
            }
        }

        if self.listener.get().is_none() {
            return Err(Error::ListenerNotStarted);
        }

        let (url, state, receiver) = self.begin_login().await?;
        self.prompt.present(&url);
        tracing::info!("waiting for login callback");

        let timeout = self.settings.timeout;
        let outcome = tokio::select! {
            delivered = tokio::time::timeout(timeout, receiver) => match delivered {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(AuthError::ListenerClosed),
                Err(_) => Err(AuthError::TimedOut(timeout)),
            },
            _ = cancel => Err(AuthError::Cancelled),
        };

        match outcome {
            Ok(session) => {
                // Already cached by the listener before delivery.
                tracing::info!(expires_at = %session.expires_at, "login completed");
                Ok(session)
            }
            Err(e) => {
                self.abandon(&state).await;
                Err(e.into())
            }
        }
    }

    /// Registers a new pending login and returns its link.
    async fn begin_login(
        &self,
    ) -> Result<(
        String,
        String,
        oneshot::Receiver<std::result::Result<AuthSession, AuthError>>,
    )> {
        let mut slots = self.state.slots.lock().await;
        if slots.pending.is_some() {
            return Err(AuthError::AlreadyPending.into());
        }

        let state = match self.settings.state_policy {
            StatePolicy::PerAttempt => utils::generate_state(),
            StatePolicy::PerProcess => slots
                .process_state
                .get_or_insert_with(utils::generate_state)
                .clone(),
        };
        let code_verifier = utils::generate_code_verifier();
        let code_challenge = utils::generate_code_challenge(&code_verifier);

        let url = utils::build_authorize_url(
            &self.settings.authorize_url,
            &AuthorizeParams {
                client_id: &self.settings.client_id,
                redirect_uri: &self.settings.redirect_uri,
                scope: &self.settings.scope,
                state: &state,
                code_challenge: &code_challenge,
            },
        )?;

        let (sender, receiver) = oneshot::channel();
        slots.pending = Some(PendingAuth {
            state: state.clone(),
            code_verifier,
            sender,
        });

        Ok((url.to_string(), state, receiver))
    }

    /// Drops our pending login if the listener has not consumed it, so the
    /// next attempt can hand out a fresh link.
    async fn abandon(&self, state: &str) {
        let mut slots = self.state.slots.lock().await;
        if slots.pending.as_ref().is_some_and(|p| p.state == state) {
            slots.pending = None;
        }
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthSession> {
        let token = self.state.exchanger.refresh(refresh_token).await?;
        let session = AuthSession::from(token);
        self.state.slots.lock().await.session = Some(session.clone());
        tracing::debug!(expires_at = %session.expires_at, "session refreshed");
        self.state.persist(&session).await;
        Ok(session)
    }
}
