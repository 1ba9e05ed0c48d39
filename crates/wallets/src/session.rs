use crate::{
    error::{ErrorInfo, ErrorKind, ProviderError},
    gateway::{ProviderGateway, SigningHandle},
    state::{ConnectionStatus, SessionContext},
};
use parking_lot::Mutex;
use std::sync::Arc;

type ConnectOutcome = Result<Arc<dyn SigningHandle>, ErrorInfo>;

#[derive(Default)]
struct Slot {
    signer: Option<Arc<dyn SigningHandle>>,
    /// Number of finished authorization attempts.
    attempts: u64,
    last_outcome: Option<ConnectOutcome>,
}

/// Owns the wallet connection: requests account access and holds the signing handle.
pub struct SessionManager {
    provider: Option<Arc<dyn ProviderGateway>>,
    slot: Mutex<Slot>,
    /// Serializes authorization attempts.
    in_flight: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("has_provider", &self.has_provider())
            .field("signer", &self.slot.lock().signer)
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Creates a manager for `provider`, which is `None` when no wallet was detected.
    pub fn new(provider: Option<Arc<dyn ProviderGateway>>) -> Self {
        Self { provider, slot: Mutex::default(), in_flight: tokio::sync::Mutex::new(()) }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// The current signing handle, if connected.
    pub fn signer(&self) -> Option<Arc<dyn SigningHandle>> {
        self.slot.lock().signer.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.slot.lock().signer.is_some()
    }

    /// Connects the wallet and returns its signing handle.
    ///
    /// Returns the existing handle when already connected. Callers arriving while an
    /// authorization request is in flight wait for it and share its outcome.
    pub async fn connect(&self, ctx: &SessionContext) -> Result<Arc<dyn SigningHandle>, ErrorInfo> {
        let Some(provider) = self.provider.clone() else {
            let error = ErrorInfo::provider_missing();
            debug!("no wallet provider present");
            ctx.update(|state| {
                state.connection_status = ConnectionStatus::ConnectionFailed;
                state.account = None;
                state.last_error = Some(error.clone());
            });
            return Err(error);
        };

        let seen = {
            let slot = self.slot.lock();
            if let Some(signer) = &slot.signer {
                trace!(account = %signer.address(), "already connected");
                return Ok(signer.clone());
            }
            slot.attempts
        };

        let _in_flight = self.in_flight.lock().await;
        {
            let slot = self.slot.lock();
            if slot.attempts != seen
                && let Some(outcome) = &slot.last_outcome
            {
                trace!("joined in-flight connection attempt");
                return outcome.clone();
            }
        }

        ctx.update(|state| state.connection_status = ConnectionStatus::Connecting);
        let mut guard = ConnectingGuard { ctx, armed: true };
        let outcome = authorize(provider.as_ref()).await;
        guard.armed = false;

        let mut slot = self.slot.lock();
        slot.attempts += 1;
        slot.last_outcome = Some(outcome.clone());
        match &outcome {
            Ok(signer) => {
                let account = signer.address();
                slot.signer = Some(signer.clone());
                debug!(%account, "wallet connected");
                ctx.update(|state| {
                    state.connection_status = ConnectionStatus::Connected;
                    state.account = Some(account);
                    state.last_error = None;
                });
            }
            Err(error) => {
                warn!(kind = %error.kind, "wallet connection failed: {}", error.message);
                ctx.update(|state| {
                    state.connection_status = ConnectionStatus::ConnectionFailed;
                    state.account = None;
                    state.last_error = Some(error.clone());
                });
            }
        }
        outcome
    }

    /// Drops the signing handle, e.g. after the wallet revoked account access.
    pub fn disconnect(&self, ctx: &SessionContext) {
        let mut slot = self.slot.lock();
        if slot.signer.take().is_some() {
            debug!("wallet disconnected");
        }
        slot.last_outcome = None;
        ctx.update(|state| {
            state.connection_status = ConnectionStatus::Disconnected;
            state.account = None;
        });
    }
}

/// Moves the session out of `Connecting` if `connect` is dropped mid-authorization.
struct ConnectingGuard<'a> {
    ctx: &'a SessionContext,
    armed: bool,
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let error = ErrorInfo::new(
            ErrorKind::UserRejected,
            "Failed to connect wallet: the connection request was cancelled",
        );
        debug!("connection attempt abandoned");
        self.ctx.update(|state| {
            if state.connection_status == ConnectionStatus::Connecting {
                state.connection_status = ConnectionStatus::ConnectionFailed;
                state.account = None;
                state.last_error = Some(error);
            }
        });
    }
}

async fn authorize(provider: &dyn ProviderGateway) -> ConnectOutcome {
    let accounts = provider.request_accounts().await.map_err(connect_error)?;
    if accounts.is_empty() {
        return Err(connect_error(ProviderError::unavailable("wallet returned no accounts")));
    }
    trace!(?accounts, "accounts authorized");
    provider.get_signer().await.map_err(connect_error)
}

fn connect_error(err: ProviderError) -> ErrorInfo {
    let kind = match err {
        ProviderError::Unavailable(_) => ErrorKind::ProviderMissing,
        ProviderError::Rejected(_) | ProviderError::Rpc(_) => ErrorKind::UserRejected,
    };
    ErrorInfo::new(kind, format!("Failed to connect wallet: {err}"))
}
