use crate::{
    error::ErrorInfo,
    gateway::{ReceiptSummary, TxHandle},
};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Wallet connection status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    ConnectionFailed,
}

/// Progress of the current wrap submission.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    /// Waiting on the wallet. `tx` is set once the transaction has been broadcast.
    Pending { tx: Option<TxHandle> },
    Confirmed { receipt: ReceiptSummary, summary: String },
    Failed { error: ErrorInfo },
}

impl SubmissionState {
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

/// Everything the presentation layer needs to render the session.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub connection_status: ConnectionStatus,
    /// Account of the active signing handle, set together with `Connected`.
    pub account: Option<Address>,
    /// Raw amount text, uninterpreted until validated.
    pub amount_input: String,
    pub submission: SubmissionState,
    pub last_error: Option<ErrorInfo>,
}

/// Owner of the single [`SessionState`] instance of a session.
///
/// Every mutation is applied in one step, so observers never see a partially updated
/// state.
#[derive(Debug)]
pub struct SessionContext {
    state: watch::Sender<SessionState>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { state }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Returns a receiver that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Replaces the amount text. Nothing is validated here.
    pub fn set_amount_input(&self, input: impl Into<String>) {
        let input = input.into();
        self.state.send_if_modified(|state| {
            if state.amount_input == input {
                return false;
            }
            state.amount_input = input;
            true
        });
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut SessionState)) {
        self.state.send_modify(f);
    }

    /// Applies `f` and notifies observers only if it returns `true`.
    pub(crate) fn update_if(&self, f: impl FnOnce(&mut SessionState) -> bool) -> bool {
        self.state.send_if_modified(f)
    }

    pub(crate) fn record_error(&self, error: &ErrorInfo) {
        self.update(|state| state.last_error = Some(error.clone()));
    }
}
