//! Wallet session and wrap-transaction state machine.
//!
//! A [`WrapSession`] owns one [`SessionContext`], a [`SessionManager`] that connects the
//! wallet, and a [`TransactionOrchestrator`] that deposits native ether into the WETH9
//! contract. The presentation layer reads [`SessionState`] snapshots (or subscribes to
//! them) and forwards two intents: [`WrapSession::connect`] and [`WrapSession::submit`].

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

#[macro_use]
extern crate tracing;

pub mod amount;
pub mod error;
pub mod gateway;
pub mod orchestrator;
pub mod rpc;
pub mod session;
pub mod state;

pub use amount::{AmountError, BaseUnitAmount};
pub use error::{ErrorInfo, ErrorKind, ProviderError};
pub use gateway::{ProviderGateway, ReceiptSummary, SigningHandle, TxHandle};
pub use orchestrator::TransactionOrchestrator;
pub use rpc::{RpcGateway, WalletMode};
pub use session::SessionManager;
pub use state::{ConnectionStatus, SessionContext, SessionState, SubmissionState};

use alloy_primitives::{Address, Selector, address};
use alloy_sol_types::{SolCall, sol};
use std::sync::Arc;
use tokio::sync::watch;

sol! {
    /// The wrapped ether contract.
    interface IWETH9 {
        function deposit() external payable;
    }
}

/// WETH9 on Ethereum mainnet.
pub const WETH9: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// Selector of `IWETH9.deposit()`.
pub const DEPOSIT_SELECTOR: Selector = Selector::new(IWETH9::depositCall::SELECTOR);

pub const NATIVE_SYMBOL: &str = "ETH";
pub const WRAPPED_SYMBOL: &str = "WETH";

/// Fractional digits of the native currency.
pub const NATIVE_DECIMALS: u8 = 18;

/// A single wallet session: the state plus the two components allowed to mutate it.
#[derive(Debug)]
pub struct WrapSession {
    ctx: SessionContext,
    manager: SessionManager,
    orchestrator: TransactionOrchestrator,
}

impl WrapSession {
    /// Creates a disconnected session. `provider` is `None` when no wallet was detected.
    pub fn new(provider: Option<Arc<dyn ProviderGateway>>) -> Self {
        Self::with_orchestrator(provider, TransactionOrchestrator::new())
    }

    pub fn with_orchestrator(
        provider: Option<Arc<dyn ProviderGateway>>,
        orchestrator: TransactionOrchestrator,
    ) -> Self {
        Self { ctx: SessionContext::new(), manager: SessionManager::new(provider), orchestrator }
    }

    /// Connects the wallet, or returns the existing signing handle.
    pub async fn connect(&self) -> Result<Arc<dyn SigningHandle>, ErrorInfo> {
        self.manager.connect(&self.ctx).await
    }

    /// Drops the current wallet connection.
    pub fn disconnect(&self) {
        self.manager.disconnect(&self.ctx);
    }

    /// Wraps the currently entered amount.
    pub async fn submit(&self) -> Result<ReceiptSummary, ErrorInfo> {
        self.orchestrator.submit(&self.ctx, self.manager.signer()).await
    }

    /// Records the amount text as typed; it is only interpreted on submit.
    pub fn set_amount_input(&self, input: impl Into<String>) {
        self.ctx.set_amount_input(input);
    }

    pub fn snapshot(&self) -> SessionState {
        self.ctx.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.ctx.subscribe()
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }
}
