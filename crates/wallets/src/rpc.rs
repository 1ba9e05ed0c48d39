//! A [`ProviderGateway`] backed by an Ethereum JSON-RPC endpoint.
//!
//! Two kinds of account are supported:
//! - accounts unlocked on the node, authorized with `eth_requestAccounts` and used through
//!   `eth_sendTransaction`, which is how an injected browser wallet behaves;
//! - a local private key, which signs transactions before they are broadcast.

use crate::{
    error::ProviderError,
    gateway::{ProviderGateway, ReceiptSummary, SigningHandle, TxHandle},
};
use alloy_network::{EthereumWallet, ReceiptResponse, TransactionBuilder};
use alloy_primitives::{Address, Selector, U256};
use alloy_provider::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy_rpc_types::TransactionRequest;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::{fmt, sync::Arc, time::Duration};

/// How the gateway obtains its account.
#[derive(Clone, Debug)]
pub enum WalletMode {
    /// Use an account unlocked on the node, optionally a specific one.
    Unlocked { from: Option<Address> },
    /// Sign locally with a private key.
    Local(PrivateKeySigner),
}

/// JSON-RPC wallet provider.
pub struct RpcGateway {
    provider: DynProvider,
    mode: WalletMode,
    confirmations: u64,
    authorized: Mutex<Option<Address>>,
}

impl RpcGateway {
    /// Connects to `url`, attaching the local signer if `mode` carries one.
    pub async fn connect(url: &str, mode: WalletMode) -> Result<Self, ProviderError> {
        let provider = match &mode {
            WalletMode::Local(signer) => ProviderBuilder::new()
                .wallet(EthereumWallet::from(signer.clone()))
                .connect(url)
                .await?
                .erased(),
            WalletMode::Unlocked { .. } => ProviderBuilder::new().connect(url).await?.erased(),
        };
        Ok(Self::from_provider(provider, mode))
    }

    /// Checks `url` and returns a gateway only if a node answers there.
    pub async fn detect(url: &str, mode: WalletMode) -> Option<Self> {
        let gateway = match Self::connect(url, mode).await {
            Ok(gateway) => gateway,
            Err(err) => {
                debug!(%url, %err, "failed to set up provider");
                return None;
            }
        };
        match gateway.provider.get_chain_id().await {
            Ok(chain_id) => {
                debug!(%url, chain_id, "wallet provider detected");
                Some(gateway)
            }
            Err(err) => {
                debug!(%url, %err, "no wallet provider answered");
                None
            }
        }
    }

    /// Wraps an already built provider. A [`WalletMode::Local`] signer must already be
    /// attached to `provider` as its wallet.
    pub fn from_provider(provider: DynProvider, mode: WalletMode) -> Self {
        Self { provider, mode, confirmations: 1, authorized: Mutex::new(None) }
    }

    /// Number of blocks a transaction needs before it counts as confirmed.
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations.max(1);
        self
    }

    /// Interval between receipt polls.
    pub fn with_poll_interval(self, interval: Duration) -> Self {
        self.provider.client().set_poll_interval(interval);
        self
    }

    pub fn mode(&self) -> &WalletMode {
        &self.mode
    }
}

impl fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcGateway")
            .field("mode", &self.mode)
            .field("confirmations", &self.confirmations)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ProviderGateway for RpcGateway {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let (accounts, selected) = match &self.mode {
            WalletMode::Local(signer) => (vec![signer.address()], Some(signer.address())),
            WalletMode::Unlocked { from } => {
                let accounts: Vec<Address> =
                    self.provider.raw_request("eth_requestAccounts".into(), ()).await?;
                let selected = match from {
                    Some(from) if accounts.contains(from) => Some(*from),
                    Some(from) => {
                        return Err(ProviderError::unavailable(format!(
                            "account {from} is not unlocked on this node"
                        )));
                    }
                    None => accounts.first().copied(),
                };
                (accounts, selected)
            }
        };
        trace!(?accounts, ?selected, "eth_requestAccounts");
        *self.authorized.lock() = selected;
        Ok(accounts)
    }

    async fn get_signer(&self) -> Result<Arc<dyn SigningHandle>, ProviderError> {
        let from = (*self.authorized.lock())
            .ok_or_else(|| ProviderError::unavailable("no account has been authorized"))?;
        Ok(Arc::new(RpcSigner {
            provider: self.provider.clone(),
            from,
            confirmations: self.confirmations,
        }))
    }
}

/// Signing handle for an account authorized through [`RpcGateway`].
#[derive(Clone)]
pub struct RpcSigner {
    provider: DynProvider,
    from: Address,
    confirmations: u64,
}

impl fmt::Debug for RpcSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcSigner").field("from", &self.from).finish_non_exhaustive()
    }
}

#[async_trait]
impl SigningHandle for RpcSigner {
    fn address(&self) -> Address {
        self.from
    }

    async fn invoke(
        &self,
        contract: Address,
        selector: Selector,
        value: U256,
    ) -> Result<TxHandle, ProviderError> {
        // Zero-argument call: the selector is the whole calldata.
        let tx = TransactionRequest::default()
            .with_from(self.from)
            .with_to(contract)
            .with_value(value)
            .with_input(selector.to_vec());
        let pending = self.provider.send_transaction(tx).await?;
        Ok(TxHandle::new(*pending.tx_hash()))
    }

    async fn wait_for_confirmation(&self, tx: &TxHandle) -> Result<ReceiptSummary, ProviderError> {
        // already mined: no need to spin up a block watcher for a single confirmation
        if self.confirmations <= 1
            && let Some(receipt) = self.provider.get_transaction_receipt(tx.hash).await?
        {
            return Ok(summarize(&receipt));
        }

        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx.hash)
            .with_required_confirmations(self.confirmations)
            .get_receipt()
            .await
            .map_err(|err| ProviderError::rpc(err.to_string()))?;
        Ok(summarize(&receipt))
    }
}

fn summarize(receipt: &impl ReceiptResponse) -> ReceiptSummary {
    ReceiptSummary {
        tx_hash: receipt.transaction_hash(),
        block_number: receipt.block_number(),
        gas_used: receipt.gas_used(),
        success: receipt.status(),
    }
}
