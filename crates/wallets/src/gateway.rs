//! The contract between the session core and an external wallet provider.
//!
//! The provider is modelled after an [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193)
//! injected wallet: accounts must be requested before anything can be signed, and a
//! transaction is signed and broadcast in a single step.

use crate::error::ProviderError;
use alloy_primitives::{Address, Selector, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// An externally supplied wallet provider.
#[async_trait]
pub trait ProviderGateway: Send + Sync {
    /// Asks the wallet for account access. This may suspend while the user decides.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Returns a signing handle for the authorized account.
    async fn get_signer(&self) -> Result<Arc<dyn SigningHandle>, ProviderError>;
}

/// An authorized capability that can submit transactions on behalf of an account.
#[async_trait]
pub trait SigningHandle: fmt::Debug + Send + Sync {
    /// The account this handle signs for.
    fn address(&self) -> Address;

    /// Calls `selector` on `contract` with `value` attached, returning once the
    /// transaction has been broadcast.
    async fn invoke(
        &self,
        contract: Address,
        selector: Selector,
        value: U256,
    ) -> Result<TxHandle, ProviderError>;

    /// Waits until `tx` is included on chain.
    async fn wait_for_confirmation(&self, tx: &TxHandle) -> Result<ReceiptSummary, ProviderError>;
}

/// A broadcast transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxHandle {
    pub hash: TxHash,
}

impl TxHandle {
    pub const fn new(hash: TxHash) -> Self {
        Self { hash }
    }
}

impl fmt::Display for TxHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.hash)
    }
}

/// The parts of a transaction receipt the session cares about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptSummary {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// Whether the transaction executed without reverting.
    pub success: bool,
}
