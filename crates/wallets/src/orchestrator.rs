use crate::{
    DEPOSIT_SELECTOR, NATIVE_SYMBOL, WETH9, WRAPPED_SYMBOL, amount,
    error::{ErrorInfo, ErrorKind},
    gateway::{ReceiptSummary, SigningHandle, TxHandle},
    state::{ConnectionStatus, SessionContext, SubmissionState},
};
use std::{sync::Arc, time::Duration};

/// Submits the wrap transaction and tracks it until it is confirmed or fails.
#[derive(Clone, Debug, Default)]
pub struct TransactionOrchestrator {
    confirmation_timeout: Option<Duration>,
}

impl TransactionOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives up waiting for confirmation after `timeout`.
    ///
    /// The transaction may still be mined after the session reports the failure.
    pub fn with_confirmation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.confirmation_timeout = timeout;
        self
    }

    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout
    }

    /// Wraps the amount currently entered in `ctx` using `signer`.
    ///
    /// Precondition failures are recorded in `last_error` and leave the submission state
    /// as it was. Once the submission is `Pending` it always ends `Confirmed` or `Failed`.
    pub async fn submit(
        &self,
        ctx: &SessionContext,
        signer: Option<Arc<dyn SigningHandle>>,
    ) -> Result<ReceiptSummary, ErrorInfo> {
        let snapshot = ctx.snapshot();
        let signer = match signer {
            Some(signer) if snapshot.connection_status == ConnectionStatus::Connected => signer,
            _ => return Err(self.reject(ctx, ErrorInfo::not_connected())),
        };

        let input = snapshot.amount_input.trim().to_string();
        let amount = match amount::validate(&input) {
            Ok(amount) => amount,
            Err(error) => return Err(self.reject(ctx, error)),
        };

        let started = ctx.update_if(|state| {
            if state.submission.is_pending() {
                return false;
            }
            state.submission = SubmissionState::Pending { tx: None };
            true
        });
        if !started {
            return Err(self.reject(ctx, ErrorInfo::already_pending()));
        }
        let mut guard = PendingGuard { ctx, tx: None, armed: true };

        debug!(%amount, from = %signer.address(), "submitting wrap");
        let tx = match signer.invoke(WETH9, DEPOSIT_SELECTOR, amount.get()).await {
            Ok(tx) => tx,
            Err(err) => {
                guard.disarm();
                let error = ErrorInfo::new(
                    ErrorKind::SubmissionFailed,
                    format!("Failed to wrap Ether: {err}"),
                );
                return Err(self.fail(ctx, error));
            }
        };
        debug!(%tx, "wrap transaction broadcast");
        guard.tx = Some(tx);
        ctx.update(|state| state.submission = SubmissionState::Pending { tx: Some(tx) });

        let confirmed = self.confirm(signer.as_ref(), &tx).await;
        guard.disarm();
        let receipt = match confirmed {
            Ok(receipt) => receipt,
            Err(error) => return Err(self.fail(ctx, error)),
        };

        let summary = format!("Successfully wrapped {input} {NATIVE_SYMBOL} to {WRAPPED_SYMBOL}");
        info!(%tx, block = ?receipt.block_number, "{summary}");
        ctx.update(|state| {
            state.submission =
                SubmissionState::Confirmed { receipt: receipt.clone(), summary };
            state.last_error = None;
        });
        Ok(receipt)
    }

    async fn confirm(
        &self,
        signer: &dyn SigningHandle,
        tx: &TxHandle,
    ) -> Result<ReceiptSummary, ErrorInfo> {
        let wait = signer.wait_for_confirmation(tx);
        let result = match self.confirmation_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, wait).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(ErrorInfo::new(
                        ErrorKind::ConfirmationFailed,
                        format!(
                            "Timed out after {timeout:?} waiting for {tx} to confirm; \
                             the transaction may still be mined"
                        ),
                    ));
                }
            },
            None => wait.await,
        };

        match result {
            Ok(receipt) if receipt.success => Ok(receipt),
            Ok(receipt) => Err(ErrorInfo::new(
                ErrorKind::ConfirmationFailed,
                format!("Failed to wrap Ether: transaction {:#x} reverted", receipt.tx_hash),
            )),
            Err(err) => Err(ErrorInfo::new(
                ErrorKind::ConfirmationFailed,
                format!("Failed to wrap Ether: {err}"),
            )),
        }
    }

    /// Records a precondition failure without touching the submission.
    fn reject(&self, ctx: &SessionContext, error: ErrorInfo) -> ErrorInfo {
        debug!(kind = %error.kind, "wrap rejected: {}", error.message);
        ctx.record_error(&error);
        error
    }

    fn fail(&self, ctx: &SessionContext, error: ErrorInfo) -> ErrorInfo {
        warn!(kind = %error.kind, "wrap failed: {}", error.message);
        ctx.update(|state| {
            state.submission = SubmissionState::Failed { error: error.clone() };
            state.last_error = Some(error.clone());
        });
        error
    }
}

/// Moves a `Pending` submission to `Failed` if `submit` is dropped before it finishes.
struct PendingGuard<'a> {
    ctx: &'a SessionContext,
    /// Set once the wallet has broadcast the transaction.
    tx: Option<TxHandle>,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let error = match self.tx {
            Some(tx) => ErrorInfo::new(
                ErrorKind::ConfirmationFailed,
                format!("Stopped waiting for {tx} to confirm; the transaction may still be mined"),
            ),
            None => ErrorInfo::new(
                ErrorKind::SubmissionFailed,
                "Failed to wrap Ether: the request was cancelled before the wallet sent it",
            ),
        };
        warn!(kind = %error.kind, "wrap abandoned: {}", error.message);
        self.ctx.update(|state| {
            if state.submission.is_pending() {
                state.submission = SubmissionState::Failed { error: error.clone() };
                state.last_error = Some(error);
            }
        });
    }
}
