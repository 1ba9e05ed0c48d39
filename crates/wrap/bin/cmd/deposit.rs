use crate::opts::SessionOpts;
use clap::Parser;
use eyre::Result;
use wrap_wallets::{ConnectionStatus, NATIVE_SYMBOL, SessionState, SubmissionState};
use yansi::Paint;

/// CLI arguments for `wrap deposit`.
#[derive(Clone, Debug, Parser)]
pub struct DepositArgs {
    /// The amount of ether to wrap, e.g. `0.5`.
    #[arg(allow_hyphen_values = true)]
    pub amount: String,

    #[command(flatten)]
    pub session: SessionOpts,

    /// Print every state change as a line of JSON.
    #[arg(long, short, help_heading = "Display options")]
    pub json: bool,
}

impl DepositArgs {
    pub async fn run(self) -> Result<()> {
        let config = self.session.load_config()?;
        let session = self.session.session(&config).await?;

        let mut rx = session.subscribe();
        let mut renderer = Renderer::new(self.json, rx.borrow_and_update().clone());

        let drive = async {
            if config.auto_connect {
                session.connect().await?;
            }
            session.set_amount_input(self.amount.as_str());
            session.submit().await
        };
        let mut drive = std::pin::pin!(drive);

        let res = loop {
            tokio::select! {
                res = &mut drive => break res,
                Ok(()) = rx.changed() => {
                    let state = rx.borrow_and_update().clone();
                    renderer.render(state)?;
                }
            }
        };
        // the last transition may land after the final poll of the channel
        renderer.render(session.snapshot())?;

        let receipt = res?;
        debug!(?receipt, "deposit finished");
        Ok(())
    }
}

/// Prints session transitions as they are observed.
#[derive(Debug)]
struct Renderer {
    json: bool,
    last: SessionState,
}

impl Renderer {
    fn new(json: bool, initial: SessionState) -> Self {
        Self { json, last: initial }
    }

    fn render(&mut self, state: SessionState) -> Result<()> {
        if state == self.last {
            return Ok(());
        }
        if self.json {
            println!("{}", serde_json::to_string(&state)?);
        } else {
            for line in describe(&self.last, &state) {
                match line {
                    Line::Progress(msg) => println!("{}", msg.dim()),
                    Line::Done(msg) => println!("{}", msg.green()),
                }
            }
        }
        self.last = state;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Progress(String),
    Done(String),
}

/// Lines describing the move from `prev` to `next`.
///
/// Errors are left to the final report.
fn describe(prev: &SessionState, next: &SessionState) -> Vec<Line> {
    let mut lines = Vec::new();

    if prev.connection_status != next.connection_status {
        match next.connection_status {
            ConnectionStatus::Connecting => {
                lines.push(Line::Progress("Connecting wallet...".to_string()))
            }
            ConnectionStatus::Connected => {
                let account = next.account.map(|a| a.to_string()).unwrap_or_default();
                lines.push(Line::Done(format!("Connected {account}")));
            }
            ConnectionStatus::Disconnected | ConnectionStatus::ConnectionFailed => {}
        }
    }

    if prev.submission != next.submission {
        match &next.submission {
            SubmissionState::Pending { tx: None } => lines.push(Line::Progress(format!(
                "Confirm the deposit of {} {NATIVE_SYMBOL} in your wallet...",
                next.amount_input.trim()
            ))),
            SubmissionState::Pending { tx: Some(tx) } => {
                lines.push(Line::Progress(format!("Transaction sent: {tx}")));
                lines.push(Line::Progress("Waiting for confirmation...".to_string()));
            }
            SubmissionState::Confirmed { receipt, summary } => {
                lines.push(Line::Done(summary.clone()));
                let block = receipt.block_number.map(|n| n.to_string()).unwrap_or_default();
                lines.push(Line::Progress(format!(
                    "Transaction {:#x} included in block {block}, gas used {}",
                    receipt.tx_hash, receipt.gas_used
                )));
            }
            SubmissionState::Idle | SubmissionState::Failed { .. } => {}
        }
    }

    lines
}
