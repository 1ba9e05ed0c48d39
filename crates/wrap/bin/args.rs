use crate::cmd::{connect::ConnectArgs, deposit::DepositArgs};
use clap::{Parser, Subcommand};

/// Wrap native ether into WETH through a connected wallet.
#[derive(Parser)]
#[command(name = "wrap", version, next_display_order = None)]
pub struct Wrap {
    #[command(subcommand)]
    pub cmd: WrapSubcommand,
}

#[derive(Subcommand)]
pub enum WrapSubcommand {
    /// Connect the wallet and print the authorized account.
    #[command(visible_alias = "c")]
    Connect(ConnectArgs),

    /// Deposit ether into the WETH9 contract.
    #[command(visible_aliases = &["d", "wrap"])]
    Deposit(DepositArgs),
}
