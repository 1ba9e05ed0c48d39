#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::Result;

pub mod args;
pub mod cmd;
pub mod handler;
pub mod opts;
pub mod utils;

use args::{Wrap, WrapSubcommand};

fn main() -> Result<()> {
    handler::install();
    utils::subscriber();
    utils::enable_paint();
    let args = Wrap::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Wrap) -> Result<()> {
    match args.cmd {
        WrapSubcommand::Connect(cmd) => cmd.run().await,
        WrapSubcommand::Deposit(cmd) => cmd.run().await,
    }
}
