use crate::opts::SessionOpts;
use clap::Parser;
use eyre::Result;
use yansi::Paint;

/// CLI arguments for `wrap connect`.
#[derive(Clone, Debug, Parser)]
pub struct ConnectArgs {
    #[command(flatten)]
    pub session: SessionOpts,

    /// Print the account as JSON.
    #[arg(long, short, help_heading = "Display options")]
    pub json: bool,
}

impl ConnectArgs {
    pub async fn run(self) -> Result<()> {
        let config = self.session.load_config()?;
        let session = self.session.session(&config).await?;

        let signer = session.connect().await?;
        if self.json {
            println!("{}", serde_json::to_string(&session.snapshot())?);
        } else {
            println!("{} {}", "Connected:".green(), signer.address());
        }
        Ok(())
    }
}
