use alloy_primitives::Address;
use alloy_signer_local::PrivateKeySigner;
use clap::{Parser, ValueHint};
use eyre::{Result, WrapErr};
use std::{path::PathBuf, sync::Arc};
use wrap_config::{
    Config,
    figment::{
        self, Metadata, Profile,
        value::{Dict, Map},
    },
};
use wrap_wallets::{ProviderGateway, RpcGateway, TransactionOrchestrator, WalletMode, WrapSession};

/// How the wallet signs.
#[derive(Clone, Debug, Default, Parser)]
#[command(next_help_heading = "Wallet options")]
pub struct WalletOpts {
    /// Sign locally with the provided private key.
    #[arg(long, env = "ETH_PRIVATE_KEY", value_name = "RAW_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Send through an account unlocked on the node, even if a private key is set.
    #[arg(long)]
    pub unlocked: bool,

    /// The unlocked account to send from.
    ///
    /// Defaults to the first account the node reports.
    #[arg(long, short, value_name = "ADDRESS")]
    pub from: Option<Address>,
}

impl WalletOpts {
    /// Returns how the gateway should obtain its account.
    pub fn mode(&self, sender: Option<Address>) -> Result<WalletMode> {
        match &self.private_key {
            Some(key) if !self.unlocked => {
                let signer = key
                    .trim()
                    .parse::<PrivateKeySigner>()
                    .wrap_err("invalid private key")?;
                Ok(WalletMode::Local(signer))
            }
            _ => Ok(WalletMode::Unlocked { from: sender }),
        }
    }
}

/// Options shared by every command that opens a wallet session.
#[derive(Clone, Debug, Default, Parser)]
pub struct SessionOpts {
    /// The RPC endpoint of the wallet provider.
    #[arg(long, short, value_name = "URL")]
    pub rpc_url: Option<String>,

    /// Blocks to wait for before the wrap counts as confirmed.
    #[arg(long, value_name = "BLOCKS")]
    pub confirmations: Option<u64>,

    /// Seconds to wait for confirmation. `0` waits indefinitely.
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Path to the config file.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub config_path: Option<PathBuf>,

    #[command(flatten)]
    pub wallet: WalletOpts,
}

// Make the flags a `Figment` provider so they can be merged over the `Config`
impl figment::Provider for SessionOpts {
    fn metadata(&self) -> Metadata {
        Metadata::named("command line arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, figment::Error> {
        let mut dict = Dict::new();
        if let Some(url) = &self.rpc_url {
            dict.insert("rpc_url".into(), url.clone().into());
        }
        if let Some(confirmations) = self.confirmations {
            dict.insert("confirmations".into(), confirmations.into());
        }
        if let Some(timeout) = self.timeout {
            dict.insert("confirmation_timeout".into(), timeout.into());
        }
        if let Some(from) = self.wallet.from {
            dict.insert("sender".to_string(), from.to_string().into());
        }
        Ok(Map::from([(Profile::Default, dict)]))
    }
}

impl SessionOpts {
    /// Loads the config with these flags applied on top.
    pub fn load_config(&self) -> Result<Config> {
        let figment = match &self.config_path {
            Some(path) => Config::figment_with_file(path),
            None => Config::figment(),
        };
        Ok(Config::from_provider(figment.merge(self))?)
    }

    /// Opens a disconnected session against the configured provider.
    ///
    /// A session is returned even if no provider answers; connecting it then reports the
    /// missing provider.
    pub async fn session(&self, config: &Config) -> Result<WrapSession> {
        let mode = self.wallet.mode(config.sender)?;
        let gateway = RpcGateway::detect(&config.rpc_url, mode).await.map(|gateway| {
            Arc::new(
                gateway
                    .with_confirmations(config.confirmations)
                    .with_poll_interval(config.poll_interval()),
            ) as Arc<dyn ProviderGateway>
        });
        if gateway.is_none() {
            warn!(url = %config.rpc_url, "no wallet provider found");
        }
        let orchestrator =
            TransactionOrchestrator::new().with_confirmation_timeout(config.confirmation_timeout());
        Ok(WrapSession::with_orchestrator(gateway, orchestrator))
    }
}
