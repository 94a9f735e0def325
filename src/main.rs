use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use hridayai::chat::{Mediator, ProviderKind, ProxyClient, Session, terminal};
use hridayai::config::{ClientConfig, ProxyConfig, load_dotenv};
use hridayai::logging;
use hridayai::storage::FileStore;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hridayai", about = "HridayAi chat assistant and provider proxy")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the provider proxy.
    Serve {
        /// Interface to bind.
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Chat in the terminal.
    Chat {
        /// Reply source: mock or remote.
        #[arg(long)]
        provider: Option<ProviderKind>,
        /// Proxy endpoint used by the remote provider.
        #[arg(long)]
        proxy_url: Option<String>,
        /// Model identifier sent to the proxy.
        #[arg(long)]
        model: Option<String>,
        /// Where preferences are stored.
        #[arg(long)]
        prefs_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    load_dotenv();
    logging::init();

    let cli = Cli::parse();
    let runtime = tokio::runtime::Runtime::new()?;

    match cli.command {
        Command::Serve { host, port } => {
            let mut config = ProxyConfig::from_env();
            config.host = host.unwrap_or(config.host);
            config.port = port.unwrap_or(config.port);
            runtime.block_on(hridayai::proxy::serve(config))
        }
        Command::Chat {
            provider,
            proxy_url,
            model,
            prefs_dir,
        } => {
            let mut config = ClientConfig::from_env();
            config.provider = provider.unwrap_or(config.provider);
            config.proxy_url = proxy_url.unwrap_or(config.proxy_url);
            config.model = model.unwrap_or(config.model);
            config.prefs_dir = prefs_dir.or(config.prefs_dir);

            let store = match &config.prefs_dir {
                Some(dir) => FileStore::new(dir),
                None => FileStore::default_location(),
            };
            info!(provider = ?config.provider, prefs = %store.root().display(), "starting chat");

            let mediator = Mediator::new(ProxyClient::new(config.proxy_url)).with_model(config.model);
            let mut session = Session::new(store, config.provider);
            runtime.block_on(terminal::run(&mediator, &mut session))
        }
    }
}
