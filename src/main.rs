use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;

use applin::config::ClientConfig;
use applin::model::PageKey;
use applin::session::Session;
use applin::tui_shell::{self, Screen, TerminalPresenter};

#[derive(Parser)]
#[command(name = "applin")]
#[command(about = "Terminal client for Applin servers", long_about = None)]
struct Cli {
    /// Server base URL (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// JSON client config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// First page to open (overrides the config file)
    #[arg(long)]
    start: Option<String>,

    /// Where to write logs; the terminal itself is used by the UI
    #[arg(long = "log-file", value_name = "PATH", default_value = "applin.log")]
    log_file: PathBuf,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;
    let config = load_config(&cli)?;
    tracing::info!(base_url = %config.base_url, start = %config.start_page, "starting");

    let runtime = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let screen = Arc::new(Mutex::new(Screen::default()));
    let session = Session::new(&config, TerminalPresenter::new(Arc::clone(&screen)))
        .context("create session")?;

    let start = PageKey::new(config.start_page.clone());
    let starter = session.clone();
    runtime.spawn(async move {
        if let Err(err) = starter.start(start).await {
            tracing::warn!(%err, "start failed");
        }
    });

    let res = tui_shell::run(session.clone(), screen, runtime.handle().clone());
    runtime.block_on(session.shutdown());
    res
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match (&cli.config, &cli.url) {
        (Some(path), _) => ClientConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        (None, Some(url)) => ClientConfig::new(url.clone()).context("client config")?,
        (None, None) => anyhow::bail!("pass --url or --config"),
    };
    if let Some(url) = &cli.url {
        config.base_url = url.clone();
    }
    if let Some(start) = &cli.start {
        config.start_page = start.clone();
    }
    config.validate().context("client config")?;
    Ok(config)
}

fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
