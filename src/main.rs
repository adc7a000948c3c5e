use clap::Parser;
use std::io::IsTerminal;
use tlsversion::cli::Cli;
use tlsversion::engine::Scanner;
use tlsversion::output::OutputSink;
use tlsversion::probe::OpensslProber;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let mut cfg = cli.into_config().await?;
    if !std::io::stdout().is_terminal() {
        cfg.output.color = false;
    }

    let mut scanner = Scanner::new(OpensslProber);
    if let Some(limit) = cfg.concurrency {
        scanner = scanner.with_concurrency(limit);
    }
    let results = scanner.run(&cfg.hosts, cfg.timeout).await;

    let mut sink = OutputSink::stdout(cfg.output.clone());
    sink.write_results(&results)?;

    Ok(())
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("tlsversion=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}
