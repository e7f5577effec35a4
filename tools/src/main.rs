//! txgen: synthetic card transaction generator.
//!
//! Usage:
//!   PUBSUB_ACCESS_TOKEN=$(gcloud auth print-access-token) txgen my-project us-central1
//!   PUBSUB_EMULATOR_HOST=localhost:8085 txgen my-project us-central1 --seed 12345 --ticks 500
//!   txgen my-project us-central1 --dry-run
//!
//! Runs until Ctrl-C (or `--ticks`), then drains in-flight publishes.

mod console;
mod pubsub;

use anyhow::{bail, Context, Result};
use clap::Parser;
use console::ConsoleTransport;
use pubsub::{PubSubTransport, DEFAULT_TOPIC};
use std::sync::Arc;
use txgen_core::{
    config::GeneratorConfig,
    driver::{Driver, RunSummary},
    publisher::OrderedPublisher,
    scenario::ScenarioEngine,
    transport::Transport,
    types::Tick,
};

#[derive(Parser, Debug)]
#[command(name = "txgen", version, about = "Publish synthetic card transactions with injected fraud")]
struct Cli {
    /// Project that owns the topic.
    project_id: String,

    /// Region used to pick the regional publish endpoint.
    region: String,

    #[arg(long, default_value = DEFAULT_TOPIC)]
    topic: String,

    /// Master seed. Drawn at random (and logged) when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<Tick>,

    /// Print messages to stdout instead of publishing.
    #[arg(long)]
    dry_run: bool,

    /// Publish endpoint override, e.g. http://localhost:8085.
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(long, env = "PUBSUB_EMULATOR_HOST", hide_env_values = true)]
    emulator_host: Option<String>,

    #[arg(long, env = "PUBSUB_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,
}

impl Cli {
    fn endpoint(&self) -> String {
        if let Some(endpoint) = &self.endpoint {
            endpoint.clone()
        } else if let Some(host) = &self.emulator_host {
            format!("http://{host}")
        } else {
            pubsub::regional_endpoint(&self.region)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if cli.project_id.trim().is_empty() || cli.region.trim().is_empty() {
        bail!("project id and region must not be empty");
    }

    let seed = cli.seed.unwrap_or_else(rand::random);
    let topic_path = pubsub::topic_path(&cli.project_id, &cli.topic);
    log::info!("seed={seed} topic={topic_path}");

    let transport: Arc<dyn Transport> = if cli.dry_run {
        Arc::new(ConsoleTransport::new(topic_path))
    } else {
        let endpoint = cli.endpoint();
        log::info!("publishing to {endpoint}");
        Arc::new(
            PubSubTransport::new(&endpoint, &topic_path, cli.access_token.clone())
                .context("creating Pub/Sub publisher")?,
        )
    };

    let engine = ScenarioEngine::build(GeneratorConfig::default(), seed)
        .context("building scenario engine")?;

    let signals = ShutdownSignal::install().context("installing signal handlers")?;
    log::info!("Starting transaction generator. Press Ctrl+C to stop.");
    let summary = Driver::new(engine, OrderedPublisher::new(transport))
        .with_tick_limit(cli.ticks)
        .run(signals.recv())
        .await
        .context("generator stopped on error")?;

    print_summary(seed, &summary);
    Ok(())
}

/// Ctrl-C, plus SIGTERM on unix. Listeners are registered by
/// `install`, not on first poll, so a signal that lands before the
/// first tick still ends in a drain.
struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignal {
    #[cfg(unix)]
    fn install() -> Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).context("listening for SIGINT")?,
            terminate: signal(SignalKind::terminate()).context("listening for SIGTERM")?,
        })
    }

    #[cfg(not(unix))]
    fn install() -> Result<Self> {
        Ok(Self {})
    }

    #[cfg(unix)]
    async fn recv(mut self) {
        tokio::select! {
            _ = self.interrupt.recv() => {}
            _ = self.terminate.recv() => {}
        }
    }

    #[cfg(not(unix))]
    async fn recv(self) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

fn print_summary(seed: u64, summary: &RunSummary) {
    eprintln!("=== RUN SUMMARY ===");
    eprintln!("  seed:           {seed}");
    eprintln!("  ticks run:      {}", summary.ticks);
    eprintln!("  events:         {}", summary.events);
    eprintln!("  normal:         {}", summary.normal);
    eprintln!("  charity fraud:  {}", summary.charity_scenarios);
    eprintln!("  double drip:    {}", summary.double_drip_scenarios);
    eprintln!("  published:      {}", summary.publish.published);
    eprintln!("  failed:         {}", summary.publish.failed);
    if summary.abandoned > 0 {
        eprintln!("  abandoned:      {}", summary.abandoned);
    }
    if let Some(reason) = summary.stop_reason {
        eprintln!("  stopped:        {reason:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("txgen").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn positional_arguments_are_required() {
        assert!(Cli::try_parse_from(["txgen", "only-project"]).is_err());
    }

    #[test]
    fn explicit_endpoint_wins() {
        let cli = parse(&["p", "us-east1", "--endpoint", "http://127.0.0.1:9000", "--emulator-host", "x:1"]);
        assert_eq!(cli.endpoint(), "http://127.0.0.1:9000");
    }

    #[test]
    fn emulator_host_beats_region() {
        let cli = parse(&["p", "us-east1", "--emulator-host", "localhost:8085"]);
        assert_eq!(cli.endpoint(), "http://localhost:8085");
    }

    #[tokio::test]
    async fn signal_listeners_install_without_firing() {
        let signals = ShutdownSignal::install().expect("install handlers");
        let fired = tokio::time::timeout(std::time::Duration::from_millis(20), signals.recv()).await;
        assert!(fired.is_err(), "no signal was sent, so recv must still be pending");
    }

    #[test]
    fn bounded_run_flags() {
        let cli = parse(&["p", "asia-south1", "--seed", "7", "--ticks", "100", "--dry-run"]);
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.ticks, Some(100));
        assert!(cli.dry_run);
        assert_eq!(cli.topic, DEFAULT_TOPIC);
    }
}
