//! # Feedmix CLI Entry Point
//!
//! Main binary for the feedmix content mixing service. Serves an ordered
//! feed of content items assembled from multiple upstream providers with a
//! per-position provider rotation and per-slot fallbacks.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the demo rotation with built-in sample providers
//! feedmix serve -b 0.0.0.0:8080 \
//!   --slot 1:2 --slot 1:2 --slot 2:3 --slot 3:1 --slot 1 \
//!   --sample
//!
//! # Serve against real upstream providers
//! feedmix serve -b 0.0.0.0:8080 \
//!   --slot news:wire --slot sports \
//!   --provider news=http://127.0.0.1:9001 \
//!   --provider wire=http://127.0.0.1:9002 \
//!   --provider sports=http://127.0.0.1:9003
//! ```
//!
//! ## Slot format
//!
//! Each `--slot` is one rotation slot, in rotation order, written as
//! `PRIMARY` or `PRIMARY:FALLBACK`. The rotation repeats indefinitely over
//! the feed positions. At least one slot is required; an empty rotation is
//! refused at startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use argh::FromArgs;

use feedmix_common::{ContentMix, MixEntry, ProviderId};
use feedmix_mixer::{ClientRegistry, HttpServer, Mixer, MixerConfig};
use feedmix_providers::{HttpContentProvider, SampleContentProvider};

/// Main CLI structure parsed from command-line arguments.
#[derive(FromArgs)]
/// feedmix - content feed mixing service
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

/// Available CLI subcommands.
#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
}

/// Arguments for serving the feed endpoint.
///
/// The server answers `GET /?offset=N&count=M` with a JSON object mapping
/// relative feed positions to content items. Provider failures never turn
/// into HTTP errors; they shorten the response instead.
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// serve the content feed
struct ServeArgs {
    /// address to bind the HTTP server to
    ///
    /// Defaults to "0.0.0.0:8080" for accessibility from other machines.
    #[argh(option, short = 'b', default = "\"0.0.0.0:8080\".into()")]
    bind: String,

    /// rotation slot as PRIMARY or PRIMARY:FALLBACK
    ///
    /// Can be specified multiple times; slots are taken in rotation order.
    /// At least one slot is required.
    #[argh(option, long = "slot")]
    slots: Vec<String>,

    /// provider binding as ID=BASE_URL
    ///
    /// Can be specified multiple times. Binds an HTTP content provider for
    /// the identity. Slots may reference unbound identities; their fetches
    /// resolve to failures at request time.
    /// Must include the http:// or https:// prefix (e.g., http://127.0.0.1:9001).
    #[argh(option, long = "provider")]
    providers: Vec<String>,

    /// bind a built-in sample provider for every identity in the mix
    ///
    /// Demo and smoke-test mode. Explicit --provider bindings take
    /// precedence over the samples.
    #[argh(switch, long = "sample")]
    sample: bool,

    /// upper bound on a single provider fetch in milliseconds
    ///
    /// Applies to primary and fallback fetches alike. Defaults to 30000ms
    /// (30 seconds).
    #[argh(option, long = "fetch-timeout-ms", default = "30000")]
    fetch_timeout_ms: u64,
}

/// Parses one `--slot` value of the form `PRIMARY` or `PRIMARY:FALLBACK`.
fn parse_slot(raw: &str) -> Result<MixEntry> {
    let (primary, fallback) = match raw.split_once(':') {
        Some((primary, fallback)) => (primary, Some(fallback)),
        None => (raw, None),
    };

    if primary.is_empty() {
        bail!("invalid slot '{}': empty primary provider", raw);
    }
    if fallback == Some("") {
        bail!("invalid slot '{}': empty fallback provider", raw);
    }

    Ok(MixEntry::new(
        ProviderId::new(primary),
        fallback.map(ProviderId::new),
    ))
}

/// Parses one `--provider` value of the form `ID=BASE_URL`.
fn parse_provider(raw: &str) -> Result<(ProviderId, String)> {
    let (id, url) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid provider '{}': expected ID=BASE_URL", raw))?;

    if id.is_empty() {
        bail!("invalid provider '{}': empty identity", raw);
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        bail!(
            "invalid provider '{}': '{}' must start with http:// or https://",
            raw,
            url
        );
    }

    Ok((ProviderId::new(id), url.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // Set default log level to INFO, but allow RUST_LOG env var to override
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .init();

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
    }
}

/// Executes the `serve` subcommand.
async fn run_serve(args: ServeArgs) -> Result<()> {
    let entries = args
        .slots
        .iter()
        .map(|raw| parse_slot(raw))
        .collect::<Result<Vec<_>>>()?;
    let mix = ContentMix::new(entries)
        .map_err(|e| anyhow!("refusing to serve: {} (add --slot entries)", e))?;

    tracing::info!("Starting feedmix with a {}-slot rotation", mix.len());

    let mut registry = ClientRegistry::new();

    if args.sample {
        for entry in mix.entries() {
            for id in [Some(&entry.primary), entry.fallback.as_ref()]
                .into_iter()
                .flatten()
            {
                registry.bind(
                    id.clone(),
                    Arc::new(SampleContentProvider::new(id.clone())),
                );
            }
        }
        tracing::info!("Sample providers bound for every identity in the mix");
    }

    for raw in &args.providers {
        let (id, url) = parse_provider(raw)?;
        tracing::info!("Provider '{}' -> {}", id, url);
        registry.bind(
            id.clone(),
            Arc::new(HttpContentProvider::new(id, url)),
        );
    }

    if registry.is_empty() {
        tracing::warn!("No providers bound! Every feed request will be empty.");
    }

    let config = MixerConfig {
        fetch_timeout: Duration::from_millis(args.fetch_timeout_ms),
    };
    let mixer = Mixer::with_config(mix, registry.into_shared(), config);

    let addr: SocketAddr = args
        .bind
        .parse()
        .map_err(|e| anyhow!("Invalid bind address {}: {}", args.bind, e))?;

    HttpServer::new(Arc::new(mixer)).run(addr).await?;

    Ok(())
}
