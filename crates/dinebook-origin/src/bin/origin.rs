//! dinebook development origin server.
//!
//! Reads `origin.toml` (or the path given with `--config`) and the `ORIGIN_*`
//! environment, seeds an in-memory catalog and serves the JSON API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use dinebook_origin::{Catalog, OriginConfig, Seed};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "dinebook development origin server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "origin.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 1337)?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ORIGIN"))
    .build()
    .context("failed to read config file")?;

  let origin_cfg: OriginConfig = settings
    .try_deserialize()
    .context("failed to deserialise OriginConfig")?;

  let seed = match &origin_cfg.seed_path {
    Some(path) => {
      let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed file {}", path.display()))?;
      Seed::from_json(&raw).context("parsing seed file")?
    }
    None => Seed::bundled().context("parsing bundled seed")?,
  };
  tracing::info!(
    restaurants = seed.restaurants.len(),
    reviews = seed.reviews.len(),
    "catalog seeded"
  );

  let app = dinebook_origin::router(Catalog::shared(seed));
  let address = format!("{}:{}", origin_cfg.host, origin_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
