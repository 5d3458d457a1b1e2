//! `dinebook`: browse the restaurant directory from the terminal.
//!
//! # Usage
//!
//! ```text
//! dinebook restaurants --cuisine Pizza --neighborhood Brooklyn
//! dinebook show 3
//! dinebook --offline review 3 --name Ann --rating 5 --comments "Great bulgogi"
//! dinebook sync
//! ```

mod app;
mod render;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, Subcommand};
use dinebook_core::{query::Selection, restaurant::RestaurantId};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dinebook", version, about = "Offline-first restaurant directory")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", env = "DINEBOOK_CONFIG", default_value = "dinebook.toml")]
  config: PathBuf,

  /// Base URL of the origin API (default: http://localhost:1337).
  #[arg(long, value_name = "URL")]
  origin: Option<String>,

  /// Path of the local SQLite store.
  #[arg(long, value_name = "PATH")]
  store: Option<PathBuf>,

  /// Treat the network as unavailable: reviews are queued, not posted.
  #[arg(long, env = "DINEBOOK_OFFLINE")]
  offline: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List restaurants, optionally filtered.
  Restaurants {
    #[arg(long, default_value = "all")]
    cuisine:      Selection,
    #[arg(long, default_value = "all")]
    neighborhood: Selection,
  },
  /// Show one restaurant with its reviews.
  Show { id: i64 },
  /// List the cuisines present in the directory.
  Cuisines,
  /// List the neighborhoods present in the directory.
  Neighborhoods,
  /// List the reviews of a restaurant.
  Reviews { id: i64 },
  /// Write a review.
  Review {
    id:       i64,
    #[arg(long)]
    name:     String,
    /// 1 to 5.
    #[arg(long)]
    rating:   i64,
    #[arg(long, default_value = "")]
    comments: String,
  },
  /// Mark a restaurant as favorite (or clear it with --off).
  Favorite {
    id:  i64,
    #[arg(long)]
    off: bool,
  },
  /// List reviews waiting to be sent.
  Pending,
  /// Send pending reviews now.
  Sync,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();

  let overrides = settings::Overrides {
    origin_url: args.origin.clone(),
    store_path: args.store.clone(),
  };
  let settings = settings::load(&args.config, &overrides)
    .with_context(|| format!("loading configuration from {}", args.config.display()))?;

  let mut app = App::open(&settings).await.context("opening the directory")?;
  if !args.offline {
    match app.connect().await {
      Ok(report) => {
        if let Some(summary) = report.as_ref().and_then(render::startup_replay) {
          eprintln!("{summary}");
        }
      }
      Err(e) => tracing::warn!(error = %e, "replay of pending reviews failed"),
    }
  }

  run(&mut app, args.command).await
}

async fn run(app: &mut App, command: Command) -> Result<()> {
  match command {
    Command::Restaurants { cuisine, neighborhood } => {
      app.set_filters(cuisine, neighborhood);
      let listing = app.refresh().await.context("loading restaurants")?;
      if listing.is_empty() {
        println!("No restaurants found.");
      }
      for r in listing {
        println!("{}", render::restaurant_line(r));
      }
    }

    Command::Show { id } => {
      let id = RestaurantId(id);
      let restaurant = app.restaurant(id).await.context("loading restaurant")?;
      print!("{}", render::restaurant_detail(&restaurant));
      println!();
      match app.directory.fetch_reviews(id).await {
        Ok(reviews) => print_reviews(&reviews),
        Err(e) => println!("Reviews unavailable: {e}"),
      }
    }

    Command::Cuisines => {
      for c in app.directory.fetch_cuisines().await.context("loading cuisines")? {
        println!("{c}");
      }
    }

    Command::Neighborhoods => {
      let neighborhoods = app
        .directory
        .fetch_neighborhoods()
        .await
        .context("loading neighborhoods")?;
      for n in neighborhoods {
        println!("{n}");
      }
    }

    Command::Reviews { id } => {
      let reviews = app
        .directory
        .fetch_reviews(RestaurantId(id))
        .await
        .context("loading reviews")?;
      print_reviews(&reviews);
    }

    Command::Review { id, name, rating, comments } => {
      let outcome = app
        .directory
        .submit_review(RestaurantId(id), name, rating, &comments)
        .await
        .context("submitting review")?;
      println!("{}", render::submit_outcome(&outcome));
    }

    Command::Favorite { id, off } => {
      let id = RestaurantId(id);
      let is_favorite = !off;
      let updated = app
        .directory
        .set_favorite(id, is_favorite)
        .await
        .context("updating favorite")?;
      let verb = if is_favorite { "marked as favorite" } else { "removed from favorites" };
      match updated {
        Some(r) => println!("{} {verb}.", r.name),
        None => println!("Restaurant {id} {verb}."),
      }
    }

    Command::Pending => {
      let pending = app.directory.pending_reviews().await?;
      if pending.is_empty() {
        println!("No pending reviews.");
      }
      for p in &pending {
        println!("{}", render::pending_line(p));
      }
    }

    Command::Sync => {
      anyhow::ensure!(
        app.directory.network_state().is_online(),
        "cannot sync while --offline is set"
      );
      let report = app
        .directory
        .flush_pending()
        .await
        .context("replaying pending reviews")?;
      match report {
        Some(report) => println!("{}", render::replay_report(&report)),
        None => println!("A replay is already running."),
      }
    }
  }

  Ok(())
}

fn print_reviews(reviews: &[dinebook_core::review::Review]) {
  if reviews.is_empty() {
    println!("No reviews yet!");
    return;
  }
  for r in reviews {
    println!("{}\n", render::review_block(r));
  }
}
