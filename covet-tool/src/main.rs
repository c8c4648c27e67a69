//! Covet terminal wishlist.

mod app;
mod store;
mod surface;
mod ui;

use std::path::PathBuf;

use clap::Parser;

use app::App;
use store::AnyStore;

#[derive(Parser)]
#[command(name = "covet")]
#[command(about = "Single-screen terminal wishlist over a durable item store")]
struct Cli {
    /// Path to the on-disk store (created if missing)
    #[arg(long, default_value = "covet-db", conflicts_with = "ephemeral")]
    path: PathBuf,

    /// Keep the list in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Start with three demo items
    #[arg(long)]
    seed: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = if cli.ephemeral {
        AnyStore::open_memory()
    } else {
        AnyStore::open_fjall(&cli.path)?
    };

    let mut app = App::new(store);
    if cli.seed {
        if let Err(err) = app.seed_demo() {
            app.last_error = Some(err.to_string());
        }
    }
    app.run()
}
