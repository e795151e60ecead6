//! Gallery Core - CLI
//!
//! Small command-line front end over the data layer, mainly useful for
//! poking at a real Pexels account and inspecting the local cache.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use gallery_core::{GalleryConfig, GalleryRepo, Photo};

#[derive(Parser)]
#[command(name = "gallery")]
#[command(version = gallery_core::VERSION)]
#[command(about = "Offline-first Pexels photo gallery")]
struct Cli {
    /// Data directory (cache database, encrypted settings, keys)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store the Pexels API key
    SetKey {
        /// The API key value
        value: String,
    },

    /// Report whether a usable API key is stored
    KeyStatus,

    /// Remove the stored API key
    ClearKey,

    /// List curated photos from the network
    List {
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },

    /// Show one photo, cache-first
    Show {
        /// Photo ID
        id: i64,
    },

    /// List what the local cache holds
    Cached,

    /// Empty the local cache
    ClearCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = GalleryConfig::default();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let repo = GalleryRepo::open(config).context("failed to open gallery data layer")?;
    repo.seed_initial_credential_if_needed()
        .context("initial credential seeding failed")?;

    match cli.command {
        Commands::SetKey { value } => {
            repo.save_credential(&value)?;
            println!("API key stored.");
        }

        Commands::KeyStatus => {
            if repo.has_valid_credential() {
                println!("A usable API key is stored.");
            } else {
                println!("No API key stored.");
            }
        }

        Commands::ClearKey => {
            repo.clear_credential()?;
            println!("API key removed.");
        }

        Commands::List { pages } => {
            let mut pager = repo.pager();
            for _ in 0..pages {
                match pager.load_next().await? {
                    Some(page) => {
                        for photo in &page.photos {
                            print_photo_line(photo);
                        }
                    }
                    None => {
                        println!("(collection exhausted)");
                        break;
                    }
                }
            }
        }

        Commands::Show { id } => {
            let mut rx = repo.photo_detail(id);
            while let Some(state) = rx.recv().await {
                if !state.is_terminal() {
                    println!("loading...");
                }
                state
                    .on_success(print_photo)
                    .on_error(|message| println!("error: {message}"));
            }
        }

        Commands::Cached => {
            let rows = repo.observe_photos().borrow().clone();
            if rows.is_empty() {
                println!("(cache is empty)");
            }
            for row in rows {
                println!(
                    "{:>10}  {}",
                    row.id,
                    row.photographer.as_deref().unwrap_or("(unknown)")
                );
            }
        }

        Commands::ClearCache => {
            repo.clear_cache()?;
            println!("Cache cleared.");
        }
    }

    Ok(())
}

fn print_photo_line(photo: &Photo) {
    println!(
        "{:>10}  {}  {}",
        photo.id,
        photo.avg_color.to_hex(),
        photo.photographer.as_deref().unwrap_or("(unknown)")
    );
}

fn print_photo(photo: &Photo) {
    println!("id:           {}", photo.id);
    println!(
        "photographer: {}",
        photo.photographer.as_deref().unwrap_or("(unknown)")
    );
    if let (Some(w), Some(h)) = (photo.width, photo.height) {
        println!("size:         {w}x{h}");
    }
    println!("avg color:    {}", photo.avg_color.to_hex());
    if let Some(url) = photo.url.as_deref() {
        println!("url:          {url}");
    }
    if let Some(alt) = photo.alt.as_deref() {
        println!("alt:          {alt}");
    }
}
