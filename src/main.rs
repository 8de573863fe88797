use anyhow::{bail, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand, ValueEnum};
use filmvault::catalog::{CatalogSource, ImageSize, Listing};
use filmvault::config::Configuration;
use filmvault::discovery::DiscoveryService;
use filmvault::http::HttpClient;
use filmvault::models::{CatalogItem, MediaKind};
use filmvault::recommend::Shelf;
use filmvault::store::{ReviewStore, WatchlistStore};
use filmvault::tmdb::TmdbClient;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show one page of a catalog listing
    List {
        kind: KindArg,
        listing: ListingArg,
        /// Genre id, required for the by-genre listing
        #[arg(long)]
        genre: Option<u32>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Search titles by name
    Search { kind: KindArg, query: String },
    /// Show the detail page of a title
    Details { kind: KindArg, id: u64 },
    /// Personalized shelves for a set of saved titles
    Recommend {
        /// Saved movie id, newest first (repeatable)
        #[arg(long = "movie")]
        movies: Vec<u64>,
        /// Saved show id, newest first (repeatable)
        #[arg(long = "show")]
        shows: Vec<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Movie,
    Show,
}

impl From<KindArg> for MediaKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Movie => MediaKind::Movie,
            KindArg::Show => MediaKind::Show,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ListingArg {
    Popular,
    TopRated,
    Trending,
    NowPlaying,
    Upcoming,
    OnTheAir,
    BestOfYear,
    Classics,
    ByGenre,
}

impl ListingArg {
    fn to_listing(self, genre: Option<u32>) -> Result<Listing> {
        Ok(match self {
            ListingArg::Popular => Listing::Popular,
            ListingArg::TopRated => Listing::TopRated,
            ListingArg::Trending => Listing::Trending,
            ListingArg::NowPlaying => Listing::NowPlaying,
            ListingArg::Upcoming => Listing::Upcoming,
            ListingArg::OnTheAir => Listing::OnTheAir,
            ListingArg::BestOfYear => Listing::TopRatedThisYear(chrono::Utc::now().year()),
            ListingArg::Classics => Listing::TopRatedClassics,
            ListingArg::ByGenre => match genre {
                Some(id) => Listing::ByGenre(id),
                None => bail!("--genre is required for the by-genre listing"),
            },
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = if Path::new(&cli.config).exists() {
        let config = Configuration::from_file(&cli.config)?;
        info!("Configuration loaded from: {}", cli.config);
        config
    } else {
        warn!("No configuration at {}, using defaults", cli.config);
        Configuration::default()
    };

    let token = config.tmdb_token();
    if token.is_none() {
        warn!("No TMDB token configured; requests will be rejected");
    }
    let http = HttpClient::new(token.as_deref(), config.request_timeout())?;
    let tmdb = TmdbClient::new(http, &config);

    match cli.command {
        Command::List {
            kind,
            listing,
            genre,
            page,
        } => {
            let listing = listing.to_listing(genre)?;
            let page = tmdb.listing(kind.into(), &listing, page).await?;
            println!("{} (page {} of {})", listing, page.page, page.total_pages);
            for item in &page.results {
                print_item(item);
            }
        }
        Command::Search { kind, query } => {
            let page = tmdb.search(kind.into(), &query, 1).await?;
            println!("{} results for '{}'", page.total_results, query);
            for item in &page.results {
                print_item(item);
            }
        }
        Command::Details { kind, id } => {
            let details = tmdb.details(kind.into(), id).await?;
            let item = &details.item;
            print_item(item);
            if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
                println!("  \"{}\"", tagline);
            }
            if let Some(overview) = item.overview.as_deref() {
                println!("  {}", overview);
            }
            if let Some(runtime) = details.runtime {
                println!("  Runtime: {} min", runtime);
            }
            if let Some(seasons) = details.number_of_seasons {
                println!("  Seasons: {}", seasons);
            }
            if !details.creators.is_empty() {
                println!("  Created by: {}", details.creators.join(", "));
            }
            if !details.cast.is_empty() {
                println!("  Cast: {}", details.cast.join(", "));
            }
            if let Some(poster) = tmdb.image_url(item.poster_path.as_deref(), ImageSize::W500) {
                println!("  Poster: {}", poster);
            }
            if let Some(trailer) = details.trailer {
                println!("  Trailer: https://www.youtube.com/watch?v={}", trailer.key);
            }
        }
        Command::Recommend { movies, shows } => {
            if movies.is_empty() && shows.is_empty() {
                bail!("pass at least one --movie or --show id");
            }

            let service = DiscoveryService::new(
                Arc::new(tmdb),
                WatchlistStore::new(),
                ReviewStore::new(),
                config.recommendation_settings(),
            );

            for (kind, ids) in [(MediaKind::Movie, movies), (MediaKind::Show, shows)] {
                if ids.is_empty() {
                    continue;
                }
                let shelves = service.recommend(kind, &ids).await;
                if shelves.is_empty() {
                    println!("No {} recommendations: saved titles carry no genres", kind);
                }
                for shelf in &shelves {
                    print_shelf(shelf);
                }
            }
        }
    }

    Ok(())
}

fn print_item(item: &CatalogItem) {
    let year = item.year().map(|y| y.to_string()).unwrap_or_else(|| "----".into());
    let rating = item
        .vote_average
        .map(|v| format!("{:.1}", v))
        .unwrap_or_else(|| "-".into());
    println!(
        "{:>8}  {}  {:>4}  {}",
        item.id,
        year,
        rating,
        item.display_title()
    );
}

fn print_shelf(shelf: &Shelf) {
    println!("\n== {} ({}) ==", shelf.title, shelf.kind);
    for item in &shelf.items {
        print_item(item);
    }
}
