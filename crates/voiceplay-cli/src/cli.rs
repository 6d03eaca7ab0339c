use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use voiceplay_core::{CatalogKind, IdentifierStatus, PlayerView, VoiceplayConfig};

use crate::commands;
use crate::{HostState, RouteParams};

#[derive(Parser)]
#[command(name = "voiceplay")]
#[command(about = "Pick an embed source for a movie or series, resolving its Kinopoisk id")]
#[command(version)]
pub struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List providers available for a title
    Sources {
        #[command(flatten)]
        title: TitleArgs,
        /// Built-in catalog: multi or voice
        #[arg(long, default_value = "multi")]
        catalog: CatalogKind,
    },
    /// Resolve the Kinopoisk id for a title
    Resolve {
        #[command(flatten)]
        title: TitleArgs,
    },
    /// Open a player and print what it shows
    Play {
        #[command(flatten)]
        title: TitleArgs,
        /// Built-in catalog: multi or voice
        #[arg(long, default_value = "voice")]
        catalog: CatalogKind,
        /// Switch to this source index after opening
        #[arg(short, long)]
        select: Option<usize>,
        /// Retry resolution once if the id was not found
        #[arg(long)]
        retry: bool,
        /// Print the iframe element for the active source
        #[arg(long)]
        html: bool,
    },
}

/// Route-style title parameters
#[derive(Args, Debug, Clone)]
pub struct TitleArgs {
    /// Media type from the detail route: movie or tv
    #[arg(value_name = "MEDIA_TYPE")]
    pub media_type: String,
    /// TMDB id
    #[arg(long)]
    pub tmdb: Option<String>,
    /// IMDb id
    #[arg(long)]
    pub imdb: Option<String>,
    /// Kinopoisk id, when already known
    #[arg(long)]
    pub kp: Option<String>,
    /// Display title
    #[arg(short, long)]
    pub title: Option<String>,
    /// Release year
    #[arg(short, long)]
    pub year: Option<u32>,
}

impl From<&TitleArgs> for RouteParams {
    fn from(args: &TitleArgs) -> Self {
        Self {
            media_type: args.media_type.clone(),
            tmdb_id: args.tmdb.clone(),
            imdb_id: args.imdb.clone(),
            kinopoisk_id: args.kp.clone(),
            title: args.title.clone(),
            year: args.year,
        }
    }
}

impl Cli {
    fn load_config(&self) -> Result<VoiceplayConfig> {
        match &self.config {
            Some(path) => VoiceplayConfig::load(path)
                .with_context(|| format!("loading config from {}", path.display())),
            None => Ok(VoiceplayConfig::default().with_env_overrides()),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = HostState::new(self.load_config()?)?;

        match &self.command {
            Command::Sources { title, catalog } => {
                let reference = RouteParams::from(title).to_reference()?;
                let sources = commands::list_sources(&state, &reference, *catalog)?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&sources)?);
                } else if sources.is_empty() {
                    println!("No providers available for this title");
                } else {
                    for (i, source) in sources.iter().enumerate() {
                        println!("{:>2}. {} {} [{}]", i, source.icon, source.name, source.quality);
                        println!("    {}", source.url);
                    }
                }
            }
            Command::Resolve { title } => {
                let reference = RouteParams::from(title).to_reference()?;
                let resolution = commands::resolve_catalog_id(&state, &reference).await;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&resolution)?);
                } else {
                    match &resolution.catalog_id {
                        Some(id) => println!("Kinopoisk id: {}", id),
                        None => println!("Kinopoisk id not found"),
                    }
                }
            }
            Command::Play {
                title,
                catalog,
                select,
                retry,
                html,
            } => {
                let reference = RouteParams::from(title).to_reference()?;
                let view = commands::play(&state, reference, *catalog, *select, *retry).await?;
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&view)?);
                } else {
                    print_view(&view, *html);
                }
            }
        }

        Ok(())
    }
}

fn print_view(view: &PlayerView, html: bool) {
    match view {
        PlayerView::Searching { title } => println!("Searching sources for {}...", title),
        PlayerView::Closed => println!("Player closed"),
        PlayerView::Unavailable {
            title,
            tmdb_id,
            imdb_id,
            kinopoisk_id,
            catalog_page_url,
        } => {
            println!("No players available for {}", title);
            for (label, id) in [("TMDB", tmdb_id), ("IMDB", imdb_id), ("Kinopoisk", kinopoisk_id)] {
                if let Some(id) = id {
                    println!("  {}: {}", label, id);
                }
            }
            if let Some(url) = catalog_page_url {
                println!("  {}", url);
            }
        }
        PlayerView::Playing {
            title,
            kind,
            sources,
            selected,
            frame,
            identifier,
            catalog_page_url,
            ..
        } => {
            println!("{} ({})", title, kind);
            for (i, source) in sources.iter().enumerate() {
                let marker = if i == *selected { '*' } else { ' ' };
                println!("{} {:>2}. {} {} [{}]", marker, i, source.icon, source.name, source.quality);
            }
            println!("Embed: {}", frame.src);
            match identifier {
                IdentifierStatus::Found { catalog_id } => println!("Kinopoisk id: {}", catalog_id),
                IdentifierStatus::NotFound => {
                    println!("Kinopoisk id not found; alternative sources in use (retry with --retry)")
                }
                IdentifierStatus::NotApplicable => {}
            }
            if let Some(url) = catalog_page_url {
                println!("Kinopoisk page: {}", url);
            }
            if html {
                println!("{}", frame.to_html());
            }
        }
    }
}
