use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lane_balancer::calculate::RankEstimate;
use lane_balancer::config::AppConfig;
use lane_balancer::ingest::{score_profile, FileProfileSource, Ingestor, RawProfile};
use lane_balancer::matchmaking::TeamMaker;
use lane_balancer::models::{decode, encode, RoleEdit};
use lane_balancer::storage::{MatchLog, MatchRecord, PlayerStore};

#[derive(Parser)]
#[command(name = "lane-balancer")]
#[command(about = "Rank scoring and five lane team balancing")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./lane-balancer.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a tier string ("Gold 2") or decode a score ("13.5")
    Rank { value: String },

    /// Score a raw profile file
    Score { profile: PathBuf },

    /// Inspect and edit stored players
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },

    /// Balance ten players into two teams
    Match {
        /// Player names as name#tag
        #[arg(num_args = 10, required = true)]
        names: Vec<String>,

        /// Seed for reproducible teams
        #[arg(long)]
        seed: Option<u64>,

        /// Append the result to the match history
        #[arg(long)]
        save: bool,
    },

    /// Show saved matches, newest first
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Show a player, acquiring them if unknown or stale
    Show { name: String },

    /// Re-acquire a player from their profile
    Fetch { name: String },

    /// Replace a player's role preferences
    Update {
        name: String,

        /// Ordered role edits, e.g. --role "adc=Gold 2=70" --role "flex=Silver 1"
        #[arg(long = "role", required = true)]
        roles: Vec<RoleEdit>,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    init_tracing(
        cli.log_level.as_deref().unwrap_or(&config.log_level),
        cli.json_logs,
    );
    tracing::debug!("Starting lane-balancer v{}", env!("CARGO_PKG_VERSION"));

    let storage = config.storage_config();
    let scoring = &config.scoring;
    let store = PlayerStore::new(&storage, config.storage.validity(), scoring.max_chance);
    let source = FileProfileSource::new(storage.profiles_dir());
    let ingestor = Ingestor::new(&store, &source, scoring);

    match cli.command {
        Commands::Rank { value } => match value.trim().parse::<f64>() {
            Ok(score) => println!("{}", decode(score)?),
            Err(_) => println!("{}", encode(&value)?),
        },

        Commands::Score { profile } => {
            let content = std::fs::read_to_string(&profile)
                .with_context(|| format!("Failed to read {:?}", profile))?;
            let raw: RawProfile = serde_json::from_str(&content)?;

            println!("\n=== Rank Score ===");
            match score_profile(&raw, scoring)? {
                RankEstimate::Score {
                    value,
                    season_avg,
                    game_avg,
                } => {
                    let show = |avg: Option<f64>| {
                        avg.map(|v| format!("{:.2}", v))
                            .unwrap_or_else(|| "-".to_string())
                    };
                    println!("Season average:   {}", show(season_avg));
                    println!("Game average:     {}", show(game_avg));
                    println!("Final score:      {:.5}", value);
                    println!("Rank:             {}", decode(value)?);
                }
                RankEstimate::NoData => println!("Not enough ranked data to score"),
            }
        }

        Commands::Player { action } => match action {
            PlayerAction::Show { name } => {
                let player = ingestor.resolve(&name)?;
                print!("{}", player);
            }
            PlayerAction::Fetch { name } => {
                let player = ingestor.acquire(&name)?;
                print!("{}", player);
            }
            PlayerAction::Update { name, roles } => {
                let mut player = match store.load(&name)? {
                    Some(player) => player,
                    None => ingestor.resolve(&name)?,
                };
                player.update_roles(&roles, scoring.max_chance)?;
                store.save(&player, false)?;
                println!("Updated {}", name);
                print!("{}", player);
            }
        },

        Commands::Match { names, seed, save } => {
            let mut players = Vec::with_capacity(names.len());
            for name in &names {
                players.push(
                    ingestor
                        .resolve(name)
                        .with_context(|| format!("Could not resolve {}", name))?,
                );
            }

            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let outcome = TeamMaker::new(rng).make_teams(&players)?;

            println!("\n=== Teams ===");
            println!("{}", outcome);
            if !outcome.displacements.is_empty() {
                println!("\nDisplaced:");
                for (name, count) in &outcome.displacements {
                    println!("  - {} ({}x)", name, count);
                }
            }

            if save {
                let record = MatchRecord::from_outcome(&outcome, Utc::now());
                MatchLog::new(&storage).append(&record)?;
                println!("\nSaved match {}", record.id);
            }
        }

        Commands::History { limit } => {
            if limit == 0 {
                bail!("--limit must be greater than 0");
            }
            let records = MatchLog::new(&storage).recent(limit)?;
            if records.is_empty() {
                println!("No saved matches.");
            }
            for record in records {
                println!(
                    "\n=== {} ({}) ===",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M")
                );
                for lane in &record.lanes {
                    println!(
                        "{:<8} {:<24} {:<24} {:>+7.2}",
                        lane.role.as_str(),
                        lane.team1,
                        lane.team2,
                        record.lane_diffs.display_diff(lane.role)
                    );
                }
                println!("Match diff: {:+.2}", record.match_diff);
            }
        }
    }

    Ok(())
}
