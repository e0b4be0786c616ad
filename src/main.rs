use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use gate_snake::game::{GameConfig, GameEngine};
use gate_snake::leaderboard::{
    format_age, JsonScoreStore, ScoreStore, DEFAULT_TOP_SCORES, MAX_PLAYER_NAME_LEN,
};
use gate_snake::modes::HumanMode;
use log::info;
use simplelog::{Config, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Parser)]
#[command(name = "gate-snake")]
#[command(version, about = "Snake through twelve walled levels, one exit gate at a time")]
struct Cli {
    #[arg(long, value_enum, default_value = "play")]
    mode: Mode,

    /// Game settings as JSON (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Leaderboard file
    #[arg(long, default_value = "gate-snake-scores.json")]
    scores: PathBuf,

    /// Name recorded on the leaderboard
    #[arg(long, default_value = "player")]
    player: String,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    /// Number of leaderboard entries to show
    #[arg(long, default_value_t = DEFAULT_TOP_SCORES)]
    top: usize,

    #[arg(long, default_value = "gate-snake.log")]
    log_file: PathBuf,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play with keyboard controls
    Play,
    /// Print the leaderboard
    Scores,
    /// Remove every leaderboard entry
    ClearScores,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Failed to create log file {:?}", cli.log_file))?;
    WriteLogger::init(LevelFilter::Info, Config::default(), log_file)
        .context("Failed to initialize logger")?;
    info!("Starting gate-snake");

    let mut store = JsonScoreStore::open(&cli.scores)
        .with_context(|| format!("Failed to open leaderboard {:?}", cli.scores))?;

    match cli.mode {
        Mode::Play => {
            let player = cli.player.trim().to_string();
            if player.is_empty() || player.chars().count() > MAX_PLAYER_NAME_LEN {
                bail!("--player must be 1-{} characters", MAX_PLAYER_NAME_LEN);
            }

            let config = match &cli.config {
                Some(path) => GameConfig::load(path)?,
                None => GameConfig::default(),
            };
            let engine = match cli.seed {
                Some(seed) => GameEngine::with_seed(config, seed),
                None => GameEngine::new(config),
            }
            .context("Invalid game configuration")?;

            let mut human_mode = HumanMode::new(engine, Box::new(store), player, cli.top);
            human_mode.run().await?;
        }
        Mode::Scores => print_scores(&store, cli.top)?,
        Mode::ClearScores => {
            store.clear().context("Failed to clear leaderboard")?;
            println!("Leaderboard cleared");
        }
    }

    info!("Exiting");
    Ok(())
}

fn print_scores(store: &dyn ScoreStore, limit: usize) -> Result<()> {
    let top = store.top_scores(limit).context("Failed to read leaderboard")?;
    if top.is_empty() {
        println!("No scores yet");
        return Ok(());
    }

    let now = SystemTime::now();
    println!("{:>4}  {:<20} {:>7} {:>7}  {}", "#", "Player", "Score", "Levels", "When");
    for (rank, entry) in top.iter().enumerate() {
        println!(
            "{:>4}  {:<20} {:>7} {:>7}  {}",
            rank + 1,
            entry.player_name,
            entry.score,
            entry.total_levels_completed,
            format_age(entry.achieved_at_ms, now)
        );
    }
    Ok(())
}
