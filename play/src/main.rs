mod human;

use crate::human::Human;
use chrono::prelude::*;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use turnplay::prelude::*;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GameArg {
    CoinFlip,
    CartPole,
}

#[derive(Debug, Parser)]
#[command(name = "play", about = "Pit scripted, human and learning players against each other")]
struct Args {
    #[arg(long, value_enum, default_value = "coin-flip")]
    game: GameArg,

    /// Comma separated: adaptive, random, fixed:<action>, human.
    #[arg(long, value_delimiter = ',', default_value = "adaptive,random")]
    players: Vec<String>,

    /// Number of games; players keep what they learned from one game to the next.
    #[arg(long, default_value_t = 100)]
    games: usize,

    #[arg(long, default_value_t = 200)]
    max_turns: usize,

    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON file with game and adaptive player settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Adaptive networks are written to <save-dir>/<game>/<timestamp>/.
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Network snapshots of every decision, one JSON object per line.
    #[arg(long)]
    telemetry: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct PlayConfig {
    adaptive: AdaptiveConfig,
    coin_flip: CoinFlip,
    cart_pole: CartPole,
}

type Sink = Rc<RefCell<JsonLines<BufWriter<File>>>>;

fn train_dir(root: &Path, tag: &str) -> PathBuf {
    let time = Local::now().format("%m-%d-%YT%H-%M-%SZ").to_string();
    root.join(tag).join(time)
}

fn make_player(
    index: usize,
    spec: &str,
    cfg: &PlayConfig,
    seed: u64,
    sink: &Option<Sink>,
) -> Result<Box<dyn Player>, GameError> {
    let rng = StdRng::seed_from_u64(seed.wrapping_add(1000 + index as u64));
    let (kind, arg) = match spec.split_once(':') {
        Some((kind, arg)) => (kind, Some(arg)),
        None => (spec, None),
    };
    let id = format!("{}{}", kind, index + 1);
    let player: Box<dyn Player> = match (kind, arg) {
        ("adaptive", None) => {
            let player = AdaptivePlayer::new(&id, cfg.adaptive, rng);
            match sink {
                Some(sink) => Box::new(player.with_telemetry(Box::new(sink.clone()))),
                None => Box::new(player),
            }
        }
        ("random", None) => Box::new(RandomPlayer::new(&id, rng)),
        ("fixed", Some(action)) => Box::new(FixedPlayer::new(&id, action)),
        ("human", None) => Box::new(Human::stdio(&id)),
        _ => {
            return Err(GameError::Configuration(format!(
                "unknown player {:?}, expected adaptive, random, fixed:<action> or human",
                spec
            )))
        }
    };
    Ok(player)
}

fn play<G: Game + Clone>(
    game: G,
    args: &Args,
    mut players: Vec<Box<dyn Player>>,
) -> Result<Vec<Box<dyn Player>>, GameError> {
    let mut totals = vec![0.0; players.len()];
    let bar = ProgressBar::new(args.games as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40}] {percent}% {pos}/{len} {per_sec} {elapsed_precise}")
            .progress_chars("|| "),
    );

    for g in 0..args.games {
        let rng = StdRng::seed_from_u64(args.seed.wrapping_add(g as u64));
        let mut engine = Engine::new(game.clone(), rng);
        engine.initialize(players)?;
        let scores = engine.run_game(args.max_turns)?;
        for (total, (_, score)) in totals.iter_mut().zip(scores.iter()) {
            *total += score;
        }
        info!("game {} finished after {} turns: {:?}", g + 1, engine.turn(), scores);
        players = engine.into_players();
        bar.inc(1);
    }
    bar.finish();

    for (player, total) in players.iter().zip(totals.iter()) {
        println!(
            "{}: {:.2} average over {} games",
            player.id(),
            total / args.games.max(1) as f32,
            args.games
        );
    }
    Ok(players)
}

fn save_networks(
    root: &Path,
    tag: &str,
    cfg: &PlayConfig,
    players: &[Box<dyn Player>],
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = train_dir(root, tag);
    std::fs::create_dir_all(&dir)?;
    serde_json::to_writer_pretty(File::create(dir.join("cfg.json"))?, cfg)?;
    for player in players.iter() {
        if let Some(network) = player.learned() {
            let path = dir.join(format!("{}.json", player.id()));
            network.save(&path)?;
            info!("saved {} to {}", player.id(), path.display());
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let cfg: PlayConfig = match &args.config {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => PlayConfig::default(),
    };

    let sink: Option<Sink> = match &args.telemetry {
        Some(path) => Some(Rc::new(RefCell::new(JsonLines::new(BufWriter::new(
            File::create(path)?,
        ))))),
        None => None,
    };

    let players = args
        .players
        .iter()
        .enumerate()
        .map(|(i, spec)| make_player(i, spec.trim(), &cfg, args.seed, &sink))
        .collect::<Result<Vec<_>, _>>()?;

    let (tag, players) = match args.game {
        GameArg::CoinFlip => (CoinFlip::NAME, play(cfg.coin_flip, &args, players)?),
        GameArg::CartPole => (CartPole::NAME, play(cfg.cart_pole, &args, players)?),
    };

    if let Some(sink) = &sink {
        let dropped = sink.borrow().dropped();
        if dropped > 0 {
            warn!("{} network snapshots could not be written", dropped);
        }
    }

    if let Some(root) = &args.save_dir {
        save_networks(root, tag, &cfg, &players)?;
    }
    Ok(())
}
