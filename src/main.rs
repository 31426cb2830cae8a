use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use gym_2048::dataset::TrainingData;
use gym_2048::engine::{Score, Tile};
use gym_2048::env::Game2048Env;
use indicatif::{ProgressBar, ProgressStyle};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "collect",
    version,
    about = "Play random 2048 episodes in parallel and package them as training data"
)]
struct Args {
    /// Number of independent episodes
    #[arg(short = 'n', long, default_value_t = 64)]
    episodes: u64,
    /// Base seed; episode i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Stop each episode after this many moves
    #[arg(long)]
    max_steps: Option<u64>,
    /// Record the per-move score as a reward
    #[arg(long)]
    rewards: bool,
    /// Expand every sample into its 8 symmetric variants
    #[arg(long)]
    augment: bool,
    /// Fraction of samples kept for training; the rest form the validation slice
    #[arg(long, default_value_t = 0.9)]
    train_fraction: f64,
    /// Worker threads (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,
    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

struct Episode {
    data: TrainingData,
    score: Score,
    highest_tile: Tile,
    moves: u64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .context("configuring worker threads")?;
    }

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.episodes);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} episodes ({eta})",
            )
            .context("progress bar template")?
            .progress_chars("=>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let start = Instant::now();
    // Each worker owns its env and dataset fragment; fragments meet only after the collect.
    let episodes: Vec<Episode> = (0..args.episodes)
        .into_par_iter()
        .map(|i| {
            let ep = run_episode(args.seed.wrapping_add(i), args.max_steps, args.rewards);
            pb.inc(1);
            ep
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let total_moves: u64 = episodes.iter().map(|e| e.moves).sum();
    let best_score = episodes.iter().map(|e| e.score).max().unwrap_or(0);
    let best_tile = episodes.iter().map(|e| e.highest_tile).max().unwrap_or(0);

    let mut data = TrainingData::merge_all(episodes.into_iter().map(|e| e.data))?;
    if args.augment {
        data.augment();
    }
    let train_len = data.split_index(args.train_fraction)?;

    let elapsed = start.elapsed().as_secs_f64().max(1e-6);
    println!(
        "episodes: {} | moves: {} | moves/sec: {:.1} | best score: {} | best tile: {}",
        args.episodes,
        total_moves,
        total_moves as f64 / elapsed,
        best_score,
        best_tile
    );
    println!("samples: {} | train: {} | validation: {}", data.len(), train_len, data.len() - train_len);
    Ok(())
}

/// Play one episode, picking uniformly among legal moves, and record every transition.
fn run_episode(seed: u64, max_steps: Option<u64>, with_rewards: bool) -> anyhow::Result<Episode> {
    let mut env = Game2048Env::seeded(seed);
    let mut driver = StdRng::seed_from_u64(seed.rotate_left(32));
    let mut data = TrainingData::new();
    let mut moves = 0u64;

    loop {
        let legal = env.game().legal_moves();
        let Some(&dir) = legal.choose(&mut driver) else { break };
        let board = env.game().board();
        let step = env.step_move(dir)?;
        data.add(board, dir, with_rewards.then_some(step.reward))?;
        moves += 1;
        if step.done || max_steps.is_some_and(|limit| moves >= limit) {
            break;
        }
    }

    Ok(Episode { data, score: env.game().score(), highest_tile: env.game().highest_tile(), moves })
}
