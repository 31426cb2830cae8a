use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gym_2048::dataset::TrainingData;
use gym_2048::engine::Move;
use gym_2048::game::Game;
use std::hint::black_box;

/// Samples recorded from a few short deterministic episodes.
fn recorded(with_rewards: bool) -> TrainingData {
    let mut data = TrainingData::new();
    for seed in 0..8 {
        let mut game = Game::seeded(seed);
        for i in 0..64 {
            let dir = Move::ALL[i % 4];
            let board = game.board();
            if let Ok(score) = game.make_move(dir) {
                let _ = data.add(board, dir, with_rewards.then_some(score));
                let _ = game.spawn_tile();
            }
            if game.is_terminal() {
                break;
            }
        }
    }
    data
}

fn bench_augment(c: &mut Criterion) {
    let base = recorded(true);
    c.bench_function("dataset/augment", |bch| {
        bch.iter_batched(
            || base.clone(),
            |mut td| {
                td.augment();
                black_box(td.len())
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("dataset/rotate_hflip", |bch| {
        bch.iter_batched(
            || base.clone(),
            |mut td| {
                td.rotate(1);
                td.hflip();
                black_box(td.len())
            },
            BatchSize::SmallInput,
        )
    });
    let plain = recorded(false);
    c.bench_function("dataset/merge_split", |bch| {
        bch.iter_batched(
            || (plain.clone(), plain.clone()),
            |(mut a, b)| {
                let n = a.len();
                a.merge(&b).unwrap();
                black_box(a.split_at(n).unwrap())
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(augment, bench_augment);
criterion_main!(augment);
