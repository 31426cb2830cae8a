use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use gym_2048::engine::{Board, Move};
use gym_2048::game::Game;
use rand::{rngs::StdRng, SeedableRng};
use std::hint::black_box;

fn corpus() -> Vec<Board> {
    let mut rng = StdRng::seed_from_u64(42);
    let mut boards = vec![Board::EMPTY];
    let mut b = Board::EMPTY;
    for _ in 0..2 {
        b = b.with_random_tile(&mut rng, 0.2).map(|(nb, _)| nb).unwrap_or(b);
    }
    boards.push(b);
    // Derive a variety of densities deterministically
    for i in 0..20 {
        let dir = Move::ALL[i % 4];
        if let Ok((nb, _)) = b.try_shift(dir) {
            b = nb.with_random_tile(&mut rng, 0.2).map(|(nb, _)| nb).unwrap_or(nb);
        }
        boards.push(b);
    }
    boards
}

fn bench_shift(c: &mut Criterion) {
    for dir in Move::ALL {
        c.bench_function(&format!("shift/{dir:?}").to_lowercase(), |bch| {
            let boards = corpus();
            bch.iter(|| {
                let mut acc = 0u64;
                for &bd in &boards {
                    acc = acc.wrapping_add(bd.shift(dir).map_or(0, |(_, s)| s));
                }
                black_box(acc)
            })
        });
    }
}

fn bench_spawn_and_play(c: &mut Criterion) {
    c.bench_function("board/with_random_tile", |bch| {
        bch.iter_batched(
            || (Board::EMPTY, StdRng::seed_from_u64(7)),
            |(mut bd, mut rng)| {
                for _ in 0..16 {
                    bd = bd.with_random_tile(&mut rng, 0.2).map(|(nb, _)| nb).unwrap_or(bd);
                }
                black_box(bd)
            },
            BatchSize::SmallInput,
        )
    });
    c.bench_function("game/episode_cycle_moves", |bch| {
        bch.iter_batched(
            || Game::seeded(9),
            |mut game| {
                let mut i = 0;
                while !game.is_terminal() && i < 256 {
                    if game.make_move(Move::ALL[i % 4]).is_ok() {
                        let _ = game.spawn_tile();
                    }
                    i += 1;
                }
                black_box(game.score())
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_queries(c: &mut Criterion) {
    c.bench_function("query/is_game_over", |bch| {
        let boards = corpus();
        bch.iter(|| boards.iter().filter(|b| b.is_game_over()).count())
    });
    c.bench_function("query/count_empty", |bch| {
        let boards = corpus();
        bch.iter(|| boards.iter().map(|b| b.count_empty()).sum::<usize>())
    });
    c.bench_function("query/highest_tile", |bch| {
        let boards = corpus();
        bch.iter(|| boards.iter().map(|b| b.highest_tile()).max())
    });
}

criterion_group!(engine_ops, bench_shift, bench_spawn_and_play, bench_queries);
criterion_main!(engine_ops);
