#![allow(dead_code)]

use std::hint::black_box;

use criterion::Criterion;
use elastic_swap_math::{
    I256, PoolSnapshot, SwapParams, SwapSide, U256,
    math::{
        full_math::{mul_div_ceiling, mul_div_floor},
        quad_math::get_smaller_root_of_quad_eqn,
        swap_math::compute_swap_step,
        tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio},
    },
};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .try_init();
}

/// Pool at price 1.0 with `positions` stacked ranges of 120 ticks on each
/// side, so larger trades cross more ticks.
pub fn layered_pool(positions: i32) -> PoolSnapshot {
    let mut pool = PoolSnapshot::new(50, get_sqrt_ratio_at_tick(0).unwrap()).unwrap();
    for i in 1..=positions {
        pool.add_position(-120 * i, 120 * i, 1_000_000_000_000_000)
            .unwrap();
    }
    pool.block_timestamp = 1;
    pool
}

pub fn bench_tick_math(c: &mut Criterion) {
    let ticks: Vec<i32> = (-887_000..=887_000).step_by(9_973).collect();
    c.bench_function("get_sqrt_ratio_at_tick", |b| {
        b.iter(|| {
            for &tick in &ticks {
                black_box(get_sqrt_ratio_at_tick(black_box(tick)).unwrap());
            }
        })
    });

    let prices: Vec<U256> = ticks
        .iter()
        .map(|&tick| get_sqrt_ratio_at_tick(tick).unwrap())
        .collect();
    c.bench_function("get_tick_at_sqrt_ratio", |b| {
        b.iter(|| {
            for &price in &prices {
                black_box(get_tick_at_sqrt_ratio(black_box(price)).unwrap());
            }
        })
    });
}

pub fn bench_full_math(c: &mut Criterion) {
    let a = U256::from(1_000_000_000_000_000_000u128) << 96usize;
    let b = get_sqrt_ratio_at_tick(12_345).unwrap();
    let d = get_sqrt_ratio_at_tick(-6_789).unwrap();
    c.bench_function("mul_div_floor", |bench| {
        bench.iter(|| black_box(mul_div_floor(black_box(a), black_box(b), black_box(d)).unwrap()))
    });
    c.bench_function("mul_div_ceiling", |bench| {
        bench.iter(|| {
            black_box(mul_div_ceiling(black_box(a), black_box(b), black_box(d)).unwrap())
        })
    });
    c.bench_function("get_smaller_root_of_quad_eqn", |bench| {
        bench.iter(|| {
            black_box(
                get_smaller_root_of_quad_eqn(
                    black_box(U256::from(50u8)),
                    black_box(U256::from(99_950_000_000_000_000_000u128)),
                    black_box(U256::from(5_000_000_000_000_000_000u128)),
                )
                .unwrap(),
            )
        })
    });
}

pub fn bench_swap_math(c: &mut Criterion) {
    let liquidity = U256::from(1_000_000_000_000_000_000u128);
    let current = get_sqrt_ratio_at_tick(0).unwrap();
    let down = get_sqrt_ratio_at_tick(-480).unwrap();
    let up = get_sqrt_ratio_at_tick(480).unwrap();
    let fee = U256::from(50u8);
    let amount = I256::from_raw(U256::from(1_000_000_000_000_000u128));

    c.bench_function("compute_swap_step_exact_in", |b| {
        b.iter(|| {
            black_box(
                compute_swap_step(
                    black_box(liquidity),
                    black_box(current),
                    black_box(down),
                    fee,
                    black_box(amount),
                    true,
                    true,
                )
                .unwrap(),
            )
        })
    });
    c.bench_function("compute_swap_step_exact_out", |b| {
        b.iter(|| {
            black_box(
                compute_swap_step(
                    black_box(liquidity),
                    black_box(current),
                    black_box(up),
                    fee,
                    black_box(-amount),
                    false,
                    true,
                )
                .unwrap(),
            )
        })
    });
}

pub fn bench_query_outputs(c: &mut Criterion) {
    let pool = layered_pool(20);
    let amounts: Vec<U256> = (0..=20u128)
        .map(|i| U256::from(i * 50_000_000_000_000))
        .collect();

    let mut group = c.benchmark_group("query_outputs");
    for side in [SwapSide::Sell, SwapSide::Buy] {
        group.bench_function(format!("{side:?}_21_amounts"), |b| {
            b.iter(|| black_box(pool.query_outputs(black_box(&amounts), true, side).unwrap()))
        });
    }
    group.finish();
}

pub fn bench_single_swaps(c: &mut Criterion) {
    let pool = layered_pool(20);
    let amounts: Vec<I256> = (1..=20u128)
        .map(|i| I256::from_raw(U256::from(i * 50_000_000_000_000)))
        .collect();

    // the cost a batch saves: one fresh swap per amount
    c.bench_function("swap_20_independent", |b| {
        b.iter(|| {
            for &amount in &amounts {
                black_box(
                    pool.swap(SwapParams::with_default_limit(true, black_box(amount)))
                        .unwrap(),
                );
            }
        })
    });
}
