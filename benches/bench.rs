// Criterion benchmarks for Lume Relations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lume_relations::core::{
    filters::{filter_candidates, CompatibilityPolicy},
    order_history,
    state::{plan_like, PairSnapshot},
};
use lume_relations::models::{Gender, Message, PairKey, Preference, User, UserId};
use chrono::{Duration, Utc};
use std::collections::HashSet;

fn create_candidate(id: usize) -> User {
    User {
        id: id as UserId,
        name: format!("User {}", id),
        is_active: id % 17 != 0,
        is_banned: id % 23 == 0,
        is_staff: false,
        gender: match id % 3 {
            0 => Gender::Male,
            1 => Gender::Female,
            _ => Gender::Other,
        },
        age: 18 + (id % 30) as u8,
        description: String::new(),
        avatar: "neutral.png".to_string(),
        preference: Preference {
            genders: vec![],
            age_from: Some(18),
            age_to: Some(40 + (id % 20) as u8),
            criteria: vec![],
        },
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn create_viewer() -> User {
    let mut viewer = create_candidate(0);
    viewer.id = -1;
    viewer.is_active = true;
    viewer.is_banned = false;
    viewer.age = 30;
    viewer.preference = Preference {
        genders: vec![Gender::Female, Gender::Other],
        age_from: Some(21),
        age_to: Some(35),
        criteria: vec![],
    };
    viewer
}

fn bench_candidates(c: &mut Criterion) {
    let viewer = create_viewer();
    let mut group = c.benchmark_group("candidates");

    for pool_size in [10, 100, 1000, 10000].iter() {
        let pool: Vec<User> = (1..=*pool_size).map(create_candidate).collect();
        let liked: HashSet<UserId> = (1..=*pool_size as UserId).step_by(7).collect();

        for policy in [CompatibilityPolicy::Symmetric, CompatibilityPolicy::OneWay] {
            group.bench_with_input(
                BenchmarkId::new(format!("filter_{:?}", policy), pool_size),
                pool_size,
                |b, _| {
                    b.iter(|| {
                        filter_candidates(
                            black_box(&viewer),
                            black_box(pool.clone()),
                            black_box(&liked),
                            policy,
                        )
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_plan_like(c: &mut Criterion) {
    let key = PairKey::new(1, 2).unwrap();
    let mut snapshot = PairSnapshot::empty(key);
    snapshot.high_likes_low = true;

    c.bench_function("plan_like_reciprocal", |b| {
        b.iter(|| plan_like(black_box(&snapshot), black_box(1), black_box(2)))
    });
}

fn bench_history_order(c: &mut Criterion) {
    let start = Utc::now();
    let messages: Vec<Message> = (0..1000)
        .map(|i| Message {
            id: 1000 - i,
            match_id: 1,
            sender_id: i % 2,
            content: format!("message {}", i),
            created_at: start + Duration::milliseconds((i * 7919) % 1000),
        })
        .collect();

    c.bench_function("order_history_1000_messages", |b| {
        b.iter(|| order_history(black_box(messages.clone())))
    });
}

criterion_group!(benches, bench_candidates, bench_plan_like, bench_history_order);

criterion_main!(benches);
