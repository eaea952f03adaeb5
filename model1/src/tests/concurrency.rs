use std::sync::Arc;
use std::thread;

use crate::feature::FeatureFunction;
use crate::symbol::SymbolPool;

use super::end_to_end::{PAIRS, load_features, parse_pair, setup};

const NUM_THREADS: usize = 8;
const NUM_ROUNDS: usize = 50;

fn assert_send_sync<T: Send + Sync + ?Sized>() {}

#[test]
fn test_feature_is_send_sync() {
    assert_send_sync::<dyn FeatureFunction>();
    assert_send_sync::<crate::feature::model1::Model1Feature>();
    assert_send_sync::<SymbolPool>();
}

#[test]
fn test_concurrent_scoring_matches_sequential() {
    let dir = setup();
    let pool = Arc::new(SymbolPool::new());
    let features = load_features(dir.path(), &pool);

    let expected: Vec<u32> = PAIRS
        .lines()
        .map(|line| {
            let (source, target) = parse_pair(&pool, line);
            features[0].score(&source, &target).unwrap().to_bits()
        })
        .collect();

    thread::scope(|s| {
        for _ in 0..NUM_THREADS {
            s.spawn(|| {
                for _ in 0..NUM_ROUNDS {
                    for (line, &bits) in PAIRS.lines().zip(&expected) {
                        // Parsing interns concurrently with the other threads.
                        let (source, target) = parse_pair(&pool, line);
                        let score = features[0].score(&source, &target).unwrap();
                        assert_eq!(score.to_bits(), bits, "{line}");
                    }
                }
            });
        }
    });
}

#[test]
fn test_unseen_words_interned_concurrently() {
    let dir = setup();
    let pool = Arc::new(SymbolPool::new());
    let features = load_features(dir.path(), &pool);
    parse_pair(&pool, "chat ||| cat");
    let before = pool.len();

    let (pool, features) = (&pool, &features);
    let scores: Vec<Vec<u32>> = thread::scope(|s| {
        let handles: Vec<_> = (0..NUM_THREADS)
            .map(|_| {
                s.spawn(move || {
                    (0..20)
                        .map(|i| {
                            let line = format!("unseen{i} chat ||| cat unseen{i}");
                            let (source, target) = parse_pair(pool, &line);
                            features[0].score(&source, &target).unwrap().to_bits()
                        })
                        .collect::<Vec<u32>>()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(scores.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(pool.len(), before + 20);
}
