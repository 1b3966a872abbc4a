//! Shared-instance use from many threads, with reseeds interleaved.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use ccrypto_rng::{CounterPolicy, Csprng, CsprngConfig, DrbgConfig, NeverReseed, SystemEntropy};
use ccrypto_types::HashAlgId;

const GENERATORS: usize = 4;
const RESEEDERS: usize = 2;
const CALLS_PER_THREAD: usize = 10_000;

fn run_shared(rng: Arc<Csprng>, request: usize) {
    let stop = Arc::new(AtomicBool::new(false));

    let reseeders: Vec<_> = (0..RESEEDERS)
        .map(|i| {
            let rng = Arc::clone(&rng);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let mut count = 0u64;
                while !stop.load(Ordering::Relaxed) {
                    if i % 2 == 0 {
                        rng.reseed_via_entropy_source(&count.to_be_bytes()).unwrap();
                    } else {
                        let seed = [count as u8; 32];
                        rng.reseed(&seed, b"reseeder").unwrap();
                    }
                    count += 1;
                    thread::yield_now();
                }
                count
            })
        })
        .collect();

    let generators: Vec<_> = (0..GENERATORS)
        .map(|_| {
            let rng = Arc::clone(&rng);
            thread::spawn(move || {
                (0..CALLS_PER_THREAD)
                    .map(|_| rng.generate_vec(request))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::with_capacity(GENERATORS * CALLS_PER_THREAD);
    for handle in generators {
        for out in handle.join().unwrap() {
            assert_eq!(out.len(), request);
            assert!(seen.insert(out), "duplicate output block");
        }
    }
    stop.store(true, Ordering::Relaxed);
    for handle in reseeders {
        handle.join().unwrap();
    }
    assert_eq!(seen.len(), GENERATORS * CALLS_PER_THREAD);
}

#[test]
fn concurrent_generate_and_reseed_never_repeats() {
    let rng = Csprng::init(
        CsprngConfig::default(),
        Box::new(SystemEntropy),
        Box::new(NeverReseed),
        &[0x42; 32],
        b"concurrency",
        b"",
    )
    .unwrap();
    run_shared(Arc::new(rng), 32);
}

#[test]
fn concurrent_streaming_requests_with_policy_reseeds() {
    let config = CsprngConfig {
        drbg: DrbgConfig::hmac(HashAlgId::Sha256).with_reseed_interval(64),
        cache_size: 16,
        max_request_size: 24,
        ..Default::default()
    };
    let rng = Csprng::init(
        config,
        Box::new(SystemEntropy),
        Box::new(CounterPolicy::new(500)),
        &[0x42; 32],
        b"streaming",
        b"",
    )
    .unwrap();
    // 32-byte requests bypass the 16-byte cache and take two locked steps
    run_shared(Arc::new(rng), 32);
}
