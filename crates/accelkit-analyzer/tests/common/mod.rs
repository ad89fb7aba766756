//! Synthetic inputs shared by the integration tests.

#![allow(dead_code)]

use accelkit_analyzer::{Calibration, Digi, Input};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Random hits over `modules` modules with runs of adjacent channels.
pub fn synthetic_input(seed: u64, modules: u32, hits: usize) -> Input {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut digis = Vec::with_capacity(hits);
    while digis.len() < hits {
        let module = rng.gen_range(0..modules);
        let first = rng.gen_range(0..512u32);
        let run = rng.gen_range(1..6u32);
        for channel in first..first + run {
            if digis.len() == hits {
                break;
            }
            digis.push(Digi::new(module, channel, rng.gen_range(0..1024u16)));
        }
    }
    let gains = (0..modules).map(|_| rng.gen_range(0.5f32..2.0)).collect();
    Input::new(digis, Calibration::new(gains, 40.0))
}

/// Small hand-checked input: three clusters over two modules.
pub fn known_input() -> Input {
    Input::new(
        vec![
            Digi::new(1, 4, 7),
            Digi::new(0, 3, 30),
            Digi::new(0, 1, 10),
            Digi::new(0, 7, 5),
            Digi::new(0, 2, 20),
            Digi::new(1, 3, 0),
        ],
        Calibration::uniform(2, 1.0, 0.0),
    )
}
