use std::ops::RangeInclusive;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::entities::vitals::VitalReading;

pub const HEART_RATE_RANGE: RangeInclusive<u16> = 60..=140;
pub const SPO2_RANGE: RangeInclusive<u16> = 85..=100;
pub const BP_SYS_RANGE: RangeInclusive<u16> = 100..=180;
pub const BP_DIA_RANGE: RangeInclusive<u16> = 60..=120;

/// Anything that can produce the next reading of a session
pub trait ReadingSource: Send + Sync {
    fn generate(&self) -> VitalReading;
}

/// Synthetic vitals: every field drawn independently and uniformly from its range.
/// No correlation between fields is modeled.
#[derive(Debug)]
pub struct VitalGenerator {
    rng: Mutex<StdRng>,
}

impl Default for VitalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalGenerator {
    /// Generator seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl ReadingSource for VitalGenerator {
    fn generate(&self) -> VitalReading {
        // a poisoned lock still holds a usable rng
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        VitalReading {
            heart_rate: rng.gen_range(HEART_RATE_RANGE),
            spo2: rng.gen_range(SPO2_RANGE),
            bp_sys: rng.gen_range(BP_SYS_RANGE),
            bp_dia: rng.gen_range(BP_DIA_RANGE),
        }
    }
}
