use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use cellwatch_core::{CellId, Measurement, Mode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::SweepSource;

#[derive(Debug, thiserror::Error)]
pub enum MockFeedError {
    #[error("Mutex poisoned: {0}")]
    MutexPoisoned(String),
}

impl<T> From<PoisonError<T>> for MockFeedError {
    fn from(err: PoisonError<T>) -> Self {
        MockFeedError::MutexPoisoned(err.to_string())
    }
}

/// Simulated sensor feed that generates plausible Li-ion cell readings.
///
/// Each cell follows its own random walk: the mode changes now and then,
/// capacity moves with the current, and voltage and temperature track
/// capacity and load.
pub struct MockSource {
    simulation: Mutex<Simulation>,
}

struct Simulation {
    rng: StdRng,
    cells: Vec<SimulatedCell>,
}

/// Persistent physical state of one simulated cell.
#[derive(Debug, Clone, Copy)]
struct SimulatedCell {
    mode: Mode,
    capacity: f64,
    temperature: f64,
}

impl MockSource {
    /// Simulate `cell_count` cells. A seed makes the feed reproducible.
    pub fn new(cell_count: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let cells = (0..cell_count)
            .map(|_| SimulatedCell::new(&mut rng))
            .collect();

        Self {
            simulation: Mutex::new(Simulation { rng, cells }),
        }
    }
}

impl SimulatedCell {
    fn new(rng: &mut impl Rng) -> Self {
        Self {
            mode: Mode::Idle,
            capacity: rng.random_range(60.0..100.0),
            temperature: rng.random_range(22.0..28.0),
        }
    }

    fn step(&mut self, rng: &mut impl Rng) -> Measurement {
        if rng.random_ratio(1, 8) {
            self.mode = Mode::ALL[rng.random_range(0..Mode::ALL.len())];
        }
        // A full cell stops charging and an empty one stops discharging.
        if (self.mode == Mode::Charging && self.capacity >= 100.0)
            || (self.mode == Mode::Discharging && self.capacity <= 5.0)
        {
            self.mode = Mode::Idle;
        }

        let current: f64 = match self.mode {
            Mode::Charging => rng.random_range(0.5..2.0),
            Mode::Discharging => -rng.random_range(0.5..2.0),
            Mode::Idle => rng.random_range(-0.05..0.05),
        };

        self.capacity = (self.capacity + current * 0.8).clamp(0.0, 100.0);

        let ambient = 25.0 + current.abs() * 6.0;
        self.temperature += (ambient - self.temperature) * 0.2 + rng.random_range(-0.3..0.3);

        let voltage =
            3.0 + 1.2 * self.capacity / 100.0 + current * 0.03 + rng.random_range(-0.01..0.01);

        Measurement {
            voltage,
            current,
            temperature: self.temperature,
            capacity: self.capacity,
            mode: self.mode,
        }
    }
}

#[async_trait]
impl SweepSource for MockSource {
    type Error = MockFeedError;

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn capture(&self) -> Result<Vec<(CellId, Measurement)>, Self::Error> {
        let mut simulation = self.simulation.lock()?;
        let Simulation { rng, cells } = &mut *simulation;

        Ok(cells
            .iter_mut()
            .zip(1u8..)
            .map(|(cell, id)| (CellId(id), cell.step(&mut *rng)))
            .collect())
    }
}
