use anyhow::Result;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::CursorPosition;

/// Something that can report where the cursor is right now.
pub trait CursorSource: Send + 'static {
    fn position(&mut self) -> Result<CursorPosition>;
}

const SIM_WIDTH: f64 = 1440.0;
const SIM_HEIGHT: f64 = 900.0;
const SIM_MAX_STEP: f64 = 12.0;
const SIM_IDLE_PROBABILITY: f64 = 0.2;
const SIM_MAX_TURN_RADIANS: f64 = 0.6;

/// Random-walk cursor for machines without a capturable pointer.
///
/// The walk keeps a heading that drifts a little each sample, sometimes
/// holds still, and bounces off the edges of a 1440x900 screen.
pub struct SimulatedCursor {
    rng: StdRng,
    position: CursorPosition,
    heading: f64,
}

impl SimulatedCursor {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let heading = rng.gen_range(0.0..std::f64::consts::TAU);
        Self {
            rng,
            position: CursorPosition {
                x: SIM_WIDTH / 2.0,
                y: SIM_HEIGHT / 2.0,
            },
            heading,
        }
    }
}

impl Default for SimulatedCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorSource for SimulatedCursor {
    fn position(&mut self) -> Result<CursorPosition> {
        if self.rng.gen_bool(SIM_IDLE_PROBABILITY) {
            return Ok(self.position);
        }

        self.heading += self
            .rng
            .gen_range(-SIM_MAX_TURN_RADIANS..=SIM_MAX_TURN_RADIANS);
        let step = self.rng.gen_range(1.0..=SIM_MAX_STEP);

        let mut x = self.position.x + step * self.heading.cos();
        let mut y = self.position.y + step * self.heading.sin();

        if !(0.0..=SIM_WIDTH).contains(&x) {
            self.heading = std::f64::consts::PI - self.heading;
            x = x.clamp(0.0, SIM_WIDTH);
        }
        if !(0.0..=SIM_HEIGHT).contains(&y) {
            self.heading = -self.heading;
            y = y.clamp(0.0, SIM_HEIGHT);
        }

        self.position = CursorPosition { x, y };
        Ok(self.position)
    }
}
