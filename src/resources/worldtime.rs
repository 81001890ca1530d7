//! Simulation clock.
//!
//! The driver supplies every tick's delta in milliseconds; nothing in the
//! simulation reads the wall clock.
use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Scaled seconds since the level started.
    pub elapsed: f32,
    /// Scaled seconds covered by the current tick.
    pub delta: f32,
    /// Scaled milliseconds covered by the current tick, for the animation clock.
    pub delta_ms: u32,
    pub time_scale: f32,
    pub ticks: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            delta_ms: 0,
            time_scale: 1.0,
            ticks: 0,
        }
    }
}

impl WorldTime {
    /// Move the clock forward by `dt_ms` unscaled milliseconds.
    pub fn advance(&mut self, dt_ms: u32) {
        let scaled_ms = (dt_ms as f32 * self.time_scale).max(0.0);
        self.delta_ms = scaled_ms.round() as u32;
        self.delta = self.delta_ms as f32 / 1000.0;
        self.elapsed += self.delta;
        self.ticks += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_advance_accumulates() {
        let mut time = WorldTime::default();
        time.advance(16);
        time.advance(16);
        assert_eq!(time.delta_ms, 16);
        assert!(approx_eq(time.delta, 0.016));
        assert!(approx_eq(time.elapsed, 0.032));
        assert_eq!(time.ticks, 2);
    }

    #[test]
    fn test_time_scale_applies_to_delta() {
        let mut time = WorldTime {
            time_scale: 0.5,
            ..Default::default()
        };
        time.advance(20);
        assert_eq!(time.delta_ms, 10);
        assert!(approx_eq(time.delta, 0.01));
    }
}
