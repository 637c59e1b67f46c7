#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickContext {
    pub tick: u64,
    pub dt_seconds: f32,
    /// Simulation time at the start of this tick, in seconds.
    pub time_seconds: f64,
}

impl TickContext {
    pub fn new(tick: u64, dt_seconds: f32, time_seconds: f64) -> Self {
        Self {
            tick,
            dt_seconds,
            time_seconds,
        }
    }

    /// Context for the following tick with the same `dt`.
    pub fn next(&self) -> Self {
        Self {
            tick: self.tick + 1,
            dt_seconds: self.dt_seconds,
            time_seconds: self.time_seconds + self.dt_seconds as f64,
        }
    }
}

impl Default for TickContext {
    fn default() -> Self {
        Self::new(0, 1.0 / 30.0, 0.0)
    }
}
