//! Simple random number generator for reproducible initialization.
//!
//! A lightweight xorshift PRNG with a Box-Muller gaussian sampler, enough to draw
//! He-initialized weight matrices without pulling in an RNG crate.

use std::f64::consts::PI;

/// Xorshift generator; the same seed always yields the same sequence.
pub struct SimpleRng {
    state: u64,
    spare_normal: Option<f64>,
}

impl SimpleRng {
    /// Create a new RNG with explicit seed (if zero, use a fixed value).
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self {
            state,
            spare_normal: None,
        }
    }

    /// Basic xorshift step.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform sample in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        // 53 high bits fill the f64 mantissa exactly.
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Standard normal sample (Box-Muller, caching the second value).
    pub fn next_normal(&mut self) -> f64 {
        if let Some(z) = self.spare_normal.take() {
            return z;
        }
        // u1 in (0, 1] so ln(u1) is finite.
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;
        self.spare_normal = Some(radius * theta.sin());
        radius * theta.cos()
    }
}
