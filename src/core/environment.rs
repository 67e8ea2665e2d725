// The external world the schema repertoire acts on.
//
// Owns the four tracked positions, the neck travel limit, a per-instance
// PRNG, and the derived population-code vector. Every schema effect that
// mutates a position calls `compute_population_codes()` before returning,
// so downstream readers never observe a stale vector.

use crate::position::Pos;
use crate::prng::Prng;
use thiserror::Error;

/// Upper bound of the coded coordinate range (also the lesion clamp bound).
pub const X_MAX: i32 = 30;

/// Lowest mouth height the neck can reach.
pub const NECK_FLOOR: i32 = 3;

/// Scalars tracked by the population code: food/mouth/paw, x and y each.
pub const CODED_SCALARS: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("v_max must exceed the neck floor ({NECK_FLOOR}), got {0}")]
    VMaxTooLow(i32),
    #[error("tube must lie in [0, {X_MAX}] with height in (0, {X_MAX}], got ({0}, {1})")]
    TubeOutOfRange(i32, i32),
    #[error("population code needs at least 2 units per scalar, got {0}")]
    CodeTooSmall(usize),
}

#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvironmentConfig {
    /// Fixed position of the tube; `tube.y` is the in-tube height level.
    pub tube: Pos,
    /// Upper bound on mouth height.
    pub v_max: i32,
    /// Gaussian units per coded scalar.
    pub code_size: usize,
    pub seed: u64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            tube: Pos::new(20, 3),
            v_max: 10,
            code_size: 10,
            seed: 0x6772_7370,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Environment {
    pub food: Pos,
    pub mouth: Pos,
    pub paw: Pos,
    pub tube: Pos,
    pub v_max: i32,

    centers: Vec<f32>,
    sigma: f32,
    codes: Vec<f32>,

    pub(crate) rng: Prng,
}

impl Environment {
    pub fn new(cfg: EnvironmentConfig) -> Result<Self, ConfigError> {
        if cfg.v_max <= NECK_FLOOR {
            return Err(ConfigError::VMaxTooLow(cfg.v_max));
        }
        if cfg.tube.x < 0 || cfg.tube.x > X_MAX || cfg.tube.y <= 0 || cfg.tube.y > X_MAX {
            return Err(ConfigError::TubeOutOfRange(cfg.tube.x, cfg.tube.y));
        }
        if cfg.code_size < 2 {
            return Err(ConfigError::CodeTooSmall(cfg.code_size));
        }

        let k = cfg.code_size;
        let denom = (k - 1) as f32;
        let centers: Vec<f32> = (0..k)
            .map(|i| (X_MAX as f32) * (i as f32) / denom)
            .collect();
        let sigma = (X_MAX as f32) / denom;

        let mut env = Self {
            food: Pos::new(0, 0),
            mouth: Pos::new(0, NECK_FLOOR),
            paw: Pos::new(0, 0),
            tube: cfg.tube,
            v_max: cfg.v_max,
            centers,
            sigma,
            codes: vec![0.0; CODED_SCALARS * k],
            rng: Prng::new(cfg.seed),
        };
        env.reset();
        Ok(env)
    }

    /// Canonical episode start: food inside the tube, paw at the body,
    /// mouth at the neck floor.
    pub fn reset(&mut self) {
        self.food = self.tube + (1, 0);
        self.paw = Pos::new(1, 0);
        self.mouth = Pos::new(0, NECK_FLOOR);
        self.compute_population_codes();
    }

    /// Randomized start for decorrelated single-step sampling. The food is
    /// either somewhere on the floor or inside the tube at tube height.
    pub fn reset_random(&mut self) {
        self.mouth = Pos::new(0, self.rng.gen_range_i32(NECK_FLOOR, self.v_max + 1));
        self.paw = Pos::new(
            self.rng.gen_range_i32(0, X_MAX + 1),
            self.rng.gen_range_i32(0, 5),
        );
        self.food = if self.rng.next_u32() & 1 == 0 {
            Pos::new(self.rng.gen_range_i32(0, X_MAX + 1), 0)
        } else {
            Pos::new(self.rng.gen_range_i32(self.tube.x, X_MAX + 1), self.tube.y)
        };
        self.compute_population_codes();
    }

    /// Rebuild the derived representation from the current positions.
    ///
    /// Idempotent; called by every mutating schema effect.
    pub fn compute_population_codes(&mut self) {
        let scalars = [
            self.food.x,
            self.food.y,
            self.mouth.x,
            self.mouth.y,
            self.paw.x,
            self.paw.y,
        ];
        let k = self.centers.len();
        for (i, &v) in scalars.iter().enumerate() {
            axis_activations(
                v as f32,
                &self.centers,
                self.sigma,
                &mut self.codes[i * k..(i + 1) * k],
            );
        }
    }

    /// The concatenated population-code vector, `CODED_SCALARS * code_size`
    /// long, in sync with the positions.
    pub fn population_codes(&self) -> &[f32] {
        &self.codes
    }

    pub fn code_len(&self) -> usize {
        self.codes.len()
    }
}

fn axis_activations(v: f32, centers: &[f32], sigma: f32, out: &mut [f32]) {
    let v = v.clamp(0.0, X_MAX as f32);
    let inv_2s2 = 1.0 / (2.0 * sigma * sigma + 1e-9);

    let mut sum = 0.0f32;
    for (slot, &c) in out.iter_mut().zip(centers) {
        let d = v - c;
        let a = (-d * d * inv_2s2).exp();
        *slot = a;
        sum += a;
    }

    // Per-axis normalization to keep code energy stable.
    if sum > 1e-9 {
        let inv = 1.0 / sum;
        for a in out.iter_mut() {
            *a = (*a * inv).clamp(0.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Environment {
        Environment::new(EnvironmentConfig::default()).unwrap()
    }

    #[test]
    fn rejects_bad_configs() {
        let bad = EnvironmentConfig {
            v_max: 3,
            ..Default::default()
        };
        assert!(matches!(
            Environment::new(bad),
            Err(ConfigError::VMaxTooLow(3))
        ));

        let bad = EnvironmentConfig {
            tube: Pos::new(40, 3),
            ..Default::default()
        };
        assert!(matches!(
            Environment::new(bad),
            Err(ConfigError::TubeOutOfRange(40, 3))
        ));

        let bad = EnvironmentConfig {
            code_size: 1,
            ..Default::default()
        };
        assert!(matches!(
            Environment::new(bad),
            Err(ConfigError::CodeTooSmall(1))
        ));
    }

    #[test]
    fn reset_places_food_in_tube() {
        let e = env();
        assert_eq!(e.food, e.tube + (1, 0));
        assert_eq!(e.paw, Pos::new(1, 0));
        assert_eq!(e.mouth, Pos::new(0, NECK_FLOOR));
    }

    #[test]
    fn reset_random_respects_bounds() {
        let mut e = env();
        for _ in 0..500 {
            e.reset_random();
            assert_eq!(e.mouth.x, 0);
            assert!((NECK_FLOOR..=e.v_max).contains(&e.mouth.y));
            assert!((0..=X_MAX).contains(&e.paw.x));
            assert!((0..5).contains(&e.paw.y));
            if e.food.y == 0 {
                assert!((0..=X_MAX).contains(&e.food.x));
            } else {
                assert_eq!(e.food.y, e.tube.y);
                assert!((e.tube.x..=X_MAX).contains(&e.food.x));
            }
        }
    }

    #[test]
    fn reset_random_is_reproducible_from_seed() {
        let cfg = EnvironmentConfig {
            seed: 1234,
            ..Default::default()
        };
        let mut a = Environment::new(cfg).unwrap();
        let mut b = Environment::new(cfg).unwrap();
        for _ in 0..50 {
            a.reset_random();
            b.reset_random();
            assert_eq!((a.food, a.mouth, a.paw), (b.food, b.mouth, b.paw));
        }
    }

    #[test]
    fn codes_have_fixed_length_and_track_positions() {
        let mut e = env();
        assert_eq!(e.code_len(), CODED_SCALARS * 10);

        let before = e.population_codes().to_vec();
        e.food = Pos::new(3, 0);
        e.compute_population_codes();
        assert_ne!(before, e.population_codes());
    }

    #[test]
    fn code_peaks_at_nearest_center() {
        let mut e = env();
        // Centers sit at multiples of X_MAX / (k - 1); food.x right on one.
        e.food = Pos::new(10, 0);
        e.compute_population_codes();
        let k = 10;
        let food_x = &e.population_codes()[..k];
        let peak = food_x
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        // 10 of 30 with centers every 30/9 ≈ 3.33 puts the peak at unit 3.
        assert_eq!(peak, 3);
    }
}
