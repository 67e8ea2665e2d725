// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It is used only for the lesion perturbation and randomized episode
// resets. Each `Environment` owns its own instance, so runs are
// reproducible from (seed, action sequence) and independent episodes
// never share a stream.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        // Marsaglia / Vigna family. Simple, fast, decent for simulation noise.
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform draw from `[low, high)`. Returns `low` on an empty range.
    #[inline]
    pub fn gen_range_i32(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        let span = (high - low) as u32;
        let v = self.next_u32() % span;
        low + v as i32
    }

    /// Uniform draw from `[low, high)`. Returns `low` on an empty range.
    #[inline]
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        let span = (high - low) as u32;
        let v = self.next_u32() % span;
        low + v as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = Prng::new(42);
        let mut b = Prng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn signed_range_stays_in_bounds() {
        let mut rng = Prng::new(7);
        for _ in 0..10_000 {
            let v = rng.gen_range_i32(-8, 3);
            assert!((-8..3).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn signed_range_covers_both_ends() {
        let mut rng = Prng::new(99);
        let mut seen_low = false;
        let mut seen_high = false;
        for _ in 0..10_000 {
            match rng.gen_range_i32(-8, 3) {
                -8 => seen_low = true,
                2 => seen_high = true,
                _ => {}
            }
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn empty_range_returns_low() {
        let mut rng = Prng::new(1);
        assert_eq!(rng.gen_range_i32(5, 5), 5);
        assert_eq!(rng.gen_range_usize(3, 2), 3);
    }
}
