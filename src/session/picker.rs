use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::morse;

pub struct TargetPicker {
    rng: SmallRng,
}

impl TargetPicker {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Uniform pick among the encodable members of `set`. With two or more
    /// candidates the result never equals `previous`.
    pub fn pick(&mut self, set: &[char], previous: Option<char>) -> Option<char> {
        let mut candidates: Vec<char> = Vec::with_capacity(set.len());
        for &ch in set {
            if morse::is_supported(ch) && !candidates.contains(&ch) {
                candidates.push(ch);
            }
        }

        match candidates.len() {
            0 => None,
            1 => Some(candidates[0]),
            n => loop {
                let ch = candidates[self.rng.gen_range(0..n)];
                if Some(ch) != previous {
                    break Some(ch);
                }
            },
        }
    }
}

impl Default for TargetPicker {
    fn default() -> Self {
        Self::new()
    }
}
