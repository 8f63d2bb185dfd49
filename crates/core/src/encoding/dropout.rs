//! BPE-dropout.
//!
//! Dropout skips individual merges with probability `alpha` during encoding,
//! producing alternative segmentations of the same text for regularization.
//! Skipped candidates are not re-enqueued; they are lost for the run.
//!
//! # Reference
//!
//! - Provilkov, I., et al. (2020). BPE-Dropout: Simple and Effective Subword
//!   Regularization. ACL.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Merge-skipping policy for one encode call.
///
/// `alpha <= 0` never skips and never consults an RNG; `alpha >= 1` always
/// skips (the engine then returns its input unchanged); anything in between
/// draws a uniform `[0, 1)` sample per candidate.
pub struct Dropout(Policy);

enum Policy {
    Never,
    Always,
    Sample { alpha: f32, rng: StdRng },
}

impl Dropout {
    /// Create a policy that never skips a merge.
    pub fn disabled() -> Self {
        Self(Policy::Never)
    }

    /// Create a policy for the given skip probability, seeded from platform
    /// entropy.
    pub fn new(alpha: f32) -> Self {
        if alpha <= 0.0 {
            Self(Policy::Never)
        } else if alpha >= 1.0 {
            Self(Policy::Always)
        } else {
            Self(Policy::Sample {
                alpha,
                rng: StdRng::from_entropy(),
            })
        }
    }

    /// Create a policy with a fixed seed for reproducible segmentations.
    pub fn with_seed(alpha: f32, seed: u64) -> Self {
        if alpha <= 0.0 {
            Self(Policy::Never)
        } else if alpha >= 1.0 {
            Self(Policy::Always)
        } else {
            Self(Policy::Sample {
                alpha,
                rng: StdRng::seed_from_u64(seed),
            })
        }
    }

    /// Decide whether the next merge is skipped.
    pub fn skip(&mut self) -> bool {
        match &mut self.0 {
            Policy::Never => false,
            Policy::Always => true,
            Policy::Sample { alpha, rng } => rng.gen::<f32>() < *alpha,
        }
    }
}
