//! Seeded random blob generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::schema::BlobDef;
use crate::validate::{ValidationError, invalid};

/// Smallest magnitude drawn for a random scale.
pub const MIN_RANDOM_SCALE: f64 = 0.01;

/// `count` blobs with shifts in `[-endpt, endpt]` and scale magnitudes in
/// `[MIN_RANDOM_SCALE, endpt]`, each scale with an independent sign.
///
/// The same `(count, seed, endpt)` always yields the same blobs. A
/// non-positive or non-finite `endpt` has no range to draw from.
pub fn random_blobs(
    count: usize,
    seed: u64,
    endpt: f64,
) -> Result<Vec<BlobDef>, ValidationError> {
    if !endpt.is_finite() || endpt <= 0.0 {
        return Err(invalid("endpt", endpt, "must be positive and finite"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let lo = MIN_RANDOM_SCALE.min(endpt);

    let blobs = (0..count)
        .map(|_| {
            let x_shift = rng.gen_range(-endpt..=endpt);
            let y_shift = rng.gen_range(-endpt..=endpt);
            let x_mag = rng.gen_range(lo..=endpt);
            let x_scale = signed(&mut rng, x_mag);
            let y_mag = rng.gen_range(lo..=endpt);
            let y_scale = signed(&mut rng, y_mag);
            BlobDef::new(x_shift, y_shift, x_scale, y_scale)
        })
        .collect();
    Ok(blobs)
}

fn signed(rng: &mut StdRng, magnitude: f64) -> f64 {
    if rng.gen_bool(0.5) { -magnitude } else { magnitude }
}
