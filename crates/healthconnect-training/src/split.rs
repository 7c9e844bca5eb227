//! Seeded train/test partitioning

use rand::{SeedableRng as _, seq::SliceRandom as _};
use rand_pcg::Pcg64;

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum SplitError {
    #[display("test fraction must be in (0, 1), got {fraction}")]
    InvalidFraction { fraction: f64 },
    #[display("cannot split {samples} samples into non-empty train and test sets")]
    TooFewSamples { samples: usize },
}

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..samples` with `seed` and takes the first
/// `ceil(samples * test_fraction)` indices as the test set.
///
/// The same arguments always produce the same partitions.
///
/// ```
/// use healthconnect_training::split::train_test_split;
///
/// let split = train_test_split(10, 0.2, 42).unwrap();
/// assert_eq!(split.test.len(), 2);
/// assert_eq!(split.train.len(), 8);
/// assert_eq!(split, train_test_split(10, 0.2, 42).unwrap());
/// ```
#[expect(clippy::cast_precision_loss)]
#[expect(clippy::cast_possible_truncation)]
#[expect(clippy::cast_sign_loss)]
pub fn train_test_split(
    samples: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<TrainTestSplit, SplitError> {
    if test_fraction.is_nan() || test_fraction <= 0.0 || test_fraction >= 1.0 {
        return Err(SplitError::InvalidFraction {
            fraction: test_fraction,
        });
    }
    let test_len = (samples as f64 * test_fraction).ceil() as usize;
    if test_len == 0 || test_len >= samples {
        return Err(SplitError::TooFewSamples { samples });
    }

    let mut indices = (0..samples).collect::<Vec<_>>();
    let mut rng = Pcg64::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let train = indices.split_off(test_len);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}
