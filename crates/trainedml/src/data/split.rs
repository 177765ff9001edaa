use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data::loader::Dataset;
use crate::data::table::{Series, Table};
use crate::error::{Result, TrainedMlError};

/// Train and test partitions of one dataset.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Table,
    pub x_test: Table,
    pub y_train: Series,
    pub y_test: Series,
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Number of (train, test) rows for `n` samples; the test side is rounded up.
pub fn split_sizes(n: usize, test_size: f64) -> Result<(usize, usize)> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(TrainedMlError::invalid(
            "test_size",
            format!("must lie strictly between 0 and 1, got {}", test_size),
        ));
    }
    let n_test = (test_size * n as f64).ceil() as usize;
    let n_train = n.saturating_sub(n_test);
    if n_test == 0 || n_train == 0 {
        return Err(TrainedMlError::invalid(
            "test_size",
            format!(
                "{} of {} samples leaves an empty train or test set",
                test_size, n
            ),
        ));
    }
    Ok((n_train, n_test))
}

/// Shuffle rows with a seeded RNG and hold out the first `ceil(test_size * n)` of them.
pub fn train_test_split(dataset: &Dataset, test_size: f64, seed: u64) -> Result<Split> {
    let n = dataset.nrows();
    if dataset.target.len() != n {
        return Err(TrainedMlError::invalid(
            "target",
            format!("target has {} rows, features have {}", dataset.target.len(), n),
        ));
    }
    let (_, n_test) = split_sizes(n, test_size)?;

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);
    let (test_indices, train_indices) = permutation.split_at(n_test);

    log::debug!(
        "Split {} rows into {} train / {} test (seed={})",
        n,
        train_indices.len(),
        test_indices.len(),
        seed
    );

    Ok(Split {
        x_train: dataset.features.take(train_indices),
        x_test: dataset.features.take(test_indices),
        y_train: dataset.target.take(train_indices),
        y_test: dataset.target.take(test_indices),
        train_indices: train_indices.to_vec(),
        test_indices: test_indices.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Column;
    use std::collections::HashSet;

    fn dataset(n: usize) -> Dataset {
        let features = Table::new(vec![(
            "x".to_string(),
            Column::Numeric((0..n).map(|i| Some(i as f64)).collect()),
        )])
        .unwrap();
        let target = Series::new("y", Column::Numeric((0..n).map(|i| Some((i % 3) as f64)).collect()));
        Dataset { features, target }
    }

    #[test]
    fn test_split_150_rows() {
        let split = train_test_split(&dataset(150), 0.3, 42).unwrap();
        assert_eq!(split.x_train.nrows(), 105);
        assert_eq!(split.x_test.nrows(), 45);
        assert_eq!(split.y_test.len(), 45);

        let train: HashSet<_> = split.train_indices.iter().copied().collect();
        let test: HashSet<_> = split.test_indices.iter().copied().collect();
        assert!(train.is_disjoint(&test));
        assert_eq!(train.union(&test).count(), 150);
    }

    #[test]
    fn test_split_is_reproducible() {
        let a = train_test_split(&dataset(40), 0.25, 7).unwrap();
        let b = train_test_split(&dataset(40), 0.25, 7).unwrap();
        let c = train_test_split(&dataset(40), 0.25, 8).unwrap();
        assert_eq!(a.test_indices, b.test_indices);
        assert_ne!(a.test_indices, c.test_indices);
    }

    #[test]
    fn test_invalid_test_size() {
        assert!(train_test_split(&dataset(10), 0.0, 1).is_err());
        assert!(train_test_split(&dataset(10), 1.0, 1).is_err());
        assert!(train_test_split(&dataset(1), 0.5, 1).is_err());
    }
}
