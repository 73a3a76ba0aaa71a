use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::types::SplitData;

/// Relative sizes of the train, val and test subsets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitWeights {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitWeights {
    pub fn new(train: f64, val: f64, test: f64) -> Result<Self> {
        for (name, weight) in [("train", train), ("val", val), ("test", test)] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConvertError::Config(format!(
                    "{} weight must be a non-negative number, got {}",
                    name, weight
                )));
            }
        }
        if train + val + test <= 0.0 {
            return Err(ConvertError::Config(
                "train, val and test weights are all zero".to_string(),
            ));
        }
        Ok(Self { train, val, test })
    }

    /// Target sizes of (train, val, test) for `n` items.
    ///
    /// Largest remainder rounding: every subset gets the floor of its ideal
    /// share and the leftover items go to the largest fractional parts, so no
    /// subset is more than one item away from `n * weight / total`. Ties go
    /// to test, then val.
    pub fn target_counts(&self, n: usize) -> (usize, usize, usize) {
        let total = self.train + self.val + self.test;
        let shares = [self.train, self.val, self.test].map(|weight| {
            let ideal = n as f64 * weight / total;
            // 10 * 7 / 10 must count as exactly 7
            if (ideal - ideal.round()).abs() < 1e-9 {
                ideal.round()
            } else {
                ideal
            }
        });

        let mut counts = shares.map(|share| share.floor() as usize);
        let assigned: usize = counts.iter().sum();
        let mut order = [2, 1, 0];
        order.sort_by(|&a, &b| {
            let rem_a = shares[a] - shares[a].floor();
            let rem_b = shares[b] - shares[b].floor();
            rem_b.total_cmp(&rem_a)
        });
        for &i in order.iter().take(n.saturating_sub(assigned)) {
            counts[i] += 1;
        }

        (counts[0], counts[1], counts[2])
    }
}

/// Partition `ids` into train/val/test by `weights`.
///
/// The split is done in two steps, train against the rest and then val
/// against test. Without `shuffle` each step keeps the leading block for the
/// first subset. With `shuffle` positions are drawn from a `StdRng` seeded
/// with `seed`. Every subset keeps the order of `ids`.
pub fn split_dataset(
    ids: &[String],
    weights: SplitWeights,
    shuffle: bool,
    seed: u64,
) -> Result<SplitData> {
    if ids.is_empty() {
        return Err(ConvertError::Config("the image index is empty".to_string()));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let positions: Vec<usize> = (0..ids.len()).collect();

    let (_, val_len, test_len) = weights.target_counts(ids.len());

    let (train, rest) = partition(positions, val_len + test_len, shuffle, &mut rng);
    let (val, test) = if weights.test > 0.0 {
        let (val, test) = partition(rest, test_len, shuffle, &mut rng);
        (val, Some(test))
    } else {
        (rest, None)
    };

    let pick = |positions: &[usize]| -> Vec<String> {
        positions.iter().map(|&i| ids[i].clone()).collect()
    };

    Ok(SplitData {
        train: pick(&train),
        val: pick(&val),
        test: test.as_deref().map(pick),
        all: ids.to_vec(),
    })
}

// Split positions into (head, tail) with `tail_len` items in the tail.
// Both halves come back sorted.
fn partition(
    mut positions: Vec<usize>,
    tail_len: usize,
    shuffle: bool,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    let tail_len = tail_len.min(positions.len());

    if shuffle {
        positions.shuffle(rng);
        let mut tail: Vec<usize> = positions.drain(0..tail_len).collect();
        positions.sort_unstable();
        tail.sort_unstable();
        (positions, tail)
    } else {
        let tail = positions.split_off(positions.len() - tail_len);
        (positions, tail)
    }
}

/// Read an image index file. The first whitespace separated token of every
/// non-blank line is an image id; repeated ids are dropped.
pub fn read_image_index(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for token in content.lines().filter_map(|line| line.split_whitespace().next()) {
        if seen.insert(token) {
            ids.push(token.to_string());
        } else {
            log::warn!("Duplicate image id '{}' in {}", token, path.display());
        }
    }
    Ok(ids)
}

/// Use the split lists shipped with the dataset:
/// `<class>_train.txt`, `<class>_val.txt` and, when present, `<class>_test.txt`.
pub fn load_voc_splits(image_sets_dir: &Path, class: &str) -> Result<SplitData> {
    let train = read_image_index(&image_sets_dir.join(format!("{}_train.txt", class)))?;
    let val = read_image_index(&image_sets_dir.join(format!("{}_val.txt", class)))?;
    let test_path = image_sets_dir.join(format!("{}_test.txt", class));
    let test = if test_path.is_file() {
        Some(read_image_index(&test_path)?)
    } else {
        None
    };

    let mut seen = HashSet::new();
    let all: Vec<String> = train
        .iter()
        .chain(val.iter())
        .chain(test.iter().flatten())
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();

    if all.is_empty() {
        return Err(ConvertError::Config(format!(
            "no image ids found in the {} split lists under {}",
            class,
            image_sets_dir.display()
        )));
    }

    Ok(SplitData {
        train,
        val,
        test,
        all,
    })
}
