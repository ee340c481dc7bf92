use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::features::FEATURE_DIM;

// Euler-Mascheroni constant, for the average BST path length estimate.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// Unsupervised outlier ensemble of randomized partitioning trees: points
/// that take fewer random splits to isolate are more anomalous. Seeded
/// explicitly so scores are reproducible across runs.
pub struct IsolationForest {
    trees: Vec<Node>,
    sample_size: usize,
}

impl IsolationForest {
    /// Fit `tree_count` trees, each on a random subsample of at most
    /// `sample_size` points, using the given seed.
    pub fn fit(
        data: &[[f64; FEATURE_DIM]],
        tree_count: usize,
        sample_size: usize,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let sample_size = sample_size.min(data.len()).max(1);
        let depth_limit = (sample_size as f64).log2().ceil().max(1.0) as usize;

        let trees = (0..tree_count)
            .map(|_| {
                let indices: Vec<usize> = if data.len() > sample_size {
                    rand::seq::index::sample(&mut rng, data.len(), sample_size).into_vec()
                } else {
                    (0..data.len()).collect()
                };
                build_tree(data, indices, 0, depth_limit, &mut rng)
            })
            .collect();

        Self { trees, sample_size }
    }

    /// sklearn-compatible sample scores: `-2^(-E[h(x)] / c(psi))`, in
    /// (-1, 0). Lower means more anomalous.
    pub fn score_samples(&self, data: &[[f64; FEATURE_DIM]]) -> Vec<f64> {
        let normalizer = average_path_length(self.sample_size);
        data.iter()
            .map(|point| {
                let mean_path: f64 = self
                    .trees
                    .iter()
                    .map(|tree| path_length(tree, point, 0))
                    .sum::<f64>()
                    / self.trees.len() as f64;
                -(2f64.powf(-mean_path / normalizer))
            })
            .collect()
    }
}

fn build_tree(
    data: &[[f64; FEATURE_DIM]],
    indices: Vec<usize>,
    depth: usize,
    depth_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if indices.len() <= 1 || depth >= depth_limit {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let feature = rng.gen_range(0..FEATURE_DIM);
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &index in &indices {
        let value = data[index][feature];
        min = min.min(value);
        max = max.max(value);
    }
    if min >= max {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let threshold = rng.gen_range(min..max);
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&index| data[index][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(data, left, depth + 1, depth_limit, rng)),
        right: Box::new(build_tree(data, right, depth + 1, depth_limit, rng)),
    }
}

fn path_length(node: &Node, point: &[f64; FEATURE_DIM], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if point[*feature] < *threshold {
                path_length(left, point, depth + 1)
            } else {
                path_length(right, point, depth + 1)
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over n points, the
/// standard isolation-forest normalization term.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
