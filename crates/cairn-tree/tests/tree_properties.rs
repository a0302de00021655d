//! Structural invariants of fitted cairn trees.
//!
//! Each test replays the training samples down the fitted tree and checks the
//! partition at every node against an independent brute-force search.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cairn_tree::{
    CairnTree, CairnTreeConfig, DistanceMatrix, Histogram, Label, Node, NodeIndex, Sample, euclidean,
};

/// Overlapping 2-D blobs: labels are noisy, so the tree needs several levels
/// and some leaves end up impure.
fn noisy_blobs(n_samples: usize, seed: u64) -> Vec<Sample> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n_samples)
        .map(|_| {
            let x: f64 = rng.gen_range(0.0..10.0);
            let y: f64 = rng.gen_range(0.0..10.0);
            let mut label = i64::from(x > 5.0) + 2 * i64::from(y > 5.0);
            if rng.gen_bool(0.15) {
                label = rng.gen_range(0..4);
            }
            Sample::new(vec![x, y], label)
        })
        .collect()
}

/// Fewest misclassified samples over all admissible pairs of `indices`,
/// with the first pair reaching it, computed with plain histograms.
fn brute_force_best(
    samples: &[Sample],
    matrix: &DistanceMatrix,
    indices: &[usize],
    min_leaf: usize,
) -> Option<(usize, usize, usize)> {
    let mut best: Option<(usize, usize, usize)> = None;
    for (a, &p) in indices.iter().enumerate() {
        for &q in &indices[a + 1..] {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| matrix.get(p, i) <= matrix.get(q, i));
            if left.len() < min_leaf || right.len() < min_leaf {
                continue;
            }
            let misclassified = Histogram::from_indices(samples, &left).misclassified()
                + Histogram::from_indices(samples, &right).misclassified();
            if best.is_none_or(|(m, _, _)| misclassified < m) {
                best = Some((misclassified, p, q));
            }
        }
    }
    best
}

/// Walk the tree, routing `indices` through each split by nearest cairn.
fn check_node(
    tree: &CairnTree,
    samples: &[Sample],
    matrix: &DistanceMatrix,
    min_leaf: usize,
    node: NodeIndex,
    indices: &[usize],
) {
    let expected = Histogram::from_indices(samples, indices);
    let node = tree.node(node);
    assert_eq!(node.histogram(), &expected, "node histogram mismatch");
    assert_eq!(node.n_samples(), indices.len());

    let parent_misclassified = expected.misclassified();
    let best = brute_force_best(samples, matrix, indices, min_leaf);

    match node {
        Node::Leaf {
            homogeneous, error, ..
        } => {
            assert_eq!(*homogeneous, error.value() == 0.0);
            if !homogeneous {
                // No admissible pair strictly improves on the leaf.
                if let Some((m, _, _)) = best {
                    assert!(m >= parent_misclassified, "leaf had an improving split");
                }
            }
        }
        Node::Split {
            error,
            split_error,
            left_cairn,
            right_cairn,
            left_cairn_index,
            right_cairn_index,
            left,
            right,
            ..
        } => {
            assert!(error.value() > 0.0, "homogeneous node was split");
            assert!(split_error < error, "split did not reduce error");
            assert_eq!(left_cairn.as_slice(), samples[*left_cairn_index].features());
            assert_eq!(right_cairn.as_slice(), samples[*right_cairn_index].features());

            let (m, p, q) = best.expect("split node must have an admissible pair");
            assert_eq!((*left_cairn_index, *right_cairn_index), (p, q));
            assert!((split_error.value() - m as f64 / indices.len() as f64).abs() < 1e-12);

            let (left_set, right_set): (Vec<usize>, Vec<usize>) =
                indices.iter().partition(|&&i| {
                    let v = samples[i].features();
                    euclidean(v, left_cairn) <= euclidean(v, right_cairn)
                });
            assert!(left_set.len() >= min_leaf && right_set.len() >= min_leaf);
            assert_eq!(left_set.len() + right_set.len(), indices.len());

            check_node(tree, samples, matrix, min_leaf, *left, &left_set);
            check_node(tree, samples, matrix, min_leaf, *right, &right_set);
        }
    }
}

fn check_tree(samples: &[Sample], min_leaf: usize) -> CairnTree {
    let tree = CairnTreeConfig::new()
        .with_min_leaf(min_leaf)
        .fit(samples)
        .unwrap();
    let matrix = DistanceMatrix::from_samples(samples).unwrap();
    let all: Vec<usize> = (0..samples.len()).collect();
    check_node(&tree, samples, &matrix, min_leaf, tree.root_index(), &all);
    tree
}

#[test]
fn invariants_hold_for_min_leaf_one() {
    let samples = noisy_blobs(40, 1);
    let tree = check_tree(&samples, 1);
    assert!(tree.n_nodes() > 1);
}

#[test]
fn invariants_hold_for_min_leaf_three() {
    let samples = noisy_blobs(50, 2);
    check_tree(&samples, 3);
}

#[test]
fn invariants_hold_with_duplicate_points() {
    let mut samples = noisy_blobs(20, 3);
    let copies: Vec<Sample> = samples
        .iter()
        .take(10)
        .map(|s| Sample::new(s.features().to_vec(), s.label().value() + 1))
        .collect();
    samples.extend(copies);
    check_tree(&samples, 2);
}

#[test]
fn training_samples_reach_their_leaf() {
    let samples = noisy_blobs(40, 4);
    let tree = CairnTreeConfig::new().with_min_leaf(1).fit(&samples).unwrap();
    for sample in &samples {
        let histogram = tree.predict_histogram(sample.features()).unwrap();
        assert!(histogram.count(sample.label()) > 0);
    }
}

#[test]
fn end_to_end_two_clusters() {
    let samples = vec![
        Sample::new(vec![0.0, 0.0], 0),
        Sample::new(vec![0.0, 1.0], 0),
        Sample::new(vec![10.0, 10.0], 1),
        Sample::new(vec![10.0, 11.0], 1),
    ];
    let tree = check_tree(&samples, 1);
    assert_eq!(tree.n_nodes(), 3);
    assert_eq!(tree.predict(&[0.1, 0.1]).unwrap(), Label::new(0));
    assert_eq!(tree.predict(&[10.2, 10.4]).unwrap(), Label::new(1));
}
