//! Weighted CART classification tree over one-hot encoded rows.
//!
//! Every column is binary, so a split asks whether a column is active. Rows
//! are stored as the sorted list of their active columns. Nodes live in a
//! flat arena and the tree is grown with an explicit stack.

use rand::Rng;

/// A tree node in the arena.
#[derive(Debug, Clone)]
enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        column: u32,
        absent: usize,
        present: usize,
    },
}

/// Training data shared by every tree of a forest.
#[derive(Debug, Clone, Copy)]
pub struct TrainingSet<'a> {
    /// Active columns per row, each sorted ascending.
    pub rows: &'a [Vec<u32>],
    /// Class index per row.
    pub labels: &'a [usize],
    /// Number of binary columns.
    pub n_columns: usize,
    /// Number of classes.
    pub n_classes: usize,
}

/// A fitted classification tree.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Pending {
    node: usize,
    samples: Vec<usize>,
}

fn is_active(row: &[u32], column: u32) -> bool {
    row.binary_search(&column).is_ok()
}

fn gini(weights: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - weights.iter().map(|w| (w / total).powi(2)).sum::<f64>()
}

impl DecisionTree {
    /// Grows a tree until every leaf is pure or its rows are identical.
    ///
    /// `weights[i]` is the weight of row `i`; rows with zero weight are not
    /// part of this tree. At each node up to `max_features` non-constant
    /// columns are tried in random order and the one with the largest
    /// weighted Gini decrease is kept, even when that decrease is zero.
    #[must_use]
    pub fn fit<R: Rng>(
        data: TrainingSet<'_>,
        weights: &[f64],
        max_features: usize,
        rng: &mut R,
    ) -> Self {
        let max_features = max_features.max(1);
        let samples: Vec<usize> = (0..data.rows.len()).filter(|&i| weights[i] > 0.0).collect();

        let mut nodes = vec![Node::Leaf {
            distribution: vec![0.0; data.n_classes],
        }];
        let mut stack = vec![Pending { node: 0, samples }];
        let mut columns: Vec<u32> = (0..data.n_columns).filter_map(|c| u32::try_from(c).ok()).collect();
        let mut present_counts = vec![0usize; data.n_columns];

        while let Some(Pending { node, samples }) = stack.pop() {
            let mut class_weights = vec![0.0; data.n_classes];
            for &i in &samples {
                class_weights[data.labels[i]] += weights[i];
            }
            let total: f64 = class_weights.iter().sum();

            let pure = class_weights.iter().filter(|&&w| w > 0.0).count() <= 1;
            let split = if pure || samples.len() < 2 {
                None
            } else {
                best_split(
                    data,
                    weights,
                    &samples,
                    &class_weights,
                    total,
                    max_features,
                    &mut columns,
                    &mut present_counts,
                    rng,
                )
            };

            let Some(column) = split else {
                let distribution = if total > 0.0 {
                    class_weights.iter().map(|w| w / total).collect()
                } else {
                    class_weights
                };
                nodes[node] = Node::Leaf { distribution };
                continue;
            };

            let (present, absent): (Vec<usize>, Vec<usize>) = samples
                .into_iter()
                .partition(|&i| is_active(&data.rows[i], column));

            let absent_node = nodes.len();
            let present_node = absent_node + 1;
            nodes.push(Node::Leaf {
                distribution: Vec::new(),
            });
            nodes.push(Node::Leaf {
                distribution: Vec::new(),
            });
            nodes[node] = Node::Split {
                column,
                absent: absent_node,
                present: present_node,
            };

            stack.push(Pending {
                node: present_node,
                samples: present,
            });
            stack.push(Pending {
                node: absent_node,
                samples: absent,
            });
        }

        Self { nodes }
    }

    /// Class distribution of the leaf `row` falls into.
    #[must_use]
    pub fn predict_proba(&self, row: &[u32]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    column,
                    absent,
                    present,
                } => {
                    index = if is_active(row, *column) {
                        *present
                    } else {
                        *absent
                    };
                }
            }
        }
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[allow(clippy::too_many_arguments)]
fn best_split<R: Rng>(
    data: TrainingSet<'_>,
    weights: &[f64],
    samples: &[usize],
    class_weights: &[f64],
    total: f64,
    max_features: usize,
    columns: &mut [u32],
    present_counts: &mut [usize],
    rng: &mut R,
) -> Option<u32> {
    present_counts.fill(0);
    for &i in samples {
        for &c in &data.rows[i] {
            present_counts[c as usize] += 1;
        }
    }

    let parent = gini(class_weights, total);
    let mut best: Option<(u32, f64)> = None;
    let mut tried = 0;
    let mut present_weights = vec![0.0; data.n_classes];
    let mut absent_weights = vec![0.0; data.n_classes];

    // Lazy Fisher-Yates: draw columns in random order until enough
    // non-constant ones have been evaluated.
    for k in 0..columns.len() {
        if tried >= max_features {
            break;
        }
        let j = rng.gen_range(k..columns.len());
        columns.swap(k, j);
        let column = columns[k];

        let count = present_counts[column as usize];
        if count == 0 || count == samples.len() {
            continue;
        }
        tried += 1;

        present_weights.fill(0.0);
        for &i in samples {
            if is_active(&data.rows[i], column) {
                present_weights[data.labels[i]] += weights[i];
            }
        }
        let present_total: f64 = present_weights.iter().sum();
        for (a, (c, p)) in absent_weights
            .iter_mut()
            .zip(class_weights.iter().zip(&present_weights))
        {
            *a = c - p;
        }
        let absent_total = total - present_total;

        let child = (present_total / total).mul_add(
            gini(&present_weights, present_total),
            (absent_total / total) * gini(&absent_weights, absent_total),
        );
        let decrease = parent - child;

        if best.is_none_or(|(_, d)| decrease > d) {
            best = Some((column, decrease));
        }
    }

    best.map(|(column, _)| column)
}
