//! One-hot encoding of the categorical features.

use std::collections::BTreeSet;

use crate::features::{FEATURE_COUNT, FeatureValues};

/// Maps each feature's categories onto binary columns.
///
/// Categories are learned from the training rows and sorted per feature.
/// Encoding a value never seen during fitting sets no column for that
/// feature, which leaves it neutral instead of failing.
#[derive(Debug, Clone)]
pub struct OneHotEncoder {
    categories: Vec<Vec<String>>,
    offsets: Vec<u32>,
    width: usize,
}

impl OneHotEncoder {
    /// Learns the categories of every feature from `rows`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn fit<'a>(rows: impl IntoIterator<Item = &'a FeatureValues>) -> Self {
        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); FEATURE_COUNT];

        for row in rows {
            for (set, value) in seen.iter_mut().zip(row.iter()) {
                set.insert(value.as_str());
            }
        }

        let categories: Vec<Vec<String>> = seen
            .into_iter()
            .map(|set| set.into_iter().map(str::to_string).collect())
            .collect();

        let mut offsets = Vec::with_capacity(FEATURE_COUNT);
        let mut width = 0usize;
        for values in &categories {
            offsets.push(width as u32);
            width += values.len();
        }

        Self {
            categories,
            offsets,
            width,
        }
    }

    /// Total number of binary columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Known categories of the feature at `index`, sorted.
    #[must_use]
    pub fn categories(&self, index: usize) -> &[String] {
        self.categories.get(index).map_or(&[], Vec::as_slice)
    }

    /// Encodes a row as the sorted list of its active column indices.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn encode(&self, row: &FeatureValues) -> Vec<u32> {
        row.iter()
            .zip(self.categories.iter().zip(&self.offsets))
            .filter_map(|(value, (values, offset))| {
                values
                    .binary_search_by(|c| c.as_str().cmp(value.as_str()))
                    .ok()
                    .map(|position| offset + position as u32)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(values: [&str; FEATURE_COUNT]) -> FeatureValues {
        values.map(str::to_string)
    }

    #[test]
    fn columns_are_laid_out_per_feature_in_sorted_order() {
        let rows = [
            row(["Salta", "3", "Tarde", "Monday", "Ruta"]),
            row(["Córdoba", "12", "Noche", "Friday", "Calle"]),
        ];
        let encoder = OneHotEncoder::fit(&rows);

        assert_eq!(encoder.width(), 10);
        assert_eq!(encoder.categories(0), ["Córdoba", "Salta"]);
        assert_eq!(encoder.categories(1), ["12", "3"]);

        assert_eq!(encoder.encode(&rows[0]), vec![1, 3, 5, 7, 9]);
        assert_eq!(encoder.encode(&rows[1]), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn unseen_values_set_no_column() {
        let rows = [row(["Salta", "3", "Tarde", "Monday", "Ruta"])];
        let encoder = OneHotEncoder::fit(&rows);

        let encoded = encoder.encode(&row(["Jujuy", "3", "Tarde", "Sunday", "Ruta"]));
        assert_eq!(encoded, vec![1, 2, 4]);
    }
}
