use crate::core::dictionary::{resolve_patterns, PatternMode, SeedDictionary};
use crate::lda::error::LdaError;
use tracing::{debug, warn};

/// Label of the unseeded catch-all topic.
pub const RESIDUAL_TOPIC: &str = "other";

/// How a dictionary is turned into seed pseudo-counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seeding {
    pub mode: PatternMode,
    pub case_sensitive: bool,
    /// Append an unseeded `other` topic.
    pub residual: bool,
    /// Pseudo-count per seeded cell, as a share of the corpus token count.
    pub weight: f64,
}

impl Default for Seeding {
    fn default() -> Self {
        Self {
            mode: PatternMode::Glob,
            case_sensitive: false,
            residual: false,
            weight: 0.01,
        }
    }
}

/// Sparse V × K matrix of pseudo-counts added to the topic-word prior.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedMatrix {
    features: Vec<String>,
    topics: Vec<String>,
    /// Per feature: `(topic, pseudo-count)` sorted by topic.
    rows: Vec<Vec<(usize, f64)>>,
    column_sums: Vec<f64>,
}

impl SeedMatrix {
    pub fn new<I>(features: Vec<String>, topics: Vec<String>, entries: I) -> Result<Self, LdaError>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); features.len()];
        let mut column_sums = vec![0.0; topics.len()];
        for (w, k, value) in entries {
            if w >= features.len() || k >= topics.len() {
                return Err(LdaError::Shape(format!(
                    "seed cell ({}, {}) outside {} x {}",
                    w,
                    k,
                    features.len(),
                    topics.len()
                )));
            }
            if !value.is_finite() || value < 0.0 {
                return Err(LdaError::invalid(format!(
                    "seed pseudo-count at ({}, {}) must be non-negative",
                    w, k
                )));
            }
            if rows[w].iter().any(|(existing, _)| *existing == k) {
                return Err(LdaError::Shape(format!("seed cell ({}, {}) given twice", w, k)));
            }
            rows[w].push((k, value));
            column_sums[k] += value;
        }
        for row in &mut rows {
            row.sort_by_key(|(k, _)| *k);
        }
        Ok(Self {
            features,
            topics,
            rows,
            column_sums,
        })
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn n_topics(&self) -> usize {
        self.topics.len()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn row(&self, w: usize) -> &[(usize, f64)] {
        &self.rows[w]
    }

    pub fn get(&self, w: usize, k: usize) -> f64 {
        self.rows[w]
            .iter()
            .find(|(topic, _)| *topic == k)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    /// Total pseudo-count mass per topic.
    pub fn column_sums(&self) -> &[f64] {
        &self.column_sums
    }

    pub fn nnz(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Fail unless the row labels are exactly `features`, in order.
    pub fn ensure_matches(&self, features: &[String]) -> Result<(), LdaError> {
        if self.features.as_slice() != features {
            return Err(LdaError::invalid("seed features must match model features"));
        }
        Ok(())
    }
}

/// Resolve `dictionary` against `vocabulary` and build the seed matrix.
///
/// Every matched (feature, topic) pair gets `floor(total * weight)`.
pub fn build_seed_matrix(
    vocabulary: &[String],
    total: u64,
    dictionary: &SeedDictionary,
    seeding: &Seeding,
) -> Result<SeedMatrix, LdaError> {
    if !seeding.weight.is_finite() || seeding.weight < 0.0 {
        return Err(LdaError::invalid("weight must be a positive value"));
    }
    let pseudo_count = (total as f64 * seeding.weight).floor();

    let mut topics = dictionary.names();
    let mut entries = Vec::new();
    for (k, topic) in dictionary.topics().iter().enumerate() {
        let matched = resolve_patterns(
            &topic.patterns,
            vocabulary,
            seeding.mode,
            seeding.case_sensitive,
        )?;
        if matched.is_empty() {
            warn!(topic = %topic.name, "no features matched the seed patterns");
        } else {
            debug!(topic = %topic.name, matched = matched.len(), "resolved seed patterns");
        }
        entries.extend(matched.into_iter().map(|w| (w, k, pseudo_count)));
    }
    if seeding.residual {
        topics.push(RESIDUAL_TOPIC.to_string());
    }
    SeedMatrix::new(vocabulary.to_vec(), topics, entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> Vec<String> {
        ["space", "spaceship", "planet", "market", "stock", "alien"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn dictionary() -> SeedDictionary {
        SeedDictionary::from_pairs(vec![
            ("space", vec!["space*", "planet", "spaceship"]),
            ("economy", vec!["market*"]),
        ])
        .unwrap()
    }

    #[test]
    fn seeds_matched_cells_once() {
        let seeding = Seeding {
            weight: 0.05,
            ..Seeding::default()
        };
        let seeds = build_seed_matrix(&vocab(), 1000, &dictionary(), &seeding).unwrap();
        assert_eq!(seeds.n_features(), 6);
        assert_eq!(seeds.topics(), &["space".to_string(), "economy".to_string()]);
        assert_eq!(seeds.get(0, 0), 50.0);
        assert_eq!(seeds.get(1, 0), 50.0);
        assert_eq!(seeds.get(2, 0), 50.0);
        assert_eq!(seeds.get(3, 1), 50.0);
        assert_eq!(seeds.get(3, 0), 0.0);
        assert_eq!(seeds.nnz(), 4);
        assert_eq!(seeds.column_sums(), &[150.0, 50.0]);
    }

    #[test]
    fn pseudo_count_is_floored() {
        let seeding = Seeding {
            weight: 0.01,
            ..Seeding::default()
        };
        let seeds = build_seed_matrix(&vocab(), 250, &dictionary(), &seeding).unwrap();
        assert_eq!(seeds.get(0, 0), 2.0);
    }

    #[test]
    fn residual_adds_an_empty_column() {
        let seeding = Seeding {
            residual: true,
            ..Seeding::default()
        };
        let seeds = build_seed_matrix(&vocab(), 1000, &dictionary(), &seeding).unwrap();
        assert_eq!(seeds.n_topics(), 3);
        assert_eq!(seeds.topics()[2], RESIDUAL_TOPIC);
        assert_eq!(seeds.column_sums()[2], 0.0);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let seeding = Seeding {
            weight: -0.1,
            ..Seeding::default()
        };
        let err = build_seed_matrix(&vocab(), 1000, &dictionary(), &seeding).unwrap_err();
        assert!(err.to_string().contains("weight must be a positive value"));
    }

    #[test]
    fn feature_drift_is_detected() {
        let seeds =
            build_seed_matrix(&vocab(), 1000, &dictionary(), &Seeding::default()).unwrap();
        assert!(seeds.ensure_matches(&vocab()).is_ok());
        let mut reordered = vocab();
        reordered.swap(0, 1);
        let err = seeds.ensure_matches(&reordered).unwrap_err();
        assert!(err.to_string().contains("seed features must match model features"));
    }
}
