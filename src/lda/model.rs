use crate::lda::error::LdaError;
use crate::lda::sampler::{SamplerOutput, SamplerSettings};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fitted topic model.
#[derive(Debug, Clone)]
pub struct LdaModel {
    labels: Vec<String>,
    features: Vec<String>,
    documents: Vec<String>,
    /// K × V
    phi: Array2<f64>,
    /// D × K
    theta: Array2<f64>,
    alpha: Vec<f64>,
    beta: f64,
    seeded: bool,
    /// Seed weight when the model was fitted from a dictionary.
    seed_weight: Option<f64>,
    topic_totals: Vec<u64>,
    iterations: usize,
    settings: SamplerSettings,
    log_likelihood: f64,
}

/// Top terms per topic: one column per topic, best term first.
#[derive(Debug, Clone, PartialEq)]
pub struct TermTable {
    pub labels: Vec<String>,
    pub columns: Vec<Vec<String>>,
}

impl TermTable {
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, label: &str) -> Option<&[String]> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|k| self.columns[k].as_slice())
    }
}

/// Model serialization container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    pub labels: Vec<String>,
    pub features: Vec<String>,
    pub documents: Vec<String>,
    pub phi: Vec<Vec<f64>>,
    pub theta: Vec<Vec<f64>>,
    pub alpha: Vec<f64>,
    pub beta: f64,
    #[serde(default)]
    pub seeded: bool,
    #[serde(default)]
    pub seed_weight: Option<f64>,
    pub topic_totals: Vec<u64>,
    pub iterations: usize,
    pub settings: SamplerSettings,
    pub log_likelihood: f64,
}

impl LdaModel {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_output(
        labels: Vec<String>,
        features: Vec<String>,
        documents: Vec<String>,
        alpha: Vec<f64>,
        beta: f64,
        seeded: bool,
        seed_weight: Option<f64>,
        settings: SamplerSettings,
        output: SamplerOutput,
    ) -> Self {
        Self {
            labels,
            features,
            documents,
            phi: output.phi,
            theta: output.theta,
            alpha,
            beta,
            seeded,
            seed_weight,
            topic_totals: output.topic_totals,
            iterations: output.iterations,
            settings,
            log_likelihood: output.log_likelihood,
        }
    }

    pub fn n_topics(&self) -> usize {
        self.labels.len()
    }

    pub fn n_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn phi(&self) -> &Array2<f64> {
        &self.phi
    }

    pub fn theta(&self) -> &Array2<f64> {
        &self.theta
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn seed_weight(&self) -> Option<f64> {
        self.seed_weight
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Sweeps actually executed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// The `n` most probable features of every topic.
    ///
    /// Ties keep vocabulary order; `n` beyond the vocabulary returns all of it.
    pub fn top_terms(&self, n: usize) -> TermTable {
        let n = n.min(self.n_features());
        let columns = self
            .phi
            .outer_iter()
            .map(|row| {
                let mut order: Vec<usize> = (0..row.len()).collect();
                order.sort_by(|&a, &b| row[b].total_cmp(&row[a]));
                order
                    .into_iter()
                    .take(n)
                    .map(|w| self.features[w].clone())
                    .collect()
            })
            .collect();
        TermTable {
            labels: self.labels.clone(),
            columns,
        }
    }

    /// Label of the most probable topic for every document; ties go to the
    /// earlier label.
    pub fn dominant_topics(&self) -> Vec<String> {
        dominant_labels(&self.theta, &self.labels)
    }

    /// Share of pseudo-tokens assigned to each topic in the final state.
    pub fn topic_shares(&self) -> Vec<f64> {
        let total: u64 = self.topic_totals.iter().sum();
        if total == 0 {
            return vec![0.0; self.n_topics()];
        }
        self.topic_totals
            .iter()
            .map(|&c| c as f64 / total as f64)
            .collect()
    }

    pub fn to_file(&self) -> ModelFile {
        ModelFile {
            labels: self.labels.clone(),
            features: self.features.clone(),
            documents: self.documents.clone(),
            phi: self.phi.outer_iter().map(|r| r.to_vec()).collect(),
            theta: self.theta.outer_iter().map(|r| r.to_vec()).collect(),
            alpha: self.alpha.clone(),
            beta: self.beta,
            seeded: self.seeded,
            seed_weight: self.seed_weight,
            topic_totals: self.topic_totals.clone(),
            iterations: self.iterations,
            settings: self.settings,
            log_likelihood: self.log_likelihood,
        }
    }

    pub fn from_file(file: ModelFile) -> Result<Self, LdaError> {
        let k = file.labels.len();
        if k == 0 {
            return Err(LdaError::Shape("model has no topics".into()));
        }
        if file.alpha.len() != k || file.topic_totals.len() != k {
            return Err(LdaError::Shape(format!(
                "model has {} labels but {} alpha values and {} topic totals",
                k,
                file.alpha.len(),
                file.topic_totals.len()
            )));
        }
        let phi = rows_to_array(&file.phi, k, file.features.len(), "phi")?;
        let theta = rows_to_array(&file.theta, file.documents.len(), k, "theta")?;
        Ok(Self {
            labels: file.labels,
            features: file.features,
            documents: file.documents,
            phi,
            theta,
            alpha: file.alpha,
            beta: file.beta,
            seeded: file.seeded,
            seed_weight: file.seed_weight,
            topic_totals: file.topic_totals,
            iterations: file.iterations,
            settings: file.settings,
            log_likelihood: file.log_likelihood,
        })
    }
}

pub(crate) fn dominant_labels(theta: &Array2<f64>, labels: &[String]) -> Vec<String> {
    theta
        .outer_iter()
        .map(|row| {
            let mut best = 0;
            for k in 1..row.len() {
                if row[k] > row[best] {
                    best = k;
                }
            }
            labels[best].clone()
        })
        .collect()
}

fn rows_to_array(
    rows: &[Vec<f64>],
    n_rows: usize,
    n_cols: usize,
    name: &str,
) -> Result<Array2<f64>, LdaError> {
    if rows.len() != n_rows {
        return Err(LdaError::Shape(format!(
            "{} has {} rows, expected {}",
            name,
            rows.len(),
            n_rows
        )));
    }
    let mut out = Array2::<f64>::zeros((n_rows, n_cols));
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(LdaError::Shape(format!(
                "{} row {} has {} values, expected {}",
                name,
                i,
                row.len(),
                n_cols
            )));
        }
        for (j, v) in row.iter().enumerate() {
            out[(i, j)] = *v;
        }
    }
    Ok(out)
}

impl fmt::Display for LdaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_seeded() { "Seeded LDA" } else { "LDA" };
        writeln!(
            f,
            "{}: {} topics; {} documents; {} features.",
            kind,
            self.n_topics(),
            self.n_documents(),
            self.n_features()
        )?;
        write!(
            f,
            "Gibbs sampling: {} of {} iterations; log-likelihood {:.4}",
            self.iterations, self.settings.max_iter, self.log_likelihood
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> LdaModel {
        let output = SamplerOutput {
            phi: array![[0.5, 0.2, 0.2, 0.1], [0.1, 0.1, 0.3, 0.5]],
            theta: array![[0.9, 0.1], [0.2, 0.8], [0.5, 0.5]],
            topic_totals: vec![6, 2],
            iterations: 10,
            log_likelihood: -12.5,
        };
        LdaModel::from_output(
            vec!["space".into(), "economy".into()],
            ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect(),
            ["d1", "d2", "d3"].iter().map(|s| s.to_string()).collect(),
            vec![0.5, 0.5],
            0.1,
            true,
            Some(0.01),
            SamplerSettings {
                max_iter: 10,
                ..Default::default()
            },
            output,
        )
    }

    #[test]
    fn top_terms_break_ties_by_vocabulary_order() {
        let terms = model().top_terms(3);
        assert_eq!(terms.n_rows(), 3);
        assert_eq!(terms.n_cols(), 2);
        assert_eq!(terms.column("space").unwrap(), &["a", "b", "c"]);
        assert_eq!(terms.column("economy").unwrap(), &["d", "c", "a"]);
        assert_eq!(model().top_terms(100).n_rows(), 4);
    }

    #[test]
    fn dominant_topics_prefer_first_on_ties() {
        assert_eq!(model().dominant_topics(), vec!["space", "economy", "space"]);
    }

    #[test]
    fn shares_and_display() {
        let m = model();
        assert_eq!(m.topic_shares(), vec![0.75, 0.25]);
        let text = m.to_string();
        assert!(text.contains("2 topics; 3 documents; 4 features."));
        assert!(text.starts_with("Seeded LDA"));
    }

    #[test]
    fn model_file_round_trip_checks_shapes() {
        let file = model().to_file();
        let restored = LdaModel::from_file(file.clone()).unwrap();
        assert_eq!(restored.phi(), model().phi());
        let mut broken = file;
        broken.theta.pop();
        assert!(matches!(LdaModel::from_file(broken), Err(LdaError::Shape(_))));
    }
}
