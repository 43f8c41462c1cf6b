use crate::core::dfm::DocumentFeatureMatrix;
use crate::lda::error::LdaError;
use crate::lda::model::{dominant_labels, LdaModel};
use crate::lda::sampler::SamplerSettings;
use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

/// Topic proportions for documents the model was not fitted on.
#[derive(Debug, Clone)]
pub struct InferredTopics {
    pub labels: Vec<String>,
    pub documents: Vec<String>,
    /// D × K
    pub theta: Array2<f64>,
}

impl InferredTopics {
    /// Most probable label per document, ties to the earlier label.
    pub fn dominant_topics(&self) -> Vec<String> {
        dominant_labels(&self.theta, &self.labels)
    }
}

/// Sample topic assignments for new documents with the model's topic-word
/// distribution held fixed.
///
/// The matrix is first reindexed onto the model vocabulary. Documents are
/// independent and run in parallel; document `d` draws from its own
/// generator seeded with `random_seed + d`, so the output does not depend on
/// `threads`.
pub fn infer_topics(
    model: &LdaModel,
    dfm: &DocumentFeatureMatrix,
    settings: &SamplerSettings,
    threads: usize,
) -> Result<InferredTopics, LdaError> {
    if dfm.n_documents() == 0 {
        return Err(LdaError::invalid("document-feature matrix has no documents"));
    }
    let conformed = dfm.conform_to(model.features())?;
    let dropped = dfm.total() - conformed.total();
    if dropped > 0 {
        warn!(dropped, "tokens of features unknown to the model were ignored");
    }
    if settings.verbose {
        info!(
            documents = conformed.n_documents(),
            tokens = conformed.total(),
            max_iter = settings.max_iter,
            threads,
            "inferring topics for new documents"
        );
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
        .map_err(|e| LdaError::invalid(format!("failed to create thread pool: {}", e)))?;
    let phi = model.phi().view();
    let alpha = model.alpha();
    let rows: Vec<Result<Vec<f64>, LdaError>> = pool.install(|| {
        (0..conformed.n_documents())
            .into_par_iter()
            .map(|d| {
                let words: Vec<usize> = conformed
                    .row(d)
                    .flat_map(|(w, c)| std::iter::repeat(w).take(c as usize))
                    .collect();
                let seed = settings.random_seed.wrapping_add(d as u64);
                infer_document(&words, phi, alpha, settings.max_iter, seed)
                    .map_err(|e| match e {
                        LdaError::NumericInstability(msg) => LdaError::NumericInstability(
                            format!("document {}: {}", conformed.documents()[d], msg),
                        ),
                        other => other,
                    })
            })
            .collect()
    });

    let n_topics = model.n_topics();
    let mut theta = Array2::<f64>::zeros((conformed.n_documents(), n_topics));
    for (d, row) in rows.into_iter().enumerate() {
        for (k, value) in row?.into_iter().enumerate() {
            theta[(d, k)] = value;
        }
    }
    Ok(InferredTopics {
        labels: model.labels().to_vec(),
        documents: conformed.documents().to_vec(),
        theta,
    })
}

fn infer_document(
    words: &[usize],
    phi: ArrayView2<'_, f64>,
    alpha: &[f64],
    max_iter: usize,
    seed: u64,
) -> Result<Vec<f64>, LdaError> {
    let n_topics = alpha.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut doc_topic = vec![0u32; n_topics];
    let mut assignments = Vec::with_capacity(words.len());
    for _ in words {
        let k = rng.gen_range(0..n_topics);
        assignments.push(k);
        doc_topic[k] += 1;
    }

    let mut cumulative = vec![0.0; n_topics];
    for _ in 0..max_iter {
        for (i, &w) in words.iter().enumerate() {
            let old = assignments[i];
            doc_topic[old] -= 1;
            let mut total = 0.0;
            for k in 0..n_topics {
                total += phi[(k, w)] * (doc_topic[k] as f64 + alpha[k]);
                cumulative[k] = total;
            }
            if !total.is_finite() || total <= 0.0 {
                doc_topic[old] += 1;
                return Err(LdaError::NumericInstability(format!(
                    "topic scores for feature {} sum to {}",
                    w, total
                )));
            }
            let u = rng.gen::<f64>() * total;
            let new = cumulative
                .iter()
                .position(|&c| u < c)
                .unwrap_or(n_topics - 1);
            doc_topic[new] += 1;
            assignments[i] = new;
        }
    }

    let alpha_sum: f64 = alpha.iter().sum();
    let denom = words.len() as f64 + alpha_sum;
    Ok(doc_topic
        .iter()
        .zip(alpha)
        .map(|(&n, &a)| (n as f64 + a) / denom)
        .collect())
}
