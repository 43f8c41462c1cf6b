use crate::core::dfm::DocumentFeatureMatrix;
use crate::lda::error::LdaError;
use crate::lda::priors::ResolvedPriors;
use crate::lda::seeds::SeedMatrix;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Collapsed Gibbs sampler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplerSettings {
    /// Upper bound on the number of sweeps.
    pub max_iter: usize,
    pub random_seed: u64,
    /// Report progress at info level instead of debug.
    pub verbose: bool,
    /// Sweeps between log-likelihood evaluations; 0 disables them.
    pub log_every: usize,
    /// Stop once the relative log-likelihood change between evaluations
    /// falls below this value. `None` always runs `max_iter` sweeps.
    pub tol: Option<f64>,
}

impl Default for SamplerSettings {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            random_seed: 42,
            verbose: false,
            log_every: 100,
            tol: None,
        }
    }
}

impl SamplerSettings {
    pub fn validate(&self) -> Result<(), LdaError> {
        if let Some(tol) = self.tol {
            if !tol.is_finite() || tol <= 0.0 {
                return Err(LdaError::invalid("tol must be positive"));
            }
            if self.log_every == 0 {
                return Err(LdaError::invalid(
                    "tol requires log_every to be larger than zero",
                ));
            }
        }
        Ok(())
    }
}

/// All occurrences of one feature in one document. Their topics live in
/// `assignments[offset..offset + len]`.
#[derive(Debug, Clone, Copy)]
struct Cell {
    doc: usize,
    word: usize,
    offset: usize,
    len: usize,
}

/// Mutable state of one sampling run: topic assignments and count tables.
#[derive(Debug)]
pub struct SamplerState<'a> {
    dfm: &'a DocumentFeatureMatrix,
    seeds: Option<&'a SeedMatrix>,
    alpha: Vec<f64>,
    alpha_sum: f64,
    beta: f64,
    cells: Vec<Cell>,
    assignments: Vec<u32>,
    /// V × K
    word_topic: Array2<u32>,
    topic_totals: Vec<u64>,
    /// D × K
    doc_topic: Array2<u32>,
    doc_lengths: Vec<u64>,
    /// Σ_w (beta + seed[w, k]) per topic.
    prior_sums: Vec<f64>,
    prior_row: Vec<f64>,
    cumulative: Vec<f64>,
}

/// Posterior summary of a finished run.
#[derive(Debug, Clone)]
pub struct SamplerOutput {
    pub phi: Array2<f64>,
    pub theta: Array2<f64>,
    pub topic_totals: Vec<u64>,
    pub iterations: usize,
    pub log_likelihood: f64,
}

impl<'a> SamplerState<'a> {
    /// Expand every nonzero cell into pseudo-tokens and assign each a
    /// uniformly drawn topic.
    pub fn initialize(
        dfm: &'a DocumentFeatureMatrix,
        seeds: Option<&'a SeedMatrix>,
        priors: &ResolvedPriors,
        rng: &mut StdRng,
    ) -> Result<Self, LdaError> {
        let n_topics = priors.alpha.len();
        let n_docs = dfm.n_documents();
        let n_words = dfm.n_features();
        if n_topics == 0 {
            return Err(LdaError::invalid("k must be larger than zero"));
        }
        if n_docs == 0 {
            return Err(LdaError::invalid("document-feature matrix has no documents"));
        }
        if n_words == 0 {
            return Err(LdaError::invalid("document-feature matrix has no features"));
        }
        if let Some(s) = seeds {
            if s.n_features() != n_words || s.n_topics() != n_topics {
                return Err(LdaError::invalid(format!(
                    "seed matrix is {} x {} but the model is {} x {}",
                    s.n_features(),
                    s.n_topics(),
                    n_words,
                    n_topics
                )));
            }
        }
        if n_topics > u32::MAX as usize {
            return Err(LdaError::invalid("too many topics"));
        }

        let mut prior_sums = vec![n_words as f64 * priors.beta; n_topics];
        if let Some(s) = seeds {
            for (sum, extra) in prior_sums.iter_mut().zip(s.column_sums()) {
                *sum += extra;
            }
        }

        let mut state = Self {
            dfm,
            seeds,
            alpha: priors.alpha.clone(),
            alpha_sum: priors.alpha_sum(),
            beta: priors.beta,
            cells: Vec::with_capacity(dfm.nnz()),
            assignments: Vec::with_capacity(dfm.total() as usize),
            word_topic: Array2::zeros((n_words, n_topics)),
            topic_totals: vec![0; n_topics],
            doc_topic: Array2::zeros((n_docs, n_topics)),
            doc_lengths: (0..n_docs).map(|d| dfm.document_length(d)).collect(),
            prior_sums,
            prior_row: vec![0.0; n_topics],
            cumulative: vec![0.0; n_topics],
        };

        for doc in 0..n_docs {
            for (word, count) in dfm.row(doc) {
                let offset = state.assignments.len();
                for _ in 0..count {
                    let topic = rng.gen_range(0..n_topics);
                    state.assignments.push(topic as u32);
                    state.word_topic[(word, topic)] += 1;
                    state.topic_totals[topic] += 1;
                    state.doc_topic[(doc, topic)] += 1;
                }
                state.cells.push(Cell {
                    doc,
                    word,
                    offset,
                    len: count as usize,
                });
            }
        }
        Ok(state)
    }

    pub fn n_topics(&self) -> usize {
        self.alpha.len()
    }

    pub fn n_tokens(&self) -> usize {
        self.assignments.len()
    }

    pub fn topic_totals(&self) -> &[u64] {
        &self.topic_totals
    }

    /// Effective prior `beta + seed[w, k]`.
    fn prior(&self, w: usize, k: usize) -> f64 {
        self.beta + self.seeds.map_or(0.0, |s| s.get(w, k))
    }

    fn fill_prior_row(&mut self, w: usize) {
        self.prior_row.fill(self.beta);
        if let Some(s) = self.seeds {
            for &(k, value) in s.row(w) {
                self.prior_row[k] += value;
            }
        }
    }

    /// Resample every pseudo-token once, documents then features ascending.
    pub fn sweep(&mut self, rng: &mut StdRng) -> Result<(), LdaError> {
        for c in 0..self.cells.len() {
            let Cell {
                doc,
                word,
                offset,
                len,
            } = self.cells[c];
            self.fill_prior_row(word);
            for i in offset..offset + len {
                let old = self.assignments[i] as usize;
                self.word_topic[(word, old)] -= 1;
                self.topic_totals[old] -= 1;
                self.doc_topic[(doc, old)] -= 1;

                let new = match self.draw_topic(doc, word, rng) {
                    Ok(k) => k,
                    Err(err) => {
                        self.word_topic[(word, old)] += 1;
                        self.topic_totals[old] += 1;
                        self.doc_topic[(doc, old)] += 1;
                        return Err(err);
                    }
                };

                self.word_topic[(word, new)] += 1;
                self.topic_totals[new] += 1;
                self.doc_topic[(doc, new)] += 1;
                self.assignments[i] = new as u32;
            }
        }
        Ok(())
    }

    /// Draw a topic for one occurrence from the leave-one-out conditional.
    /// Expects `prior_row` to hold the priors of `word`.
    fn draw_topic(
        &mut self,
        doc: usize,
        word: usize,
        rng: &mut StdRng,
    ) -> Result<usize, LdaError> {
        let n_topics = self.n_topics();
        let mut total = 0.0;
        for k in 0..n_topics {
            let denom = self.topic_totals[k] as f64 + self.prior_sums[k];
            if denom.is_nan() || denom <= 0.0 {
                return Err(LdaError::NumericInstability(format!(
                    "word normalizer for topic {} is {}",
                    k, denom
                )));
            }
            let word_part = (self.word_topic[(word, k)] as f64 + self.prior_row[k]) / denom;
            let doc_part = self.doc_topic[(doc, k)] as f64 + self.alpha[k];
            total += word_part * doc_part;
            self.cumulative[k] = total;
        }
        if !total.is_finite() || total <= 0.0 {
            return Err(LdaError::NumericInstability(format!(
                "topic scores for document {}, feature {} sum to {}",
                doc, word, total
            )));
        }
        let u = rng.gen::<f64>() * total;
        Ok(self
            .cumulative
            .iter()
            .position(|&c| u < c)
            .unwrap_or(n_topics - 1))
    }

    /// K × V topic-word distribution.
    pub fn phi(&self) -> Array2<f64> {
        let (n_words, n_topics) = self.word_topic.dim();
        let mut phi = Array2::<f64>::zeros((n_topics, n_words));
        for k in 0..n_topics {
            let denom = self.topic_totals[k] as f64 + self.prior_sums[k];
            for w in 0..n_words {
                phi[(k, w)] = (self.word_topic[(w, k)] as f64 + self.beta) / denom;
            }
        }
        if let Some(s) = self.seeds {
            for w in 0..n_words {
                for &(k, value) in s.row(w) {
                    let denom = self.topic_totals[k] as f64 + self.prior_sums[k];
                    phi[(k, w)] += value / denom;
                }
            }
        }
        phi
    }

    /// D × K document-topic distribution.
    pub fn theta(&self) -> Array2<f64> {
        let (n_docs, n_topics) = self.doc_topic.dim();
        let mut theta = Array2::<f64>::zeros((n_docs, n_topics));
        for d in 0..n_docs {
            let denom = self.doc_lengths[d] as f64 + self.alpha_sum;
            for k in 0..n_topics {
                theta[(d, k)] = (self.doc_topic[(d, k)] as f64 + self.alpha[k]) / denom;
            }
        }
        theta
    }

    /// Log-likelihood of the corpus under the current point estimates,
    /// `Σ_d Σ_w n_dw ln Σ_k theta_dk phi_kw`.
    pub fn log_likelihood(&self) -> f64 {
        let n_topics = self.n_topics();
        let mut total = 0.0;
        for d in 0..self.dfm.n_documents() {
            let doc_denom = self.doc_lengths[d] as f64 + self.alpha_sum;
            for (w, count) in self.dfm.row(d) {
                let mut p = 0.0;
                for k in 0..n_topics {
                    let theta = (self.doc_topic[(d, k)] as f64 + self.alpha[k]) / doc_denom;
                    let phi = (self.word_topic[(w, k)] as f64 + self.prior(w, k))
                        / (self.topic_totals[k] as f64 + self.prior_sums[k]);
                    p += theta * phi;
                }
                total += count as f64 * p.ln();
            }
        }
        total
    }

    /// Recount every table from the assignments and compare.
    pub fn check_invariants(&self) -> Result<(), LdaError> {
        let mut word_topic = Array2::<u32>::zeros(self.word_topic.dim());
        let mut doc_topic = Array2::<u32>::zeros(self.doc_topic.dim());
        let mut topic_totals = vec![0u64; self.n_topics()];
        for cell in &self.cells {
            for &k in &self.assignments[cell.offset..cell.offset + cell.len] {
                let k = k as usize;
                word_topic[(cell.word, k)] += 1;
                doc_topic[(cell.doc, k)] += 1;
                topic_totals[k] += 1;
            }
        }
        if word_topic != self.word_topic {
            return Err(LdaError::Shape("word-topic counts out of sync".into()));
        }
        if doc_topic != self.doc_topic {
            return Err(LdaError::Shape("document-topic counts out of sync".into()));
        }
        if topic_totals != self.topic_totals {
            return Err(LdaError::Shape("topic totals out of sync".into()));
        }
        let freq = self.dfm.feature_frequencies();
        for (w, row) in self.word_topic.outer_iter().enumerate() {
            if row.iter().map(|&c| c as u64).sum::<u64>() != freq[w] {
                return Err(LdaError::Shape(format!(
                    "word-topic row {} does not sum to the feature frequency",
                    w
                )));
            }
        }
        for (d, row) in self.doc_topic.outer_iter().enumerate() {
            if row.iter().map(|&c| c as u64).sum::<u64>() != self.doc_lengths[d] {
                return Err(LdaError::Shape(format!(
                    "document-topic row {} does not sum to the document length",
                    d
                )));
            }
        }
        Ok(())
    }
}

/// Sweep until `max_iter` (or convergence, when `tol` is set) and summarise.
pub fn run_sampler(
    mut state: SamplerState<'_>,
    settings: &SamplerSettings,
    rng: &mut StdRng,
) -> Result<SamplerOutput, LdaError> {
    let n_tokens = state.n_tokens().max(1) as f64;
    let mut previous: Option<f64> = None;
    let mut iterations = 0;
    while iterations < settings.max_iter {
        state.sweep(rng)?;
        iterations += 1;
        if settings.log_every == 0 || iterations % settings.log_every != 0 {
            continue;
        }
        let ll = state.log_likelihood();
        let perplexity = (-ll / n_tokens).exp();
        if settings.verbose {
            info!(
                iteration = iterations,
                max_iter = settings.max_iter,
                log_likelihood = ll,
                perplexity,
                "gibbs sweep"
            );
        } else {
            debug!(
                iteration = iterations,
                max_iter = settings.max_iter,
                log_likelihood = ll,
                perplexity,
                "gibbs sweep"
            );
        }
        if let (Some(tol), Some(prev)) = (settings.tol, previous) {
            if (ll - prev).abs() <= tol * prev.abs() {
                if settings.verbose {
                    info!(iteration = iterations, "log-likelihood converged");
                }
                break;
            }
        }
        previous = Some(ll);
    }

    let log_likelihood = state.log_likelihood();
    if !log_likelihood.is_finite() {
        return Err(LdaError::NumericInstability(format!(
            "final log-likelihood is {}",
            log_likelihood
        )));
    }
    Ok(SamplerOutput {
        phi: state.phi(),
        theta: state.theta(),
        topic_totals: state.topic_totals.clone(),
        iterations,
        log_likelihood,
    })
}
