use crate::core::dfm::DocumentFeatureMatrix;
use crate::core::dictionary::SeedDictionary;
use crate::lda::error::LdaError;
use crate::lda::model::LdaModel;
use crate::lda::priors::Priors;
use crate::lda::sampler::{run_sampler, SamplerSettings, SamplerState};
use crate::lda::seeds::{build_seed_matrix, SeedMatrix, Seeding};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Fit an unsupervised LDA model with `k` topics labelled `topic1..topicK`.
pub fn fit_lda(
    dfm: &DocumentFeatureMatrix,
    k: usize,
    priors: &Priors,
    settings: &SamplerSettings,
) -> Result<LdaModel, LdaError> {
    if k == 0 {
        return Err(LdaError::invalid("k must be larger than zero"));
    }
    let labels = (1..=k).map(|i| format!("topic{}", i)).collect();
    fit_inner(dfm, labels, None, None, priors, settings)
}

/// Fit a seeded LDA model: one topic per dictionary entry, plus `other` when
/// a residual topic is requested.
pub fn fit_seeded_lda(
    dfm: &DocumentFeatureMatrix,
    dictionary: &SeedDictionary,
    seeding: &Seeding,
    priors: &Priors,
    settings: &SamplerSettings,
) -> Result<LdaModel, LdaError> {
    let seeds = build_seed_matrix(dfm.features(), dfm.total(), dictionary, seeding)?;
    debug!(
        topics = seeds.n_topics(),
        seeded_cells = seeds.nnz(),
        weight = seeding.weight,
        "built seed matrix"
    );
    fit_inner(
        dfm,
        seeds.topics().to_vec(),
        Some(&seeds),
        Some(seeding.weight),
        priors,
        settings,
    )
}

/// Fit with a prebuilt seed matrix. Its rows must be the matrix features.
pub fn fit_with_seeds(
    dfm: &DocumentFeatureMatrix,
    seeds: &SeedMatrix,
    priors: &Priors,
    settings: &SamplerSettings,
) -> Result<LdaModel, LdaError> {
    fit_inner(
        dfm,
        seeds.topics().to_vec(),
        Some(seeds),
        None,
        priors,
        settings,
    )
}

fn fit_inner(
    dfm: &DocumentFeatureMatrix,
    labels: Vec<String>,
    seeds: Option<&SeedMatrix>,
    seed_weight: Option<f64>,
    priors: &Priors,
    settings: &SamplerSettings,
) -> Result<LdaModel, LdaError> {
    if let Some(s) = seeds {
        s.ensure_matches(dfm.features())?;
    }
    let resolved = priors.resolve(labels.len())?;
    settings.validate()?;

    let mut rng = StdRng::seed_from_u64(settings.random_seed);
    let state = SamplerState::initialize(dfm, seeds, &resolved, &mut rng)?;
    if settings.verbose {
        info!(
            documents = dfm.n_documents(),
            features = dfm.n_features(),
            topics = labels.len(),
            tokens = state.n_tokens(),
            max_iter = settings.max_iter,
            "fitting LDA by collapsed Gibbs sampling"
        );
    }
    let output = run_sampler(state, settings, &mut rng)?;
    if settings.verbose {
        info!(
            iterations = output.iterations,
            log_likelihood = output.log_likelihood,
            "sampling finished"
        );
    }
    Ok(LdaModel::from_output(
        labels,
        dfm.features().to_vec(),
        dfm.documents().to_vec(),
        resolved.alpha.clone(),
        resolved.beta,
        seeds.is_some(),
        seed_weight,
        *settings,
        output,
    ))
}
