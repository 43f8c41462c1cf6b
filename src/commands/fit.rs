use crate::cli::{FitArgs, FitSeededArgs};
use crate::commands::shared::{self, log_step};
use crate::core::dictionary::PatternMode;
use crate::io::load_dictionary;
use crate::lda::{fit_lda, fit_seeded_lda, Seeding};
use anyhow::{Context, Result};
use std::time::Instant;

pub fn run(args: FitArgs) -> Result<()> {
    let delimiter = shared::delimiter(&args.delimiter)?;
    let dfm = shared::load_matrix(&args.dfm, delimiter)?;
    let priors = shared::priors(&args.sampler);
    let settings = shared::settings(&args.sampler);
    log_step(format!(
        "Fitting LDA with K = {} (max_iter = {}, seed = {})",
        args.topics, settings.max_iter, settings.random_seed
    ));
    let started = Instant::now();
    let model = fit_lda(&dfm, args.topics, &priors, &settings)?;
    shared::write_fit_outputs(
        &model,
        started,
        &args.output_model,
        args.output_theta.as_deref(),
        delimiter,
    )
}

pub fn run_seeded(args: FitSeededArgs) -> Result<()> {
    let delimiter = shared::delimiter(&args.delimiter)?;
    let dfm = shared::load_matrix(&args.dfm, delimiter)?;
    log_step(format!("Loading seed dictionary {}", args.dictionary.display()));
    let dictionary = load_dictionary(&args.dictionary)
        .with_context(|| format!("failed to read dictionary {}", args.dictionary.display()))?;
    let seeding = Seeding {
        mode: args.valuetype.parse::<PatternMode>()?,
        case_sensitive: args.case_sensitive,
        residual: args.residual,
        weight: args.weight,
    };
    let priors = shared::priors(&args.sampler);
    let settings = shared::settings(&args.sampler);
    log_step(format!(
        "Fitting seeded LDA with {} seeded topic(s){} (weight = {}, max_iter = {}, seed = {})",
        dictionary.len(),
        if seeding.residual { " plus a residual topic" } else { "" },
        seeding.weight,
        settings.max_iter,
        settings.random_seed
    ));
    let started = Instant::now();
    let model = fit_seeded_lda(&dfm, &dictionary, &seeding, &priors, &settings)?;
    shared::write_fit_outputs(
        &model,
        started,
        &args.output_model,
        args.output_theta.as_deref(),
        delimiter,
    )
}
