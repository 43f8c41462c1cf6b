use crate::cli::InferArgs;
use crate::commands::shared::{self, log_step};
use crate::io::write_theta;
use crate::lda::{infer_topics, SamplerSettings};
use anyhow::{Context, Result};
use std::time::Instant;

pub fn run(args: InferArgs) -> Result<()> {
    let delimiter = shared::delimiter(&args.delimiter)?;
    let model = shared::load_model(&args.model)?;
    log_step(format!("Loaded model: {}", model.to_string().replace('\n', " ")));
    let dfm = shared::load_matrix(&args.dfm, delimiter)?;
    let fitted = model.settings();
    let settings = SamplerSettings {
        max_iter: args.max_iter.unwrap_or(fitted.max_iter),
        random_seed: args.seed.unwrap_or(fitted.random_seed),
        ..*fitted
    };
    log_step(format!(
        "Inferring topics for {} document(s) (max_iter = {}, threads = {})",
        dfm.n_documents(),
        settings.max_iter,
        args.threads
    ));
    let started = Instant::now();
    let inferred = infer_topics(&model, &dfm, &settings, args.threads)?;
    log_step(format!("Inference complete in {:.2?}", started.elapsed()));
    log_step(format!("Writing topic proportions to {}", args.output.display()));
    write_theta(
        &args.output,
        &inferred.documents,
        &inferred.labels,
        &inferred.theta,
        delimiter,
    )
    .with_context(|| format!("failed to write {}", args.output.display()))?;
    Ok(())
}
