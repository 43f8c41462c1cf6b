use crate::cli::{delimiter_byte, SamplerArgs};
use crate::core::dfm::DocumentFeatureMatrix;
use crate::io;
use crate::lda::{Alpha, LdaModel, Priors, SamplerSettings};
use anyhow::{anyhow, Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::info;

pub fn log_step(msg: impl AsRef<str>) {
    info!("{}", msg.as_ref());
}

pub fn delimiter(arg: &str) -> Result<u8> {
    delimiter_byte(arg).ok_or_else(|| anyhow!("delimiter must not be empty"))
}

pub fn priors(args: &SamplerArgs) -> Priors {
    let alpha = match args.alpha.as_slice() {
        [] => None,
        [value] => Some(Alpha::Symmetric(*value)),
        values => Some(Alpha::PerTopic(values.to_vec())),
    };
    Priors {
        alpha,
        beta: Some(args.beta),
    }
}

pub fn settings(args: &SamplerArgs) -> SamplerSettings {
    SamplerSettings {
        max_iter: args.max_iter,
        random_seed: args.seed,
        verbose: args.verbose,
        log_every: args.log_every,
        tol: args.tol,
    }
}

pub fn load_matrix(path: &Path, delimiter: u8) -> Result<DocumentFeatureMatrix> {
    log_step(format!("Loading document-feature matrix {}", path.display()));
    let dfm = io::load_dfm(path, delimiter)
        .with_context(|| format!("failed to read document-feature matrix {}", path.display()))?;
    log_step(describe_dfm(&dfm));
    Ok(dfm)
}

pub fn load_model(path: &Path) -> Result<LdaModel> {
    io::read_model(path).with_context(|| format!("failed to read model {}", path.display()))
}

pub fn describe_dfm(dfm: &DocumentFeatureMatrix) -> String {
    let cells = dfm.n_documents() * dfm.n_features();
    let density = if cells == 0 {
        0.0
    } else {
        dfm.nnz() as f64 / cells as f64
    };
    format!(
        "documents = {}, features = {}, tokens = {}, density = {:.3}",
        dfm.n_documents(),
        dfm.n_features(),
        dfm.total(),
        density
    )
}

/// Write the model and, if requested, its document-topic proportions.
pub fn write_fit_outputs(
    model: &LdaModel,
    started: Instant,
    output_model: &Path,
    output_theta: Option<&Path>,
    delimiter: u8,
) -> Result<()> {
    log_step(format!(
        "Fit complete in {:.2?}: log-likelihood = {:.4}, iterations = {}",
        started.elapsed(),
        model.log_likelihood(),
        model.iterations()
    ));
    ensure_parent(output_model)?;
    log_step(format!("Writing model to {}", output_model.display()));
    io::write_model(output_model, model)
        .with_context(|| format!("failed to write model {}", output_model.display()))?;
    if let Some(path) = output_theta {
        ensure_parent(path)?;
        log_step(format!("Writing topic proportions to {}", path.display()));
        io::write_theta(path, model.documents(), model.labels(), model.theta(), delimiter)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

/// Buffered writer for `path`, or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            ensure_parent(path)?;
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout().lock()))),
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
