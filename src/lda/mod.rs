//! Topic models fitted by collapsed Gibbs sampling, with optional seed words.

pub mod error;
pub mod fit;
pub mod infer;
pub mod model;
pub mod priors;
pub mod sampler;
pub mod seeds;

pub use error::LdaError;
pub use fit::{fit_lda, fit_seeded_lda, fit_with_seeds};
pub use infer::{infer_topics, InferredTopics};
pub use model::{LdaModel, ModelFile, TermTable};
pub use priors::{Alpha, Priors};
pub use sampler::SamplerSettings;
pub use seeds::{build_seed_matrix, SeedMatrix, Seeding, RESIDUAL_TOPIC};
