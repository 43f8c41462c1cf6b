use crate::lda::error::LdaError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BETA: f64 = 0.1;

/// Document-topic Dirichlet concentration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Alpha {
    Symmetric(f64),
    PerTopic(Vec<f64>),
}

/// Dirichlet hyperparameters for documents (alpha) and topics (beta).
///
/// Unset values fall back to alpha = 50 / K and beta = 0.1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Priors {
    pub alpha: Option<Alpha>,
    pub beta: Option<f64>,
}

/// Priors resolved against a concrete topic count.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPriors {
    pub alpha: Vec<f64>,
    pub beta: f64,
}

impl ResolvedPriors {
    pub fn alpha_sum(&self) -> f64 {
        self.alpha.iter().sum()
    }
}

impl Priors {
    pub fn symmetric(alpha: f64, beta: f64) -> Self {
        Self {
            alpha: Some(Alpha::Symmetric(alpha)),
            beta: Some(beta),
        }
    }

    pub fn resolve(&self, n_topics: usize) -> Result<ResolvedPriors, LdaError> {
        if n_topics == 0 {
            return Err(LdaError::invalid("k must be larger than zero"));
        }
        let alpha = match &self.alpha {
            None => vec![50.0 / n_topics as f64; n_topics],
            Some(Alpha::Symmetric(a)) => vec![*a; n_topics],
            Some(Alpha::PerTopic(values)) => {
                if values.len() != n_topics {
                    return Err(LdaError::invalid(format!(
                        "alpha has {} values but the model has {} topics",
                        values.len(),
                        n_topics
                    )));
                }
                values.clone()
            }
        };
        if alpha.iter().any(|a| !a.is_finite() || *a <= 0.0) {
            return Err(LdaError::invalid("alpha must be positive"));
        }
        let beta = self.beta.unwrap_or(DEFAULT_BETA);
        if !beta.is_finite() || beta <= 0.0 {
            return Err(LdaError::invalid("beta must be positive"));
        }
        Ok(ResolvedPriors { alpha, beta })
    }
}
