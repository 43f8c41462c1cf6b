use crate::lda::error::LdaError;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse document-feature count matrix.
///
/// Rows are documents and columns are features. Only nonzero cells are
/// stored, row-compressed, with feature indices ascending inside each row.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentFeatureMatrix {
    documents: Vec<String>,
    features: Vec<String>,
    /// Row offsets into `indices`/`counts`, length `n_documents + 1`.
    indptr: Vec<usize>,
    indices: Vec<usize>,
    counts: Vec<u32>,
}

impl DocumentFeatureMatrix {
    /// Build a matrix from `(document, feature, count)` triplets.
    ///
    /// Repeated cells are summed and zero counts are dropped.
    pub fn from_triplets<I>(
        documents: Vec<String>,
        features: Vec<String>,
        triplets: I,
    ) -> Result<Self, LdaError>
    where
        I: IntoIterator<Item = (usize, usize, u32)>,
    {
        check_unique_features(&features)?;
        let n_docs = documents.len();
        let n_feats = features.len();
        let mut rows: Vec<BTreeMap<usize, u32>> = vec![BTreeMap::new(); n_docs];
        for (d, w, count) in triplets {
            if d >= n_docs {
                return Err(LdaError::Shape(format!(
                    "document index {} out of bounds for {} documents",
                    d, n_docs
                )));
            }
            if w >= n_feats {
                return Err(LdaError::Shape(format!(
                    "feature index {} out of bounds for {} features",
                    w, n_feats
                )));
            }
            if count == 0 {
                continue;
            }
            let cell = rows[d].entry(w).or_insert(0);
            *cell = cell.checked_add(count).ok_or_else(|| {
                LdaError::Shape(format!("count overflow at document {}, feature {}", d, w))
            })?;
        }

        let mut indptr = Vec::with_capacity(n_docs + 1);
        let mut indices = Vec::new();
        let mut counts = Vec::new();
        indptr.push(0);
        for row in rows {
            for (w, c) in row {
                indices.push(w);
                counts.push(c);
            }
            indptr.push(indices.len());
        }
        Ok(Self {
            documents,
            features,
            indptr,
            indices,
            counts,
        })
    }

    /// Build a matrix from dense rows, one per document.
    pub fn from_dense(
        documents: Vec<String>,
        features: Vec<String>,
        rows: &[Vec<u32>],
    ) -> Result<Self, LdaError> {
        if rows.len() != documents.len() {
            return Err(LdaError::Shape(format!(
                "{} rows supplied for {} documents",
                rows.len(),
                documents.len()
            )));
        }
        let mut triplets = Vec::new();
        for (d, row) in rows.iter().enumerate() {
            if row.len() != features.len() {
                return Err(LdaError::Shape(format!(
                    "row {} has {} columns, expected {}",
                    d,
                    row.len(),
                    features.len()
                )));
            }
            triplets.extend(
                row.iter()
                    .enumerate()
                    .filter(|(_, c)| **c > 0)
                    .map(|(w, c)| (d, w, *c)),
            );
        }
        Self::from_triplets(documents, features, triplets)
    }

    pub fn n_documents(&self) -> usize {
        self.documents.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Number of stored nonzero cells.
    pub fn nnz(&self) -> usize {
        self.counts.len()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Nonzero `(feature, count)` cells of document `d`, feature ascending.
    pub fn row(&self, d: usize) -> impl Iterator<Item = (usize, u32)> + '_ {
        let (start, end) = (self.indptr[d], self.indptr[d + 1]);
        self.indices[start..end]
            .iter()
            .copied()
            .zip(self.counts[start..end].iter().copied())
    }

    pub fn get(&self, d: usize, w: usize) -> u32 {
        let (start, end) = (self.indptr[d], self.indptr[d + 1]);
        match self.indices[start..end].binary_search(&w) {
            Ok(pos) => self.counts[start + pos],
            Err(_) => 0,
        }
    }

    pub fn document_length(&self, d: usize) -> u64 {
        self.row(d).map(|(_, c)| c as u64).sum()
    }

    /// Grand sum of all cells.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Corpus frequency of every feature.
    pub fn feature_frequencies(&self) -> Vec<u64> {
        let mut freq = vec![0u64; self.n_features()];
        for (&w, &c) in self.indices.iter().zip(&self.counts) {
            freq[w] += c as u64;
        }
        freq
    }

    /// Reindex onto another vocabulary.
    ///
    /// Features absent from `features` are dropped; features absent from this
    /// matrix become empty columns. Document order is kept.
    pub fn conform_to(&self, features: &[String]) -> Result<Self, LdaError> {
        let lookup: HashMap<&str, usize> = features
            .iter()
            .enumerate()
            .map(|(i, f)| (f.as_str(), i))
            .collect();
        let mut triplets = Vec::with_capacity(self.nnz());
        for d in 0..self.n_documents() {
            for (w, c) in self.row(d) {
                if let Some(&target) = lookup.get(self.features[w].as_str()) {
                    triplets.push((d, target, c));
                }
            }
        }
        Self::from_triplets(self.documents.clone(), features.to_vec(), triplets)
    }
}

fn check_unique_features(features: &[String]) -> Result<(), LdaError> {
    let mut seen = HashSet::with_capacity(features.len());
    for name in features {
        if !seen.insert(name.as_str()) {
            return Err(LdaError::Shape(format!("duplicate feature name `{}`", name)));
        }
    }
    Ok(())
}
