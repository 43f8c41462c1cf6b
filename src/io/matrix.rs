use crate::core::dfm::DocumentFeatureMatrix;
use crate::lda::error::LdaError;
use csv::{ReaderBuilder, Trim};
use std::path::Path;

/// Load a document-feature matrix from delimited text.
///
/// The header row is `doc_id` followed by the feature names; every other row
/// holds a document name and its counts. Empty cells count as zero.
pub fn load_dfm(path: &Path, delimiter: u8) -> Result<DocumentFeatureMatrix, LdaError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .flexible(true)
        .from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(LdaError::Parse(format!("{} has no header row", path.display())));
    }
    let features: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();

    let mut documents = Vec::new();
    let mut triplets = Vec::new();
    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        let doc = documents.len();
        let name = record
            .get(0)
            .ok_or_else(|| {
                LdaError::Parse(format!("row {} is missing the document id", row_idx + 1))
            })?
            .to_string();
        documents.push(name);
        if record.len() != features.len() + 1 {
            return Err(LdaError::Parse(format!(
                "row {} has {} counts, expected {}",
                row_idx + 1,
                record.len().saturating_sub(1),
                features.len()
            )));
        }
        for (w, field) in record.iter().skip(1).enumerate() {
            if field.is_empty() {
                continue;
            }
            let count: u32 = field.parse().map_err(|e| {
                LdaError::Parse(format!(
                    "failed to parse count `{}` at row {}, column {}: {}",
                    field,
                    row_idx + 1,
                    w + 2,
                    e
                ))
            })?;
            if count > 0 {
                triplets.push((doc, w, count));
            }
        }
    }
    DocumentFeatureMatrix::from_triplets(documents, features, triplets)
}
