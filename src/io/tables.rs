use crate::lda::error::LdaError;
use crate::lda::model::TermTable;
use ndarray::Array2;
use std::path::Path;

/// Write document-topic proportions: `doc_id` plus one column per topic.
pub fn write_theta(
    path: &Path,
    documents: &[String],
    labels: &[String],
    theta: &Array2<f64>,
    delimiter: u8,
) -> Result<(), LdaError> {
    if theta.dim() != (documents.len(), labels.len()) {
        return Err(LdaError::Shape(format!(
            "theta is {:?} but there are {} documents and {} topics",
            theta.dim(),
            documents.len(),
            labels.len()
        )));
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;
    let mut header = vec!["doc_id".to_string()];
    header.extend(labels.iter().cloned());
    writer.write_record(&header)?;
    for (name, row) in documents.iter().zip(theta.outer_iter()) {
        let mut record = vec![name.clone()];
        record.extend(row.iter().map(|v| format!("{:.6}", v)));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a term table with one column per topic and one row per rank.
pub fn write_terms<W: std::io::Write>(
    out: W,
    terms: &TermTable,
    delimiter: u8,
) -> Result<(), LdaError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);
    writer.write_record(&terms.labels)?;
    for rank in 0..terms.n_rows() {
        writer.write_record(terms.columns.iter().map(|col| col[rank].as_str()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write `doc_id` and the dominant topic label of every document.
pub fn write_topics<W: std::io::Write>(
    out: W,
    documents: &[String],
    topics: &[String],
    delimiter: u8,
) -> Result<(), LdaError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(out);
    writer.write_record(["doc_id", "topic"])?;
    for (doc, topic) in documents.iter().zip(topics) {
        writer.write_record([doc.as_str(), topic.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn term_table_is_written_row_by_rank() {
        let terms = TermTable {
            labels: vec!["a".into(), "b".into()],
            columns: vec![
                vec!["x".into(), "y".into()],
                vec!["z".into(), "w".into()],
            ],
        };
        let mut buf = Vec::new();
        write_terms(&mut buf, &terms, b'\t').unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a\tb\nx\tz\ny\tw\n");
    }

    #[test]
    fn topics_are_written_per_document() {
        let mut buf = Vec::new();
        write_topics(
            &mut buf,
            &["d1".to_string(), "d2".to_string()],
            &["space".to_string(), "other".to_string()],
            b',',
        )
        .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "doc_id,topic\nd1,space\nd2,other\n");
    }
}
