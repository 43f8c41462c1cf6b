use crate::lda::error::LdaError;
use crate::lda::model::{LdaModel, ModelFile};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

pub fn write_model(path: &Path, model: &LdaModel) -> Result<(), LdaError> {
    let mut file = File::create(path)?;
    let serialized = serde_json::to_string_pretty(&model.to_file())?;
    file.write_all(serialized.as_bytes())?;
    Ok(())
}

pub fn read_model(path: &Path) -> Result<LdaModel, LdaError> {
    let file = File::open(path)?;
    let model: ModelFile = serde_json::from_reader(BufReader::new(file))?;
    LdaModel::from_file(model)
}
