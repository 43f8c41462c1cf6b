use crate::core::dictionary::SeedDictionary;
use crate::lda::error::LdaError;
use std::path::Path;

/// Read a TOML seed dictionary made of `[[topic]]` tables.
pub fn load_dictionary(path: &Path) -> Result<SeedDictionary, LdaError> {
    let contents = std::fs::read_to_string(path)?;
    SeedDictionary::from_toml_str(&contents).map_err(|e| match e {
        LdaError::InvalidArgument(msg) => {
            LdaError::InvalidArgument(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_dictionary_file() {
        let mut file = NamedTempFile::new().unwrap();
        let contents = r#"
[[topic]]
name = "space"
patterns = ["planet*"]

[[topic]]
name = "food"
patterns = ["apple", "bread"]
"#;
        write!(file, "{}", contents).unwrap();
        let dict = load_dictionary(file.path()).unwrap();
        assert_eq!(dict.names(), vec!["space", "food"]);
    }

    #[test]
    fn reports_path_for_malformed_dictionaries() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not = \"a dictionary\"").unwrap();
        let err = load_dictionary(file.path()).unwrap_err();
        assert!(matches!(err, LdaError::InvalidArgument(_)));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
