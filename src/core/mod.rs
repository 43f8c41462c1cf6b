pub mod dfm;
pub mod dictionary;

pub use dfm::DocumentFeatureMatrix;
pub use dictionary::{resolve_patterns, PatternMatcher, PatternMode, SeedDictionary, SeedTopic};
