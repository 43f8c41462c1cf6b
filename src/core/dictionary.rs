use crate::lda::error::LdaError;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

/// How dictionary patterns are compared with feature names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternMode {
    /// `*` and `?` wildcards, matched against the whole feature name.
    #[default]
    Glob,
    /// Regular expression, matched anywhere in the feature name.
    Regex,
    /// Exact feature name.
    Fixed,
}

impl FromStr for PatternMode {
    type Err = LdaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "glob" => Ok(PatternMode::Glob),
            "regex" => Ok(PatternMode::Regex),
            "fixed" => Ok(PatternMode::Fixed),
            other => Err(LdaError::invalid(format!(
                "unknown pattern mode `{}` (expected glob, regex or fixed)",
                other
            ))),
        }
    }
}

impl fmt::Display for PatternMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PatternMode::Glob => "glob",
            PatternMode::Regex => "regex",
            PatternMode::Fixed => "fixed",
        };
        f.write_str(label)
    }
}

/// One dictionary entry: a topic name and the patterns that seed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedTopic {
    pub name: String,
    #[serde(default)]
    pub patterns: Vec<String>,
}

/// Ordered mapping from topic name to seed patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedDictionary {
    topics: Vec<SeedTopic>,
}

/// On-disk TOML shape: an array of `[[topic]]` tables.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct DictionaryFile {
    topic: Vec<SeedTopic>,
}

impl SeedDictionary {
    pub fn new(topics: Vec<SeedTopic>) -> Result<Self, LdaError> {
        if topics.is_empty() {
            return Err(LdaError::invalid("dictionary must contain at least one topic"));
        }
        let mut seen = HashSet::with_capacity(topics.len());
        for topic in &topics {
            if topic.name.trim().is_empty() {
                return Err(LdaError::invalid("dictionary topic names may not be empty"));
            }
            if !seen.insert(topic.name.as_str()) {
                return Err(LdaError::invalid(format!(
                    "duplicate dictionary topic `{}`",
                    topic.name
                )));
            }
        }
        Ok(Self { topics })
    }

    /// Build from `(name, patterns)` pairs, keeping their order.
    pub fn from_pairs<I, N, P>(pairs: I) -> Result<Self, LdaError>
    where
        I: IntoIterator<Item = (N, Vec<P>)>,
        N: Into<String>,
        P: Into<String>,
    {
        let topics = pairs
            .into_iter()
            .map(|(name, patterns)| SeedTopic {
                name: name.into(),
                patterns: patterns.into_iter().map(Into::into).collect(),
            })
            .collect();
        Self::new(topics)
    }

    /// Parse the TOML dictionary format.
    ///
    /// Anything that does not have the dictionary shape is an invalid
    /// argument, not a file error.
    pub fn from_toml_str(contents: &str) -> Result<Self, LdaError> {
        let file: DictionaryFile = toml::from_str(contents).map_err(|e| {
            LdaError::invalid(format!("value is not a seed dictionary: {}", e))
        })?;
        Self::new(file.topic)
    }

    pub fn topics(&self) -> &[SeedTopic] {
        &self.topics
    }

    pub fn names(&self) -> Vec<String> {
        self.topics.iter().map(|t| t.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// A compiled dictionary pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    pub fn compile(
        pattern: &str,
        mode: PatternMode,
        case_sensitive: bool,
    ) -> Result<Self, LdaError> {
        let source = match mode {
            PatternMode::Glob => glob_to_regex(pattern),
            PatternMode::Regex => pattern.to_string(),
            PatternMode::Fixed => format!("^{}$", regex::escape(pattern)),
        };
        let regex = RegexBuilder::new(&source)
            .case_insensitive(!case_sensitive)
            .build()
            .map_err(|e| LdaError::invalid(format!("invalid pattern `{}`: {}", pattern, e)))?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Indices of vocabulary entries matched by any of `patterns`, ascending and
/// without repeats.
pub fn resolve_patterns(
    patterns: &[String],
    vocabulary: &[String],
    mode: PatternMode,
    case_sensitive: bool,
) -> Result<Vec<usize>, LdaError> {
    let matchers = patterns
        .iter()
        .map(|p| PatternMatcher::compile(p, mode, case_sensitive))
        .collect::<Result<Vec<_>, _>>()?;
    let mut hits = BTreeSet::new();
    for matcher in &matchers {
        for (idx, name) in vocabulary.iter().enumerate() {
            if matcher.is_match(name) {
                hits.insert(idx);
            }
        }
    }
    Ok(hits.into_iter().collect())
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push('^');
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                out.push_str(&regex::escape(&literal));
                literal.clear();
                out.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    out.push_str(&regex::escape(&literal));
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn glob_matches_whole_name() {
        let v = vocab(&["planet", "planets", "aplanet", "plan.et"]);
        let hits = resolve_patterns(&["planet*".into()], &v, PatternMode::Glob, false).unwrap();
        assert_eq!(hits, vec![0, 1]);
        let dot = resolve_patterns(&["plan.et".into()], &v, PatternMode::Glob, false).unwrap();
        assert_eq!(dot, vec![3]);
        let single = resolve_patterns(&["planet?".into()], &v, PatternMode::Glob, false).unwrap();
        assert_eq!(single, vec![1]);
    }

    #[test]
    fn regex_searches_anywhere() {
        let v = vocab(&["spaceship", "cyberspace", "moon"]);
        let hits = resolve_patterns(&["space".into()], &v, PatternMode::Regex, true).unwrap();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn case_sensitivity_is_honoured() {
        let v = vocab(&["Alien", "alien"]);
        let insensitive =
            resolve_patterns(&["alien".into()], &v, PatternMode::Fixed, false).unwrap();
        assert_eq!(insensitive, vec![0, 1]);
        let sensitive = resolve_patterns(&["alien".into()], &v, PatternMode::Fixed, true).unwrap();
        assert_eq!(sensitive, vec![1]);
    }

    #[test]
    fn overlapping_patterns_do_not_repeat() {
        let v = vocab(&["alien", "aliens"]);
        let hits = resolve_patterns(
            &["alien*".into(), "alien".into()],
            &v,
            PatternMode::Glob,
            false,
        )
        .unwrap();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let err = PatternMatcher::compile("(", PatternMode::Regex, false).unwrap_err();
        assert!(matches!(err, LdaError::InvalidArgument(_)));
    }

    #[test]
    fn parses_toml_in_order() {
        let dict = SeedDictionary::from_toml_str(
            r#"
[[topic]]
name = "space"
patterns = ["space*", "planet*"]

[[topic]]
name = "economy"
patterns = ["market*"]
"#,
        )
        .unwrap();
        assert_eq!(dict.names(), vec!["space", "economy"]);
        assert_eq!(dict.topics()[0].patterns.len(), 2);
    }

    #[test]
    fn non_dictionary_values_are_invalid() {
        for bad in ["space = 3", "[[topic]]\npatterns = [\"a\"]", "topic = []"] {
            let err = SeedDictionary::from_toml_str(bad).unwrap_err();
            assert!(matches!(err, LdaError::InvalidArgument(_)), "{bad}");
        }
        let dup = SeedDictionary::from_pairs(vec![("a", vec!["x"]), ("a", vec!["y"])]);
        assert!(matches!(dup, Err(LdaError::InvalidArgument(_))));
    }
}
