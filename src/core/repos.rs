//! Repository list loader
//!
//! Parses a newline-delimited plugin repository list into
//! [`RepositoryEntry`] values. Parsing is pure and order-preserving:
//! feeding the same input twice yields the same output.

use std::collections::{HashMap, HashSet};

/// One repository to clone, derived from a raw line of the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryEntry {
    /// The URL exactly as written in the list
    pub source_url: String,

    /// On-disk directory name the repository is cloned into
    pub destination_name: String,

    /// Name of the special-case rule that overrode the destination, if any
    pub special_case: Option<String>,
}

/// Non-fatal problem encountered while parsing a repository list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseWarning {
    /// A later line normalized to a destination already claimed this run;
    /// the first occurrence wins.
    DuplicateDestination {
        line: String,
        destination: String,
        kept_url: String,
    },
    /// The line produced no usable directory name
    EmptyDestination { line: String },
}

/// Result of one parse call
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub entries: Vec<RepositoryEntry>,
    pub warnings: Vec<ParseWarning>,
}

/// Parses plugin repository lists
///
/// Special cases map a known repository basename (case-insensitive,
/// `.git` ignored) to a fixed destination directory, for plugins whose
/// repository name differs from the directory the application expects.
#[derive(Debug, Clone, Default)]
pub struct RepoListLoader {
    special_cases: HashMap<String, String>,
}

impl RepoListLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register special-case destination overrides, keyed by basename
    pub fn with_special_cases<I, K, V>(cases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let special_cases = cases
            .into_iter()
            .map(|(k, v)| (k.into().to_lowercase(), v.into()))
            .collect();
        Self { special_cases }
    }

    /// Parse raw lines into ordered repository entries
    ///
    /// Blank lines and `#`-comments are skipped; trailing whitespace and
    /// carriage returns are trimmed. Duplicate destinations (compared
    /// case-insensitively) keep the first occurrence and flag the rest.
    pub fn parse<'a, I>(&self, lines: I) -> ParseOutcome
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut outcome = ParseOutcome::default();
        let mut claimed: HashSet<String> = HashSet::new();
        let mut kept_by_key: HashMap<String, String> = HashMap::new();

        for raw in lines {
            let line = raw.trim_end_matches(['\r', ' ', '\t']);
            if line.is_empty() || line.trim_start().starts_with('#') {
                continue;
            }

            let basename = url_basename(line);
            if basename.is_empty() {
                outcome.warnings.push(ParseWarning::EmptyDestination {
                    line: line.to_string(),
                });
                continue;
            }

            let special_case = self.special_cases.get(&basename.to_lowercase()).cloned();
            let destination_name = special_case.clone().unwrap_or(basename);

            let key = destination_name.to_lowercase();
            if !claimed.insert(key.clone()) {
                outcome.warnings.push(ParseWarning::DuplicateDestination {
                    line: line.to_string(),
                    destination: destination_name,
                    kept_url: kept_by_key.get(&key).cloned().unwrap_or_default(),
                });
                continue;
            }
            kept_by_key.insert(key, line.to_string());

            outcome.entries.push(RepositoryEntry {
                source_url: line.to_string(),
                destination_name,
                special_case: special_case.map(|_| basename_key(line)),
            });
        }

        outcome
    }
}

/// Last path segment of a repository URL, without a trailing `.git`
fn url_basename(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let segment = trimmed.rsplit('/').next().unwrap_or(trimmed);
    segment
        .strip_suffix(".git")
        .unwrap_or(segment)
        .to_string()
}

fn basename_key(url: &str) -> String {
    url_basename(url).to_lowercase()
}
