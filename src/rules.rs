//! Exclusion rules for the cleaning stage.
//!
//! Rules live in a YAML document with a single meaningful key:
//!
//! ```yaml
//! skip_messages:
//!   whatsapp:
//!     encrypted: "Messages and calls are end-to-end encrypted"
//!     media: "<Media omitted>"
//!   custom:
//!     bot: "[bot]"
//! ```
//!
//! Each category maps pattern names to literal text. Pattern text is **never**
//! interpreted as a regular expression: `[bot]` matches the five characters
//! `[bot]`, not one of `b`, `o`, `t`. Matching is a case-insensitive substring
//! search.
//!
//! Where the document comes from is decided by the caller through
//! [`RuleSource`]. [`RuleSource::default`] points at `config.yaml` in the
//! working directory.
//!
//! # Example
//!
//! ```rust
//! use chatsift::rules::{RuleSet, RuleSource};
//!
//! let source = RuleSource::inline("skip_messages:\n  system:\n    joined: 'SYSTEM:'\n");
//! let rules = RuleSet::load(&source)?;
//! let matcher = rules.matcher()?;
//!
//! assert!(matcher.is_match(Some("system: Bob joined")));
//! assert!(!matcher.is_match(Some("hello")));
//! # Ok::<(), chatsift::ChatsiftError>(())
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use serde_yaml::{Mapping, Value};
use tracing::{debug, error, warn};

use crate::error::ChatsiftError;

/// Conventional location of the rule document, relative to the working directory.
pub const DEFAULT_RULES_PATH: &str = "config.yaml";

/// Top-level key holding the exclusion categories.
pub const SKIP_MESSAGES_KEY: &str = "skip_messages";

/// Where to read the exclusion rules from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// A YAML file on disk.
    Path(PathBuf),
    /// A YAML document already in memory.
    Inline(String),
}

impl RuleSource {
    /// Creates a file-backed source.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        RuleSource::Path(path.into())
    }

    /// Creates an in-memory source.
    pub fn inline(document: impl Into<String>) -> Self {
        RuleSource::Inline(document.into())
    }

    /// Returns the file path, if this source is file-backed.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            RuleSource::Path(p) => Some(p),
            RuleSource::Inline(_) => None,
        }
    }
}

impl Default for RuleSource {
    fn default() -> Self {
        RuleSource::Path(PathBuf::from(DEFAULT_RULES_PATH))
    }
}

impl std::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSource::Path(p) => write!(f, "{}", p.display()),
            RuleSource::Inline(_) => write!(f, "<inline>"),
        }
    }
}

/// A loaded exclusion rule document.
///
/// Holds the raw `skip_messages` mapping in document order. Use
/// [`patterns`](Self::patterns) for the flattened literal list or
/// [`matcher`](Self::matcher) for a compiled matcher.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    categories: Mapping,
}

impl RuleSet {
    /// Creates an empty rule set. Cleaning with it only drops incomplete records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads and parses the rule document from `source`.
    ///
    /// # Errors
    ///
    /// - [`ChatsiftError::ConfigNotFound`] if the file does not exist
    /// - [`ChatsiftError::ConfigMalformed`] if the document is not valid YAML
    /// - [`ChatsiftError::Io`] for any other read failure
    pub fn load(source: &RuleSource) -> Result<Self, ChatsiftError> {
        match source {
            RuleSource::Path(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    if e.kind() == io::ErrorKind::NotFound {
                        error!(path = %path.display(), "rule document not found");
                        ChatsiftError::config_not_found(path)
                    } else {
                        error!(path = %path.display(), error = %e, "failed to read rule document");
                        ChatsiftError::Io(e)
                    }
                })?;
                let rules = Self::parse(&content, Some(path))?;
                debug!(path = %path.display(), "rule document loaded");
                Ok(rules)
            }
            RuleSource::Inline(document) => Self::parse(document, None),
        }
    }

    /// Parses a rule document from a YAML string.
    pub fn from_yaml_str(document: &str) -> Result<Self, ChatsiftError> {
        Self::parse(document, None)
    }

    fn parse(document: &str, path: Option<&Path>) -> Result<Self, ChatsiftError> {
        if document.trim().is_empty() {
            return Ok(Self::new());
        }

        let root: Value = serde_yaml::from_str(document).map_err(|e| {
            let origin = path.map_or_else(|| "<inline>".to_string(), |p| p.display().to_string());
            error!(%origin, error = %e, "failed to parse rule document");
            ChatsiftError::config_malformed(e, path.map(Path::to_path_buf))
        })?;

        let categories = match root.get(SKIP_MESSAGES_KEY) {
            None | Some(Value::Null) => Mapping::new(),
            Some(Value::Mapping(m)) => m.clone(),
            Some(other) => {
                warn!(value = ?other, "'{}' is not a mapping; no patterns loaded", SKIP_MESSAGES_KEY);
                Mapping::new()
            }
        };

        Ok(Self { categories })
    }

    /// Adds a single pattern under `category`, creating the category if needed.
    ///
    /// Handy for building rule sets in code instead of YAML.
    #[must_use]
    pub fn with_pattern(
        mut self,
        category: impl Into<String>,
        name: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        let key = Value::String(category.into());
        if !matches!(self.categories.get(&key), Some(Value::Mapping(_))) {
            self.categories.insert(key.clone(), Value::Mapping(Mapping::new()));
        }
        if let Some(Value::Mapping(m)) = self.categories.get_mut(&key) {
            m.insert(Value::String(name.into()), Value::String(pattern.into()));
        }
        self
    }

    /// Returns the number of categories, including malformed ones.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Flattens all categories into one ordered list of literal patterns.
    ///
    /// Categories whose value is not a mapping are skipped with a warning.
    /// Inside a category, string values are taken as-is, numbers and booleans
    /// by their textual form; empty strings and anything else are skipped
    /// with a warning.
    pub fn patterns(&self) -> Vec<String> {
        let mut patterns = Vec::new();

        for (key, entry) in &self.categories {
            let Value::Mapping(named) = entry else {
                warn!(category = %display_key(key), value = ?entry, "unexpected rule entry; skipping");
                continue;
            };

            for (name, value) in named {
                match scalar_text(value) {
                    // An empty literal would match every message.
                    Some(text) if text.is_empty() => warn!(
                        category = %display_key(key),
                        pattern = %display_key(name),
                        "empty pattern; skipping"
                    ),
                    Some(text) => patterns.push(text),
                    None => warn!(
                        category = %display_key(key),
                        pattern = %display_key(name),
                        value = ?value,
                        "pattern is not a scalar; skipping"
                    ),
                }
            }
        }

        patterns
    }

    /// Compiles the flattened patterns into a single case-insensitive matcher.
    ///
    /// # Errors
    ///
    /// Returns [`ChatsiftError::Pattern`] if the alternation exceeds the regex
    /// size limit.
    pub fn matcher(&self) -> Result<ExclusionMatcher, ChatsiftError> {
        ExclusionMatcher::new(&self.patterns())
    }
}

fn display_key(key: &Value) -> String {
    scalar_text(key).unwrap_or_else(|| format!("{key:?}"))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Compiled form of a pattern list.
///
/// Every pattern is escaped and the results are joined into one alternation,
/// so a message is tested with a single regex search regardless of how many
/// patterns are configured.
#[derive(Debug, Clone)]
pub struct ExclusionMatcher {
    regex: Option<Regex>,
    pattern_count: usize,
}

impl ExclusionMatcher {
    /// Builds a matcher from literal patterns.
    ///
    /// An empty list yields a matcher that matches nothing.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ChatsiftError> {
        if patterns.is_empty() {
            return Ok(Self {
                regex: None,
                pattern_count: 0,
            });
        }

        let escaped: Vec<String> = patterns.iter().map(|p| regex::escape(p.as_ref())).collect();
        let alternation = format!("(?:{})", escaped.join("|"));
        let regex = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            regex: Some(regex),
            pattern_count: patterns.len(),
        })
    }

    /// Returns `true` if no patterns were configured.
    pub fn is_empty(&self) -> bool {
        self.regex.is_none()
    }

    /// Returns the number of literal patterns compiled into this matcher.
    pub fn pattern_count(&self) -> usize {
        self.pattern_count
    }

    /// Tests a message for any configured pattern, anywhere in the text.
    ///
    /// A missing message never matches.
    pub fn is_match(&self, message: Option<&str>) -> bool {
        match (&self.regex, message) {
            (Some(re), Some(text)) => re.is_match(text),
            _ => false,
        }
    }
}
