//! Settings read by the rule passes.
//!
//! Every field has a default, so a configuration file only needs to name what
//! it changes:
//!
//! ```
//! use texcheck_rules::RuleConfig;
//!
//! let config: RuleConfig = serde_json::from_str(r#"{ "line_spacing": 2.0 }"#).unwrap();
//! assert_eq!(config.line_spacing, 2.0);
//! assert_eq!(config.hyphen_replacement, "---");
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::diagnostic::Severity;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePair {
    pub open: String,
    pub close: String,
}

impl Default for QuotePair {
    fn default() -> Self {
        Self {
            open: "«".to_string(),
            close: "»".to_string(),
        }
    }
}

/// Severity of each kind of scan problem; `None` silences the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftFailurePolicy {
    pub missing_include: Option<Severity>,
    pub include_cycle: Option<Severity>,
    pub unknown_environment: Option<Severity>,
    pub unterminated_environment: Option<Severity>,
    pub unterminated_group: Option<Severity>,
}

impl Default for SoftFailurePolicy {
    fn default() -> Self {
        Self {
            missing_include: Some(Severity::Warning),
            include_cycle: Some(Severity::Warning),
            unknown_environment: Some(Severity::Info),
            unterminated_environment: Some(Severity::Warning),
            unterminated_group: Some(Severity::Warning),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleConfig {
    /// Quotation characters that must not appear in prose.
    pub forbidden_quotes: Vec<char>,
    /// Quotation marks suggested instead.
    pub quote_pair: QuotePair,
    /// Suggested replacement for a standalone `-`.
    pub hyphen_replacement: String,
    /// Characters of context shown on each side of a standalone `-`.
    pub context_width: usize,
    /// Required line spacing factor.
    pub line_spacing: f64,
    /// When not empty, the only packages a document may load.
    pub allowed_packages: Vec<String>,
    pub forbidden_packages: Vec<String>,
    /// When not empty, the only fonts a document may select.
    pub allowed_fonts: Vec<String>,
    pub forbidden_fonts: Vec<String>,
    /// Environments that must contain a `\label`.
    pub label_environments: Vec<String>,
    /// Environments whose items are checked for punctuation.
    pub list_environments: Vec<String>,
    pub citation_commands: Vec<String>,
    pub reference_commands: Vec<String>,
    /// Bibliography database to check citations against. When unset, the
    /// files named by `\bibliography` and `\addbibresource` are used.
    pub bibliography: Option<PathBuf>,
    pub soft_failures: SoftFailurePolicy,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            forbidden_quotes: vec!['"', '“', '”', '„'],
            quote_pair: QuotePair::default(),
            hyphen_replacement: "---".to_string(),
            context_width: 20,
            line_spacing: 1.5,
            allowed_packages: Vec::new(),
            forbidden_packages: strings(&["fullpage", "a4wide", "anysize", "vmargin", "savetrees"]),
            allowed_fonts: Vec::new(),
            forbidden_fonts: Vec::new(),
            label_environments: strings(&["figure", "table"]),
            list_environments: strings(&["enumerate", "itemize", "description", "list"]),
            citation_commands: strings(&[
                "cite",
                "citep",
                "citet",
                "citealp",
                "citeauthor",
                "citeyear",
                "parencite",
                "textcite",
                "autocite",
                "footcite",
                "fullcite",
                "supercite",
                "nocite",
            ]),
            reference_commands: strings(&[
                "ref", "eqref", "pageref", "autoref", "nameref", "cref", "Cref", "vref",
            ]),
            bibliography: None,
            soft_failures: SoftFailurePolicy::default(),
        }
    }
}

impl RuleConfig {
    /// Whether `name` (starred or not) is one of `commands`.
    pub(crate) fn matches(commands: &[String], name: &str) -> bool {
        let base = name.trim_end_matches('*');
        commands.iter().any(|command| command == base)
    }

    pub fn is_citation(&self, name: &str) -> bool {
        Self::matches(&self.citation_commands, name)
    }

    pub fn is_reference(&self, name: &str) -> bool {
        Self::matches(&self.reference_commands, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: RuleConfig = serde_json::from_str(
            r#"{
                "forbidden_quotes": ["'"],
                "quote_pair": { "open": "„", "close": "“" },
                "soft_failures": { "unknown_environment": null }
            }"#,
        )
        .unwrap();
        assert_eq!(config.forbidden_quotes, vec!['\'']);
        assert_eq!(config.quote_pair.open, "„");
        assert_eq!(config.soft_failures.unknown_environment, None);
        assert_eq!(config.soft_failures.missing_include, Some(Severity::Warning));
        assert_eq!(config.context_width, 20);
    }

    #[test]
    fn test_starred_commands_match() {
        let config = RuleConfig::default();
        assert!(config.is_citation("cite*"));
        assert!(config.is_reference("Cref"));
        assert!(!config.is_reference("label"));
    }
}
