//! Lint passes over a scanned LaTeX [`Document`].
//!
//! ## Overview
//!
//! Each pass implements [`Rule`]: it reads the document, the grammar it was
//! scanned with and the [`RuleConfig`], and returns its own list of
//! [`Diagnostic`]s. Passes never see each other's output, so the
//! [`RuleEngine`] may run them in any order. Its result is sorted by source
//! position.
//!
//! | Pass | Code | Checks |
//! |------|------|--------|
//! | [`QuoteRule`] | `quotes` | forbidden quotation characters |
//! | [`DashRule`] | `dash` | `-` standing alone between spaces |
//! | [`CitationRule`] | `citation` | `\cite` keys against the bibliography |
//! | [`LabelRule`] | `label` | `\label` keys against `\ref` keys |
//! | [`ListRule`] | `list` | punctuation and case of list items |
//! | [`LayoutRule`] | `layout` | margins, line spacing and fonts |
//! | [`ScanIssueRule`] | `scan` | problems met while scanning |
//!
//! A pass that fails (an unreadable bibliography, say) is logged and skipped;
//! the other passes still report.
//!
//! ## Examples
//!
//! ```
//! use texcheck_rules::{RuleConfig, RuleContext, RuleEngine};
//! use texcheck_syntax::{AnalysisSession, GrammarRegistry};
//!
//! let grammar = GrammarRegistry::builtin();
//! let config = RuleConfig::default();
//! let doc = AnalysisSession::new(&grammar, ".").scan_text("main.tex", r"See \ref{missing}.");
//!
//! let diagnostics = RuleEngine::new().run(&RuleContext::new(&doc, &grammar, &config));
//! assert_eq!(diagnostics.len(), 1);
//! assert_eq!(diagnostics[0].code, "label");
//! ```

use std::path::PathBuf;
use thiserror::Error;

use texcheck_syntax::{Document, FileId, GrammarRegistry, Location, TextRange, TextSize};

pub mod citations;
pub mod config;
pub mod dashes;
pub mod diagnostic;
pub mod issues;
pub mod labels;
pub mod layout;
pub mod lists;
pub mod prose;
pub mod quotes;

pub use citations::CitationRule;
pub use config::{QuotePair, RuleConfig, SoftFailurePolicy};
pub use dashes::DashRule;
pub use diagnostic::{Diagnostic, Severity};
pub use issues::ScanIssueRule;
pub use labels::LabelRule;
pub use layout::LayoutRule;
pub use lists::ListRule;
pub use quotes::QuoteRule;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("cannot read bibliography {path}: {source}")]
    Bibliography {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything a pass may read.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    pub document: &'a Document,
    pub grammar: &'a GrammarRegistry,
    pub config: &'a RuleConfig,
}

impl<'a> RuleContext<'a> {
    pub fn new(document: &'a Document, grammar: &'a GrammarRegistry, config: &'a RuleConfig) -> Self {
        Self {
            document,
            grammar,
            config,
        }
    }

    /// Location of the byte range `start..end` of `file`.
    pub fn locate(&self, file: FileId, start: usize, end: usize) -> Location {
        let size = |offset: usize| TextSize::from(u32::try_from(offset).unwrap_or(u32::MAX));
        self.document
            .sources()
            .locate(file, TextRange::new(size(start), size(end)))
    }
}

/// One lint pass.
pub trait Rule: Send + Sync {
    /// Stable name stamped on every diagnostic of the pass.
    fn code(&self) -> &'static str;

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError>;
}

/// Runs a set of passes and merges their diagnostics.
pub struct RuleEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// An engine with every built-in pass.
    pub fn new() -> Self {
        Self::empty()
            .with_rule(QuoteRule)
            .with_rule(DashRule)
            .with_rule(CitationRule)
            .with_rule(LabelRule)
            .with_rule(ListRule)
            .with_rule(LayoutRule)
            .with_rule(ScanIssueRule)
    }

    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.rules.iter().map(|rule| rule.code())
    }

    /// Runs every pass; the result is in source order.
    pub fn run(&self, ctx: &RuleContext<'_>) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for rule in &self.rules {
            match rule.check(ctx) {
                Ok(found) => {
                    log::debug!("{}: {} diagnostic(s)", rule.code(), found.len());
                    diagnostics.extend(found);
                }
                Err(err) => log::warn!("{} pass failed: {}", rule.code(), err),
            }
        }
        diagnostics.sort_by(Diagnostic::position_cmp);
        diagnostics
    }
}
