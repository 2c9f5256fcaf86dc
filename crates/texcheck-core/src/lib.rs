//! # texcheck core
//!
//! One call from a start file to a sorted list of diagnostics.
//!
//! ## Overview
//!
//! [`analyze`] scans the start file (following `\input` and `\include`) into a
//! [`Document`], then runs every pass of the [`RuleEngine`] over it. The
//! grammar and rule configuration are only borrowed, so one loaded
//! [`EngineConfig`] can serve any number of analyses, on any number of
//! threads, at once.
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//! use texcheck_core::{analyze, config::EngineConfig};
//!
//! let config = EngineConfig::load_from_path(Path::new("texcheck.json"))?;
//! let grammar = config.registry()?;
//! let analysis = analyze("main.tex", "thesis", &grammar, &config.rules)?;
//! for diagnostic in &analysis.diagnostics {
//!     println!("{diagnostic}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::Serialize;
use std::path::Path;

use texcheck_rules::{Diagnostic, RuleConfig, RuleContext, RuleEngine, Severity};
use texcheck_syntax::{AnalysisSession, Document, GrammarRegistry, ScanError};

pub mod config;

pub use config::{ConfigError, EngineConfig};

/// The result of one analysis.
#[derive(Debug)]
pub struct Analysis {
    pub document: Document,
    /// Sorted by file, line and column.
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

/// Per-severity totals, as printed after a text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl From<&Analysis> for Summary {
    fn from(analysis: &Analysis) -> Self {
        Self {
            errors: analysis.count(Severity::Error),
            warnings: analysis.count(Severity::Warning),
            infos: analysis.count(Severity::Info),
        }
    }
}

/// Scans `start_file` and runs every rule pass over the result.
///
/// A relative `start_file` is taken relative to `start_directory`, which is
/// also where inclusions and bibliographies are resolved.
pub fn analyze(
    start_file: impl AsRef<Path>,
    start_directory: impl AsRef<Path>,
    grammar: &GrammarRegistry,
    rules: &RuleConfig,
) -> Result<Analysis, ScanError> {
    let session = AnalysisSession::new(grammar, start_directory.as_ref());
    let document = session.scan(start_file)?;
    let diagnostics = RuleEngine::new().run(&RuleContext::new(&document, grammar, rules));
    log::info!(
        "analyzed {} file(s): {} node(s), {} diagnostic(s)",
        document.sources().len(),
        document.len(),
        diagnostics.len()
    );
    Ok(Analysis {
        document,
        diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn test_analyze_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("main.tex"),
            "\\documentclass{article}\n\\begin{document}\n\\input{body}\n\\end{document}\n",
        )
        .unwrap();
        fs::write(dir.path().join("body.tex"), "A - B \\ref{nowhere}\n").unwrap();

        let grammar = GrammarRegistry::builtin();
        let analysis = analyze("main.tex", dir.path(), &grammar, &RuleConfig::default()).unwrap();

        assert_eq!(analysis.document.sources().len(), 2);
        let codes: Vec<_> = analysis.diagnostics.iter().map(|d| d.code).collect();
        assert_eq!(codes, vec!["dash", "label"]);
        assert!(analysis.has_errors());
        assert_eq!(
            Summary::from(&analysis),
            Summary {
                errors: 1,
                warnings: 1,
                infos: 0
            }
        );
    }

    #[test]
    fn test_missing_start_file() {
        let dir = tempfile::tempdir().unwrap();
        let grammar = GrammarRegistry::builtin();
        let result = analyze("absent.tex", dir.path(), &grammar, &RuleConfig::default());
        assert!(matches!(result, Err(ScanError::Read { .. })));
    }

    #[test]
    fn test_concurrent_analyses_share_configuration() {
        let dir = tempfile::tempdir().unwrap();
        for index in 0..4 {
            let text = format!("\\label{{l{index}}}\n");
            fs::write(dir.path().join(format!("doc{index}.tex")), text).unwrap();
        }
        let grammar = Arc::new(GrammarRegistry::builtin());
        let rules = Arc::new(RuleConfig::default());

        let results: Vec<Analysis> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|index| {
                    let grammar = Arc::clone(&grammar);
                    let rules = Arc::clone(&rules);
                    let dir = dir.path();
                    scope.spawn(move || {
                        analyze(format!("doc{index}.tex"), dir, &grammar, &rules).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for (index, analysis) in results.iter().enumerate() {
            assert_eq!(analysis.document.sources().len(), 1);
            assert_eq!(analysis.diagnostics.len(), 1);
            assert_eq!(analysis.diagnostics[0].original_text, format!("l{index}"));
        }
    }
}
