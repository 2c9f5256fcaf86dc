use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use texcheck_syntax::{Document, LineCol, Location, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One finding of a rule pass.
///
/// Lines and columns are 1-based; `0` means the diagnostic has no position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Name of the pass that produced it, e.g. `"citation"`.
    pub code: &'static str,
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
    /// The offending source text, or a context window around it.
    pub original_text: String,
    pub suggested_fix: Option<String>,
    /// The node the finding is about, when there is one.
    pub source_node: Option<NodeId>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            file: None,
            line: 0,
            column: 0,
            end_line: 0,
            end_column: 0,
            original_text: String::new(),
            suggested_fix: None,
            source_node: None,
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Positions the diagnostic at `location` in `document`.
    pub fn at(self, document: &Document, location: &Location) -> Self {
        let path = document.file_path(location).map(Path::to_path_buf);
        self.span(path, location.start, location.end)
    }

    /// Positions the diagnostic in a file outside the scanned document.
    pub fn span(mut self, file: Option<PathBuf>, start: LineCol, end: LineCol) -> Self {
        self.file = file;
        self.line = start.line;
        self.column = start.column;
        self.end_line = end.line;
        self.end_column = end.column;
        self
    }

    pub fn with_original(mut self, text: impl Into<String>) -> Self {
        self.original_text = text.into();
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    pub fn for_node(mut self, node: NodeId) -> Self {
        self.source_node = Some(node);
        self
    }

    /// Source order: by file, then line, then column. Unpositioned last.
    pub fn position_cmp(&self, other: &Self) -> Ordering {
        (self.file.is_none(), &self.file, self.line, self.column).cmp(&(
            other.file.is_none(),
            &other.file,
            other.line,
            other.column,
        ))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}:{}: ", file.display(), self.line, self.column)?,
            None => f.write_str("<document>: ")?,
        }
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)?;
        if let Some(fix) = &self.suggested_fix {
            write!(f, " (suggested: {fix})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(file: Option<&str>, line: u32, column: u32) -> Diagnostic {
        Diagnostic::warning("test", "x").span(
            file.map(PathBuf::from),
            LineCol { line, column },
            LineCol { line, column },
        )
    }

    #[test]
    fn test_position_order() {
        let mut diagnostics = vec![
            at(None, 1, 1),
            at(Some("b.tex"), 1, 1),
            at(Some("a.tex"), 3, 1),
            at(Some("a.tex"), 1, 9),
            at(Some("a.tex"), 1, 2),
        ];
        diagnostics.sort_by(Diagnostic::position_cmp);
        let keys: Vec<_> = diagnostics
            .iter()
            .map(|d| (d.file.clone(), d.line, d.column))
            .collect();
        assert_eq!(
            keys,
            vec![
                (Some(PathBuf::from("a.tex")), 1, 2),
                (Some(PathBuf::from("a.tex")), 1, 9),
                (Some(PathBuf::from("a.tex")), 3, 1),
                (Some(PathBuf::from("b.tex")), 1, 1),
                (None, 1, 1),
            ]
        );
    }

    #[test]
    fn test_display() {
        let d = at(Some("main.tex"), 4, 2).with_fix("---");
        assert_eq!(d.to_string(), "main.tex:4:2: warning[test]: x (suggested: ---)");
        assert_eq!(Severity::Error.to_string(), "error");
        assert!(Severity::Error > Severity::Warning);
    }
}
