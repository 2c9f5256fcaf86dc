use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::document::{Document, ScanError};
use crate::grammar::GrammarRegistry;
use crate::node::{FileId, NodeId};
use crate::scanner::FileScanner;

/// All mutable state of one analysis.
///
/// A session borrows the (immutable, shareable) grammar and owns everything
/// else: the node arena, the source map and the stack of files being scanned.
/// Independent sessions can run on different threads against the same
/// [`GrammarRegistry`].
///
/// ```
/// use texcheck_syntax::{AnalysisSession, GrammarRegistry};
///
/// let grammar = GrammarRegistry::builtin();
/// let doc = AnalysisSession::new(&grammar, ".").scan_text("main.tex", r"\section{Intro} Text");
///
/// let section = doc.commands_named("section").next().unwrap();
/// assert_eq!(section.first_argument(), Some("Intro"));
/// assert_eq!(doc.texts().next().unwrap().content, " Text");
/// ```
pub struct AnalysisSession<'g> {
    pub(crate) grammar: &'g GrammarRegistry,
    pub(crate) document: Document,
    pub(crate) include_stack: Vec<PathBuf>,
}

impl<'g> AnalysisSession<'g> {
    /// Starts a session whose inclusions resolve against `base_dir`.
    pub fn new(grammar: &'g GrammarRegistry, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            grammar,
            document: Document::new(base_dir.into()),
            include_stack: Vec::new(),
        }
    }

    pub fn grammar(&self) -> &'g GrammarRegistry {
        self.grammar
    }

    pub fn base_dir(&self) -> &Path {
        self.document.base_dir()
    }

    /// Reads and scans `start_file`, following inclusions.
    ///
    /// Relative paths are taken relative to the base directory. Only an
    /// unreadable start file is an error; every later problem is recorded as a
    /// [`ScanIssue`](crate::ScanIssue).
    pub fn scan(self, start_file: impl AsRef<Path>) -> Result<Document, ScanError> {
        let start_file = start_file.as_ref();
        let path = if start_file.is_absolute() {
            start_file.to_path_buf()
        } else {
            self.base_dir().join(start_file)
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?;
        Ok(self.scan_text(path, text))
    }

    /// Scans in-memory `text` as if it were the start file at `path`.
    pub fn scan_text(mut self, path: impl Into<PathBuf>, text: impl Into<Arc<str>>) -> Document {
        let path = path.into();
        let file = self.document.sources_mut().add(path.clone(), text);
        self.scan_file(file, file_identity(&path), None);
        log::info!(
            "scanned {} file(s) into {} node(s), {} issue(s)",
            self.document.sources().len(),
            self.document.len(),
            self.document.issues().len()
        );
        self.document
    }

    pub(crate) fn scan_file(&mut self, file: FileId, identity: PathBuf, parent: Option<NodeId>) {
        self.include_stack.push(identity);
        FileScanner::new(self, file).run(parent);
        self.include_stack.pop();
    }
}

/// A path normalized for cycle detection.
pub(crate) fn file_identity(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
