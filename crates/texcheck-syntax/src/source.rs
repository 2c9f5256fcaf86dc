//! Source files of one analysis and offset to line/column mapping.

use line_index::LineIndex;
use rowan::{TextRange, TextSize};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::node::{FileId, Location};

/// A 1-based line and column. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    text: Arc<str>,
    line_index: LineIndex,
}

impl SourceFile {
    pub fn new(path: PathBuf, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let line_index = LineIndex::new(&text);
        Self {
            path,
            text,
            line_index,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn shared_text(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    /// Maps a byte offset to a 1-based line and character column.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let end = usize::from(offset).min(self.text.len());
        let lc = self
            .line_index
            .line_col(line_index::TextSize::from(end as u32));
        let line_start = end.saturating_sub(lc.col as usize);
        let column = self
            .text
            .get(line_start..end)
            .map_or(lc.col as usize, |prefix| prefix.chars().count());
        LineCol {
            line: lc.line + 1,
            column: column as u32 + 1,
        }
    }
}

/// Every file read during one analysis, addressed by [`FileId`].
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    pub fn add(&mut self, path: PathBuf, text: impl Into<Arc<str>>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(path, text));
        id
    }

    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.0 as usize)
    }

    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.get(id).map(|file| file.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(index, file)| (FileId(index as u32), file))
    }

    /// Builds a [`Location`] for `range` in `file`.
    pub fn locate(&self, file: FileId, range: TextRange) -> Location {
        let (start, end) = match self.get(file) {
            Some(source) => (source.line_col(range.start()), source.line_col(range.end())),
            None => {
                let origin = LineCol { line: 1, column: 1 };
                (origin, origin)
            }
        };
        Location {
            file,
            range,
            start,
            end,
        }
    }

    /// Line and column of a single offset in `file`.
    pub fn line_col(&self, file: FileId, offset: TextSize) -> Option<LineCol> {
        self.get(file).map(|source| source.line_col(offset))
    }
}
