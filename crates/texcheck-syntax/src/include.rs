//! `\input`/`\include` resolution.
//!
//! Inclusion is resolved while scanning: the inclusion command itself is not
//! kept, and the nodes of the included file are appended in its place under the
//! same parent. Inclusions inside included files are therefore followed too, and
//! node ids stay in reading order across files.
//!
//! Every node keeps the file and position it was read from.

use std::path::{Path, PathBuf};

use crate::document::ScanIssue;
use crate::node::{CommandNode, Node, NodeId};
use crate::scanner::FileScanner;
use crate::session::file_identity;

/// Commands whose argument names a file to splice in.
pub const INCLUSION_COMMANDS: &[&str] = &["input", "include"];

pub fn is_inclusion(name: &str) -> bool {
    INCLUSION_COMMANDS.contains(&name)
}

/// Path of the file named by an inclusion argument.
///
/// `.tex` is appended unless the argument already ends in `.tex` or `.bib`.
///
/// ```
/// use std::path::Path;
/// use texcheck_syntax::include::include_target;
///
/// assert_eq!(include_target(Path::new("/doc"), "ch/intro"), Path::new("/doc/ch/intro.tex"));
/// assert_eq!(include_target(Path::new("/doc"), "refs.bib"), Path::new("/doc/refs.bib"));
/// ```
pub fn include_target(base_dir: &Path, argument: &str) -> PathBuf {
    let argument = argument.trim();
    if argument.ends_with(".tex") || argument.ends_with(".bib") {
        base_dir.join(argument)
    } else {
        base_dir.join(format!("{argument}.tex"))
    }
}

impl FileScanner<'_, '_> {
    /// Replaces `command` by the nodes of the file it names.
    pub(crate) fn splice_include(&mut self, command: CommandNode, parent: Option<NodeId>) {
        let Some(argument) = command
            .first_argument()
            .filter(|argument| !argument.is_empty())
            .map(str::to_string)
        else {
            self.session.document.push(Node::Command(command), parent);
            return;
        };

        let path = include_target(self.session.document.base_dir(), &argument);
        let identity = file_identity(&path);
        if self.session.include_stack.contains(&identity) {
            log::warn!("include cycle through {}", path.display());
            self.session.document.report(ScanIssue::IncludeCycle {
                path,
                location: command.location,
            });
            return;
        }

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                log::debug!("including {}", path.display());
                let file = self.session.document.sources_mut().add(path, text);
                self.session.scan_file(file, identity, parent);
            }
            Err(err) => {
                log::debug!("cannot include {}: {}", path.display(), err);
                self.session.document.report(ScanIssue::MissingInclude {
                    path,
                    location: command.location,
                });
            }
        }
    }
}
