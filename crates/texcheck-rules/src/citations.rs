//! Citation keys against bibliography entries.
//!
//! Keys may come from `.bib` databases (the configured one, or the files named
//! by `\bibliography` and `\addbibresource`) and from `\bibitem` commands.
//! Every cited key without an entry is an error at its first citation; every
//! entry never cited is an error at the entry. `\nocite{*}` cites everything.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use texcheck_syntax::bibtex::{parse_bibtex, BibFile};
use texcheck_syntax::{CommandNode, Document, SourceFile};

use crate::diagnostic::Diagnostic;
use crate::{Rule, RuleContext, RuleError};

pub struct CitationRule;

/// One bibliography database read from disk.
struct Database {
    source: SourceFile,
    entries: BibFile,
}

impl Rule for CitationRule {
    fn code(&self) -> &'static str {
        "citation"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let doc = ctx.document;
        let mut diagnostics = Vec::new();

        let mut cited: Vec<(&str, &CommandNode)> = Vec::new();
        let mut cite_all = false;
        for command in doc.commands().filter(|c| ctx.config.is_citation(&c.name)) {
            for key in command.argument_keys() {
                if key == "*" {
                    cite_all = true;
                } else {
                    cited.push((key, command));
                }
            }
        }

        let databases = self.databases(ctx, &mut diagnostics)?;
        let bibitems: Vec<(&str, &CommandNode)> = doc
            .commands_named("bibitem")
            .filter_map(|command| command.first_argument().map(|key| (key, command)))
            .collect();

        let known: HashSet<&str> = databases
            .iter()
            .flat_map(|db| db.entries.keys())
            .chain(bibitems.iter().map(|(key, _)| *key))
            .collect();

        let mut reported = HashSet::new();
        for (key, command) in &cited {
            if known.contains(key) || !reported.insert(*key) {
                continue;
            }
            diagnostics.push(
                Diagnostic::error(self.code(), format!("no bibliography entry for `{key}`"))
                    .at(doc, &command.location)
                    .with_original(*key)
                    .for_node(command.id),
            );
        }

        if cite_all {
            return Ok(diagnostics);
        }
        let cited: HashSet<&str> = cited.iter().map(|(key, _)| *key).collect();

        for db in &databases {
            for entry in db.entries.entries.iter().filter(|e| !cited.contains(e.key.as_str())) {
                diagnostics.push(
                    Diagnostic::error(self.code(), format!("bibliography entry `{}` is never cited", entry.key))
                        .span(
                            Some(db.source.path.clone()),
                            db.source.line_col(entry.key_range.start()),
                            db.source.line_col(entry.key_range.end()),
                        )
                        .with_original(entry.key.clone()),
                );
            }
        }
        for (key, command) in bibitems.iter().filter(|(key, _)| !cited.contains(key)) {
            diagnostics.push(
                Diagnostic::error(self.code(), format!("bibliography entry `{key}` is never cited"))
                    .at(doc, &command.location)
                    .with_original(*key),
            );
        }

        Ok(diagnostics)
    }
}

impl CitationRule {
    /// Reads the configured database, or every database the document names.
    ///
    /// A configured database that cannot be read fails the pass. A named one
    /// is reported as a warning at the naming command.
    fn databases(
        &self,
        ctx: &RuleContext<'_>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Result<Vec<Database>, RuleError> {
        let doc = ctx.document;
        if let Some(configured) = &ctx.config.bibliography {
            let path = doc.base_dir().join(configured);
            let text = std::fs::read_to_string(&path)
                .map_err(|source| RuleError::Bibliography { path: path.clone(), source })?;
            return Ok(vec![Database::new(path, text)]);
        }

        let mut databases = Vec::new();
        let mut seen = HashSet::new();
        for (command, path) in named_databases(doc) {
            if !seen.insert(path.clone()) {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    log::debug!("reading bibliography {}", path.display());
                    databases.push(Database::new(path, text));
                }
                Err(err) => {
                    log::debug!("cannot read bibliography {}: {}", path.display(), err);
                    diagnostics.push(
                        Diagnostic::warning(
                            self.code(),
                            format!("bibliography `{}` cannot be read", path.display()),
                        )
                        .at(doc, &command.location)
                        .for_node(command.id),
                    );
                }
            }
        }
        Ok(databases)
    }
}

impl Database {
    fn new(path: PathBuf, text: String) -> Self {
        let entries = parse_bibtex(&text);
        Self {
            source: SourceFile::new(path, text),
            entries,
        }
    }
}

/// Databases named by `\bibliography{a,b}` and `\addbibresource{c.bib}`.
fn named_databases(doc: &Document) -> Vec<(&CommandNode, PathBuf)> {
    let mut out = Vec::new();
    for command in doc.commands() {
        let names = match command.name.as_str() {
            "bibliography" => command.argument_keys(),
            "addbibresource" => command.first_argument().into_iter().collect(),
            _ => continue,
        };
        for name in names {
            out.push((command, database_path(doc.base_dir(), name)));
        }
    }
    out
}

fn database_path(base_dir: &Path, name: &str) -> PathBuf {
    if name.ends_with(".bib") {
        base_dir.join(name)
    } else {
        base_dir.join(format!("{name}.bib"))
    }
}
