//! `\begin{name} ... \end{name}` resolution.
//!
//! The environment node is pushed as soon as its `\begin` has been scanned, so
//! its id precedes the ids of everything inside it. The body is then scanned
//! recursively until the matching `\end`, which is attached to the environment
//! instead of being listed among its children.
//!
//! Three kinds of body are not scanned for commands:
//!
//! - `comment` bodies are discarded.
//! - raw environments (`verbatim`, `lstlisting`, ...) become one text node.
//! - `lstlisting` options are additionally turned into synthetic commands so
//!   that rules can see `caption=...` and `label=...`.

use std::sync::Arc;

use crate::document::ScanIssue;
use crate::grammar::ParseMode;
use crate::node::{CommandNode, EnvironmentNode, Node, NodeId};
use crate::params::{scan_slot, Delimiters, Parameter, ScanCursor};
use crate::scanner::FileScanner;

const COMMENT_ENVIRONMENT: &str = "comment";
const LISTING_ENVIRONMENT: &str = "lstlisting";

impl FileScanner<'_, '_> {
    /// Resolves an environment whose `\begin` starts at `start`; `cursor` sits
    /// right after the word `begin`. Returns the cursor after the environment.
    pub(crate) fn resolve_environment(
        &mut self,
        start: ScanCursor,
        cursor: ScanCursor,
        parent: Option<NodeId>,
    ) -> ScanCursor {
        let text = Arc::clone(&self.text);
        let name_scan = scan_slot(&text, cursor, ParseMode::Phrase, Delimiters::BRACES, 0);
        let name = name_scan
            .parameters
            .first()
            .map(|p| p.text().trim().to_string())
            .unwrap_or_default();

        if !name_scan.terminated {
            self.report_unterminated("begin", cursor.offset, name_scan.cursor.offset);
        }
        if name.is_empty() || !name_scan.terminated {
            // Without a usable name this is just a command.
            let command = CommandNode {
                id: self.session.document.next_id(),
                name: "begin".to_string(),
                parameters: Vec::new(),
                arguments: name_scan.parameters,
                location: self.locate(start.offset, name_scan.cursor.offset),
                synthetic: false,
            };
            self.session.document.push(Node::Command(command), parent);
            return name_scan.cursor;
        }

        let grammar = self.session.grammar;
        let schema = grammar.schema_for(&name, true);
        let (parameters, arguments, cursor) = self.scan_slots(name_scan.cursor, &schema, "begin");
        let location = self.locate(start.offset, cursor.offset);
        if !schema.exists {
            log::debug!("unknown environment {name}");
            self.session.document.report(ScanIssue::UnknownEnvironment {
                name: name.clone(),
                location,
            });
        }

        let begin = CommandNode {
            id: self.session.document.next_id(),
            name: "begin".to_string(),
            parameters,
            arguments,
            location,
            synthetic: false,
        };
        let env = EnvironmentNode {
            begin,
            name: name.clone(),
            end: None,
            children: Vec::new(),
        };
        let id = self.session.document.push(Node::Environment(env), parent);

        let base_name = name.trim_end_matches('*');
        if base_name == LISTING_ENVIRONMENT {
            self.materialize_listing_options(id);
        }

        let (cursor, end) = if base_name == COMMENT_ENVIRONMENT {
            self.scan_opaque(cursor, id, &name, false)
        } else if grammar.is_raw_environment(&name) {
            self.scan_opaque(cursor, id, &name, true)
        } else {
            self.scan_until(cursor, Some(id), Some(&name))
        };

        match end {
            Some(end) => {
                if let Some(env) = self.session.document.environment_mut(id) {
                    env.end = Some(end);
                }
            }
            None => {
                log::debug!("environment {name} is never closed");
                self.session
                    .document
                    .report(ScanIssue::UnterminatedEnvironment { name, location });
            }
        }
        cursor
    }

    /// Skips to `\end{name}` without looking for commands, optionally keeping
    /// the skipped body as one text node.
    fn scan_opaque(
        &mut self,
        cursor: ScanCursor,
        env: NodeId,
        name: &str,
        keep_body: bool,
    ) -> (ScanCursor, Option<NodeId>) {
        let text = Arc::clone(&self.text);
        let Some(at) = find_end(&text, cursor.offset, name) else {
            if keep_body {
                self.flush_text(cursor.offset, text.len(), Some(env));
            }
            let mut end = cursor;
            end.advance_to(&text, text.len());
            return (end, None);
        };

        if keep_body {
            self.flush_text(cursor.offset, at, Some(env));
        }
        let mut end_start = cursor;
        end_start.advance_to(&text, at);
        let mut after_keyword = end_start;
        after_keyword.advance_to(&text, at + END_KEYWORD.len());
        self.scan_end(end_start, after_keyword, Some(env), Some(name))
    }

    /// Adds one synthetic command per `lstlisting` option, e.g. `caption={A}`
    /// becomes `\caption{A}`.
    fn materialize_listing_options(&mut self, env: NodeId) {
        let Some(Node::Environment(listing)) = self.session.document.node(env) else {
            return;
        };
        let location = listing.begin.location;
        let options = listing.begin.parameters.clone();

        for option in options.into_iter().filter(|o| !o.name.is_empty()) {
            let resumes = option.resumes;
            let arguments = option
                .value
                .map(|value| {
                    vec![Parameter::phrase(value, 0, option.offset).with_resumes(resumes)]
                })
                .unwrap_or_default();
            let command = CommandNode {
                id: self.session.document.next_id(),
                name: option.name,
                parameters: Vec::new(),
                arguments,
                location,
                synthetic: true,
            };
            self.session.document.push(Node::Command(command), Some(env));
        }
    }
}

const END_KEYWORD: &str = "\\end";

/// Byte offset of the first `\end{name}` at or after `from`.
fn find_end(text: &str, from: usize, name: &str) -> Option<usize> {
    let mut search = from;
    while let Some(found) = text.get(search..)?.find(END_KEYWORD) {
        let at = search + found;
        let after = at + END_KEYWORD.len();
        search = after;
        // `\endinput` and friends are other commands.
        if text[after..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }
        let scan = scan_slot(text, ScanCursor::at(after), ParseMode::Phrase, Delimiters::BRACES, 0);
        if scan.terminated && scan.parameters.first().is_some_and(|p| p.text().trim() == name) {
            return Some(at);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::{AnalysisSession, Document, GrammarRegistry, Node, ScanIssue};

    fn scan(text: &str) -> Document {
        let grammar = GrammarRegistry::builtin();
        AnalysisSession::new(&grammar, ".").scan_text("main.tex", text)
    }

    #[test]
    fn test_children_and_end() {
        let doc = scan(r"\begin{itemize}[noitemsep]\item a\item b\end{itemize}");
        let env = doc.environments().next().unwrap();
        assert_eq!(env.name, "itemize");
        assert_eq!(env.begin.parameters[0].name, "noitemsep");
        let kinds: Vec<_> = doc
            .children(env)
            .map(|n| match n {
                Node::Text(t) => t.content.clone(),
                Node::Command(c) => format!("\\{}", c.name),
                Node::Environment(e) => e.name.clone(),
            })
            .collect();
        assert_eq!(kinds, vec!["\\item", " a", "\\item", " b"]);

        let end = doc.node(env.end.unwrap()).unwrap();
        assert!(end.is_command("end"));
        assert_eq!(doc.parent(end.id()).unwrap().name, "itemize");
        assert!(doc.issues().is_empty());
    }

    #[test]
    fn test_nested_same_name() {
        let doc = scan(r"\begin{itemize}\item\begin{itemize}\item x\end{itemize}\end{itemize}");
        let envs: Vec<_> = doc.environments().collect();
        assert_eq!(envs.len(), 2);
        assert!(envs.iter().all(|e| e.end.is_some()));
        assert_eq!(doc.parent(envs[1].id()).unwrap().id(), envs[0].id());
    }

    #[test]
    fn test_mismatched_end_is_a_child() {
        let doc = scan(r"\begin{center}x\end{flushleft}y\end{center}");
        let env = doc.environments().next().unwrap();
        assert!(doc.children(env).any(|n| n.is_command("end")));
        assert!(env.end.is_some());
    }

    #[test]
    fn test_unterminated_environment() {
        let doc = scan(r"\begin{center} never closed");
        let env = doc.environments().next().unwrap();
        assert!(env.end.is_none());
        assert!(matches!(
            doc.issues(),
            [ScanIssue::UnterminatedEnvironment { name, .. }] if name == "center"
        ));
    }

    #[test]
    fn test_unknown_environment_still_scanned() {
        let doc = scan(r"\begin{mystery}\label{x}\end{mystery}");
        let env = doc.environments().next().unwrap();
        assert_eq!(doc.children(env).count(), 1);
        assert!(matches!(doc.issues(), [ScanIssue::UnknownEnvironment { .. }]));
    }

    #[test]
    fn test_environment_arguments_use_schema() {
        let doc = scan(r"\begin{tabular}{|l|c|} a & b \end{tabular}");
        let env = doc.environments().next().unwrap();
        assert_eq!(env.begin.first_argument(), Some("|l|c|"));
    }

    #[test]
    fn test_verbatim_body_is_one_text() {
        let doc = scan("\\begin{verbatim}\n\\section{not a command} % kept\n\\end{verbatim}");
        let env = doc.environments().next().unwrap();
        let children: Vec<_> = doc.children(env).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(
            children[0].as_text().unwrap().content,
            "\n\\section{not a command} % kept\n"
        );
        assert_eq!(doc.commands_named("section").count(), 0);
        assert!(env.end.is_some());
    }

    #[test]
    fn test_verbatim_ignores_endinput() {
        let doc = scan(r"\begin{verbatim}\endinput\end{verbatim}");
        let env = doc.environments().next().unwrap();
        assert_eq!(doc.children(env).next().unwrap().as_text().unwrap().content, r"\endinput");
    }

    #[test]
    fn test_listing_options_become_commands() {
        let doc = scan(
            "\\begin{lstlisting}[caption={Main loop}, label=lst:loop]\nwhile (x) {}\n\\end{lstlisting}",
        );
        let env = doc.environments().next().unwrap();
        let children: Vec<_> = doc.children(env).collect();
        assert_eq!(children.len(), 3);

        let caption = children[0].as_command().unwrap();
        assert!(caption.synthetic);
        assert_eq!(caption.name, "caption");
        assert_eq!(caption.first_argument(), Some("Main loop"));

        let label = children[1].as_command().unwrap();
        assert_eq!(label.first_argument(), Some("lst:loop"));

        assert_eq!(children[2].as_text().unwrap().content, "\nwhile (x) {}\n");
    }

    #[test]
    fn test_comment_environment_is_dropped() {
        let doc = scan(r"a\begin{comment}\cite{x}\end{comment}b");
        let env = doc.environments().next().unwrap();
        assert_eq!(doc.children(env).count(), 0);
        assert_eq!(doc.commands_named("cite").count(), 0);
        assert_eq!(doc.texts().last().unwrap().content, "b");
    }

    #[test]
    fn test_begin_without_name_is_a_command() {
        let doc = scan(r"\begin x");
        assert!(doc.nodes()[0].is_command("begin"));
        assert_eq!(doc.environments().count(), 0);
    }
}
