//! Left-to-right scanner turning one file's text into nodes.
//!
//! The scanner alternates between two modes. Outside a command it accumulates a
//! pending text run; a `\` flushes that run and starts reading a command name.
//! The name is then looked up in the grammar and each of its slots is scanned
//! with [`scan_slot`]. `\begin` hands over to the environment resolver and
//! `\input`/`\include` to the inclusion resolver.
//!
//! A `%` comment also flushes the pending run, so the content of every text
//! node is a verbatim slice of its file.

use rowan::TextRange;
use std::sync::Arc;

use crate::document::ScanIssue;
use crate::grammar::{ParseInfo, ParseMode, Slot};
use crate::include;
use crate::node::{CommandNode, FileId, Location, Node, NodeId, TextNode};
use crate::params::{scan_boundary, scan_slot, text_size, Delimiters, Parameter, ScanCursor};
use crate::session::AnalysisSession;
use crate::source::SourceFile;

pub(crate) struct FileScanner<'s, 'g> {
    pub(crate) session: &'s mut AnalysisSession<'g>,
    pub(crate) file: FileId,
    pub(crate) text: Arc<str>,
}

impl<'s, 'g> FileScanner<'s, 'g> {
    pub(crate) fn new(session: &'s mut AnalysisSession<'g>, file: FileId) -> Self {
        let text = session
            .document
            .sources()
            .get(file)
            .map(SourceFile::shared_text)
            .unwrap_or_else(|| Arc::from(""));
        Self {
            session,
            file,
            text,
        }
    }

    pub(crate) fn run(mut self, parent: Option<NodeId>) {
        self.scan_until(ScanCursor::start(), parent, None);
    }

    /// Scans nodes into `parent` until `\end{until}` or end of text.
    ///
    /// Returns the cursor after the last consumed character and, when `until`
    /// was matched, the id of the closing `\end` command.
    pub(crate) fn scan_until(
        &mut self,
        mut cursor: ScanCursor,
        parent: Option<NodeId>,
        until: Option<&str>,
    ) -> (ScanCursor, Option<NodeId>) {
        let text = Arc::clone(&self.text);
        let mut pending = cursor.offset;
        let mut in_comment = false;

        while let Some(ch) = text[cursor.offset..].chars().next() {
            if in_comment {
                if ch == '\n' {
                    in_comment = false;
                    pending = cursor.offset;
                } else {
                    cursor.advance(ch);
                }
                continue;
            }

            match ch {
                '%' => {
                    self.flush_text(pending, cursor.offset, parent);
                    cursor.advance(ch);
                    in_comment = true;
                }
                '\\' => {
                    self.flush_text(pending, cursor.offset, parent);
                    let (next, closed) = self.scan_command(cursor, parent, until);
                    cursor = next;
                    pending = cursor.offset;
                    if closed.is_some() {
                        return (cursor, closed);
                    }
                }
                _ => cursor.advance(ch),
            }
        }

        if !in_comment {
            self.flush_text(pending, cursor.offset, parent);
        }
        (cursor, None)
    }

    fn scan_command(
        &mut self,
        start: ScanCursor,
        parent: Option<NodeId>,
        until: Option<&str>,
    ) -> (ScanCursor, Option<NodeId>) {
        let mut cursor = start;
        cursor.advance('\\');
        let Some(name) = read_name(&self.text, &mut cursor) else {
            // A lone backslash at end of text.
            return (cursor, None);
        };

        match name.as_str() {
            "begin" => (self.resolve_environment(start, cursor, parent), None),
            "end" => self.scan_end(start, cursor, parent, until),
            _ => {
                let grammar = self.session.grammar;
                let schema = grammar.schema_for(&name, false);
                let (parameters, arguments, cursor) = self.scan_slots(cursor, &schema, &name);
                let command = CommandNode {
                    id: self.session.document.next_id(),
                    name,
                    parameters,
                    arguments,
                    location: self.locate(start.offset, cursor.offset),
                    synthetic: false,
                };
                if include::is_inclusion(&command.name) {
                    self.splice_include(command, parent);
                } else {
                    self.session.document.push(Node::Command(command), parent);
                }
                (cursor, None)
            }
        }
    }

    /// Scans `\end{name}`. When `name` closes the environment being scanned
    /// the command is attached to it as its end and its id is returned.
    pub(crate) fn scan_end(
        &mut self,
        start: ScanCursor,
        cursor: ScanCursor,
        parent: Option<NodeId>,
        until: Option<&str>,
    ) -> (ScanCursor, Option<NodeId>) {
        let scan = scan_slot(&self.text, cursor, ParseMode::Phrase, Delimiters::BRACES, 0);
        if !scan.terminated {
            self.report_unterminated("end", cursor.offset, scan.cursor.offset);
        }
        let cursor = scan.cursor;
        let command = CommandNode {
            id: self.session.document.next_id(),
            name: "end".to_string(),
            parameters: Vec::new(),
            arguments: scan.parameters,
            location: self.locate(start.offset, cursor.offset),
            synthetic: false,
        };

        if until.is_some() && command.first_argument() == until {
            let id = self
                .session
                .document
                .push_detached(Node::Command(command), parent);
            return (cursor, Some(id));
        }
        self.session.document.push(Node::Command(command), parent);
        (cursor, None)
    }

    /// Scans every slot of `schema` in order, returning the parameters, the
    /// arguments and the cursor after the last present slot.
    pub(crate) fn scan_slots(
        &mut self,
        mut cursor: ScanCursor,
        schema: &ParseInfo,
        command: &str,
    ) -> (Vec<Parameter>, Vec<Parameter>, ScanCursor) {
        let text = Arc::clone(&self.text);
        let mut parameters = Vec::new();
        let mut arguments = Vec::new();

        for (index, slot) in schema.slot_order.iter().enumerate() {
            let scan = match slot {
                Slot::Optional => scan_slot(
                    &text,
                    cursor,
                    schema.parameter_rule.mode,
                    Delimiters::BRACKETS,
                    index,
                ),
                Slot::Required => scan_slot(
                    &text,
                    cursor,
                    schema.argument_rule.mode,
                    Delimiters::BRACES,
                    index,
                ),
                Slot::FreeformBoundary => scan_boundary(&text, cursor, index),
            };
            if !scan.terminated {
                self.report_unterminated(command, cursor.offset, scan.cursor.offset);
            }
            cursor = scan.cursor;
            match slot {
                Slot::Optional => parameters.extend(scan.parameters),
                Slot::Required | Slot::FreeformBoundary => arguments.extend(scan.parameters),
            }
        }

        (parameters, arguments, cursor)
    }

    /// Pushes `text[start..end]` as a text node when it is not empty.
    pub(crate) fn flush_text(&mut self, start: usize, end: usize, parent: Option<NodeId>) {
        if start >= end {
            return;
        }
        let Some(content) = self.text.get(start..end) else {
            return;
        };
        let node = TextNode {
            id: self.session.document.next_id(),
            content: content.to_string(),
            location: self.locate(start, end),
        };
        self.session.document.push(Node::Text(node), parent);
    }

    pub(crate) fn locate(&self, start: usize, end: usize) -> Location {
        self.session
            .document
            .sources()
            .locate(self.file, TextRange::new(text_size(start), text_size(end)))
    }

    pub(crate) fn report_unterminated(&mut self, command: &str, start: usize, end: usize) {
        let location = self.locate(start, end);
        self.session.document.report(ScanIssue::UnterminatedGroup {
            command: command.to_string(),
            location,
        });
    }
}

/// Reads a command name right after its backslash.
///
/// Names are ASCII letters, optionally followed by `*`. Any other character
/// forms a one-character control symbol; whitespace symbols read as `" "`.
fn read_name(text: &str, cursor: &mut ScanCursor) -> Option<String> {
    let first = text[cursor.offset..].chars().next()?;
    if !first.is_ascii_alphabetic() {
        cursor.advance(first);
        return Some(if first.is_whitespace() {
            " ".to_string()
        } else {
            first.to_string()
        });
    }

    let mut name = String::new();
    while let Some(c) = text[cursor.offset..].chars().next() {
        if !c.is_ascii_alphabetic() {
            break;
        }
        name.push(c);
        cursor.advance(c);
    }
    if text[cursor.offset..].starts_with('*') {
        name.push('*');
        cursor.advance('*');
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use crate::{AnalysisSession, Document, GrammarRegistry, LineCol, Node, ScanIssue};
    use expect_test::expect;

    fn scan(text: &str) -> Document {
        let grammar = GrammarRegistry::builtin();
        AnalysisSession::new(&grammar, ".").scan_text("main.tex", text)
    }

    fn outline(doc: &Document) -> String {
        doc.nodes()
            .iter()
            .map(|node| match node {
                Node::Text(text) => format!("{} text {:?}", text.id.0, text.content),
                Node::Command(command) => format!(
                    "{} \\{} {:?} {:?}",
                    command.id.0,
                    command.name,
                    command.parameters.iter().map(|p| p.text()).collect::<Vec<_>>(),
                    command.arguments.iter().map(|p| p.text()).collect::<Vec<_>>(),
                ),
                Node::Environment(env) => format!(
                    "{} env {} children={:?} end={:?}",
                    env.id().0,
                    env.name,
                    env.children.iter().map(|id| id.0).collect::<Vec<_>>(),
                    env.end.map(|id| id.0),
                ),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_outline_snapshot() {
        let doc = scan(
            "\\documentclass[12pt]{article}\n\\begin{document}\n\\section*{Intro} See \\ref{fig:a}.\n\\end{document}\n",
        );
        expect![[r#"
            0 \documentclass ["12pt"] ["article"]
            1 text "\n"
            2 env document children=[3, 4, 5, 6, 7] end=Some(8)
            3 text "\n"
            4 \section* [] ["Intro"]
            5 text " See "
            6 \ref [] ["fig:a"]
            7 text ".\n"
            8 \end [] ["document"]
            9 text "\n""#]]
        .assert_eq(&outline(&doc));
    }

    #[test]
    fn test_global_index_matches_position() {
        let doc = scan(r"a \textbf{b} c \begin{center} d \end{center} e");
        for (index, node) in doc.nodes().iter().enumerate() {
            assert_eq!(node.id().0, index);
        }
    }

    #[test]
    fn test_positions_are_one_based_and_per_line() {
        let doc = scan("first\n  \\label{x}");
        let label = doc.commands_named("label").next().unwrap();
        assert_eq!(label.location.start, LineCol { line: 2, column: 3 });
        assert_eq!(label.location.end, LineCol { line: 2, column: 12 });
        assert_eq!(u32::from(label.location.range.start()), 8);
    }

    #[test]
    fn test_comments_split_text() {
        let doc = scan("before % hidden \\cite{x}\nafter");
        let texts: Vec<_> = doc.texts().map(|t| t.content.as_str()).collect();
        assert_eq!(texts, vec!["before ", "\nafter"]);
        assert_eq!(doc.commands().count(), 0);
    }

    #[test]
    fn test_escaped_percent_is_not_a_comment() {
        let doc = scan(r"50\% done");
        let names: Vec<_> = doc.commands().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["%"]);
        assert_eq!(doc.texts().last().unwrap().content, " done");
    }

    #[test]
    fn test_control_symbols() {
        let doc = scan(r"a\\[2pt]b\,c");
        let line_break = doc.commands_named("\\").next().unwrap();
        assert_eq!(line_break.parameters[0].text(), "2pt");
        assert!(doc.commands_named(",").next().is_some());
    }

    #[test]
    fn test_optional_slot_absent_keeps_following_text() {
        let doc = scan(r"\item one;");
        let item = doc.commands_named("item").next().unwrap();
        assert!(item.parameters.is_empty());
        assert_eq!(doc.texts().next().unwrap().content, " one;");
    }

    #[test]
    fn test_value_mode_arguments() {
        let doc = scan(r"\usepackage[a4paper,margin=2cm]{geometry, setspace}");
        let command = doc.commands().next().unwrap();
        assert_eq!(command.argument_keys(), vec!["geometry", "setspace"]);
        assert_eq!(command.parameters[1].name, "margin");
        assert_eq!(command.parameters[1].value.as_deref(), Some("2cm"));
    }

    #[test]
    fn test_unknown_command_uses_fallback() {
        let doc = scan(r"\mymacro{arg} \myref{key}");
        let mymacro = doc.commands_named("mymacro").next().unwrap();
        assert_eq!(mymacro.first_argument(), Some("arg"));
        let myref = doc.commands_named("myref").next().unwrap();
        assert_eq!(myref.arguments[0].name, "key");
    }

    #[test]
    fn test_verb_boundary() {
        let doc = scan(r"\verb|a{b| tail");
        let verb = doc.commands_named("verb").next().unwrap();
        assert_eq!(verb.first_argument(), Some("a{b"));
        assert_eq!(doc.texts().next().unwrap().content, " tail");
    }

    #[test]
    fn test_unterminated_group_is_reported() {
        let doc = scan(r"\textbf{Hello");
        assert!(matches!(
            doc.issues(),
            [ScanIssue::UnterminatedGroup { command, .. }] if command == "textbf"
        ));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_lone_backslash_at_end() {
        let doc = scan("text\\");
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_rescanning_is_deterministic() {
        let text = "\\section{A}\n\\begin{itemize}\\item x\\end{itemize}";
        assert_eq!(outline(&scan(text)), outline(&scan(text)));
        let a = scan(text);
        let b = scan(text);
        assert_eq!(a.nodes(), b.nodes());
    }
}
