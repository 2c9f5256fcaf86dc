//! The text a reader of the typeset document would see.
//!
//! Prose is made of text nodes and of the values of command slots, minus:
//!
//! - the bodies of raw environments (`verbatim`, `lstlisting`, ...)
//! - boundary slots such as `\verb|...|`
//! - with `skip_math`, anything inside `$...$`, `$$...$$`, `\(...\)`,
//!   `\[...\]` or a math environment
//!
//! Every piece remembers the text node or slot value it was cut from, so a
//! byte index into [`Prose::text`] maps back to a file position even when a
//! `%` comment was dropped from the middle of an argument.

use texcheck_syntax::render::{render_node, render_node_around};
use texcheck_syntax::{CommandNode, FileId, Node, Parameter, Slot};

use crate::RuleContext;

pub const MATH_ENVIRONMENTS: &[&str] = &[
    "equation",
    "align",
    "alignat",
    "flalign",
    "gather",
    "multline",
    "eqnarray",
    "math",
    "displaymath",
];

pub fn is_math_environment(name: &str) -> bool {
    MATH_ENVIRONMENTS.contains(&name.trim_end_matches('*'))
}

/// A piece of prose, cut from a text node or slot value at math boundaries.
#[derive(Debug, Clone, Copy)]
pub struct Prose<'d> {
    /// The text node, or the command whose slot holds the text.
    pub node: &'d Node,
    pub file: FileId,
    /// The whole text the piece was cut from.
    pub owner: &'d str,
    /// Byte index of `text` in `owner`.
    pub start: usize,
    pub text: &'d str,
    /// The slot value `owner` is, or `None` for a text node.
    parameter: Option<&'d Parameter>,
    /// File offset of `owner` for a text node.
    offset: usize,
}

impl Prose<'_> {
    /// File offset of byte `index` of the text.
    pub fn offset_of(&self, index: usize) -> usize {
        let index = self.start + index;
        match self.parameter {
            Some(parameter) => parameter.source_offset(index),
            None => self.offset + index,
        }
    }

    /// The characters right before and right after `text[start..end]` in the
    /// owning text; `None` at either end of it.
    pub fn neighbours(&self, start: usize, end: usize) -> (Option<char>, Option<char>) {
        let before = self.owner[..self.start + start].chars().next_back();
        let after = self.owner[self.start + end..].chars().next();
        (before, after)
    }
}

/// Collects the prose of the document in scan order.
pub fn collect<'d>(ctx: &RuleContext<'d>, skip_math: bool) -> Vec<Prose<'d>> {
    let doc = ctx.document;
    let mut out = Vec::new();
    let mut math = MathState::default();

    for node in doc.nodes() {
        let mut raw = false;
        let mut in_math_env = false;
        for env in doc.ancestors(node.id()) {
            raw |= ctx.grammar.is_raw_environment(&env.name);
            in_math_env |= is_math_environment(&env.name);
        }
        if skip_math && in_math_env {
            continue;
        }

        match node {
            Node::Text(text) => {
                if raw {
                    continue;
                }
                let origin = Origin {
                    node,
                    file: text.location.file,
                    parameter: None,
                    offset: usize::from(text.location.range.start()),
                };
                push_pieces(&mut out, origin, &text.content, skip_math, &mut math);
            }
            Node::Command(command) => {
                if raw && !command.synthetic {
                    continue;
                }
                if skip_math {
                    math.command(&command.name);
                    if math.open.is_some() {
                        continue;
                    }
                }
                // Environment names are not prose.
                if matches!(command.name.as_str(), "begin" | "end") {
                    continue;
                }
                push_slots(ctx, &mut out, node, command, false, skip_math);
            }
            Node::Environment(env) => {
                // Raw environment options configure the body; `lstlisting`
                // options reappear as synthetic commands.
                if raw || ctx.grammar.is_raw_environment(&env.name) {
                    continue;
                }
                push_slots(ctx, &mut out, node, &env.begin, true, skip_math);
            }
        }
    }
    out
}

fn push_slots<'d>(
    ctx: &RuleContext<'d>,
    out: &mut Vec<Prose<'d>>,
    node: &'d Node,
    command: &'d CommandNode,
    is_environment: bool,
    skip_math: bool,
) {
    let name = match node {
        Node::Environment(env) => env.name.as_str(),
        _ => command.name.as_str(),
    };
    let schema = ctx.grammar.schema_for(name, is_environment);
    for parameter in command.slots() {
        if schema.slot_order.get(parameter.slot) == Some(&Slot::FreeformBoundary) {
            continue;
        }
        let origin = Origin {
            node,
            file: command.location.file,
            parameter: Some(parameter),
            offset: usize::from(parameter.offset),
        };
        push_pieces(out, origin, parameter.text(), skip_math, &mut MathState::default());
    }
}

#[derive(Clone, Copy)]
struct Origin<'d> {
    node: &'d Node,
    file: FileId,
    parameter: Option<&'d Parameter>,
    offset: usize,
}

fn push_pieces<'d>(
    out: &mut Vec<Prose<'d>>,
    origin: Origin<'d>,
    text: &'d str,
    skip_math: bool,
    math: &mut MathState,
) {
    let ranges = if skip_math {
        math.split(text)
    } else {
        vec![(0, text.len())]
    };
    for (start, end) in ranges {
        if start < end {
            out.push(Prose {
                node: origin.node,
                file: origin.file,
                owner: text,
                start,
                text: &text[start..end],
                parameter: origin.parameter,
                offset: origin.offset,
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathDelimiter {
    Dollar,
    DoubleDollar,
    Paren,
    Bracket,
}

/// Inline and display math state carried across nodes.
#[derive(Debug, Default)]
struct MathState {
    open: Option<MathDelimiter>,
}

impl MathState {
    /// Byte ranges of `text` outside math, updating the state on the way.
    fn split(&mut self, text: &str) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let mut segment = 0;
        let mut i = 0;
        while let Some(c) = text[i..].chars().next() {
            if c != '$' {
                i += c.len_utf8();
                continue;
            }
            let double = text[i + 1..].starts_with('$');
            match self.open {
                None => {
                    ranges.push((segment, i));
                    self.open = Some(if double {
                        MathDelimiter::DoubleDollar
                    } else {
                        MathDelimiter::Dollar
                    });
                    i += if double { 2 } else { 1 };
                }
                Some(MathDelimiter::Dollar) => {
                    self.open = None;
                    i += 1;
                    segment = i;
                }
                Some(MathDelimiter::DoubleDollar) if double => {
                    self.open = None;
                    i += 2;
                    segment = i;
                }
                Some(_) => i += 1,
            }
        }
        if self.open.is_none() {
            ranges.push((segment, text.len()));
        }
        ranges.retain(|(start, end)| start < end);
        ranges
    }

    /// Tracks `\(`, `\)`, `\[` and `\]`.
    fn command(&mut self, name: &str) {
        match (name, self.open) {
            ("(", None) => self.open = Some(MathDelimiter::Paren),
            ("[", None) => self.open = Some(MathDelimiter::Bracket),
            (")", Some(MathDelimiter::Paren)) | ("]", Some(MathDelimiter::Bracket)) => {
                self.open = None
            }
            _ => {}
        }
    }
}

/// Up to `width` characters of source on each side of `prose.text[start..end]`.
///
/// The window starts from the whole owning node, rendered when the piece is a
/// slot value, and grows into neighbouring nodes while it is too short.
pub fn context_window(
    ctx: &RuleContext<'_>,
    prose: &Prose<'_>,
    start: usize,
    end: usize,
    width: usize,
) -> (String, String) {
    let doc = ctx.document;
    let id = prose.node.id().index();

    let (whole, base) = match prose.parameter {
        Some(parameter) => match render_node_around(prose.node, ctx.grammar, Some(parameter)) {
            (rendered, Some(range)) => (rendered, range.start),
            (_, None) => (prose.owner.to_string(), 0),
        },
        None => (prose.owner.to_string(), 0),
    };
    let at = base + prose.start;

    let mut left = whole[..at + start].to_string();
    let mut before = id;
    while left.chars().count() < width && before > 0 {
        before -= 1;
        left.insert_str(0, &render_node(&doc.nodes()[before], ctx.grammar));
    }

    let mut right = whole[at + end..].to_string();
    let mut after = id + 1;
    while right.chars().count() < width && after < doc.len() {
        right.push_str(&render_node(&doc.nodes()[after], ctx.grammar));
        after += 1;
    }

    let skip = left.chars().count().saturating_sub(width);
    let left: String = left.chars().skip(skip).map(flatten_whitespace).collect();
    let right: String = right.chars().take(width).map(flatten_whitespace).collect();
    (left, right)
}

fn flatten_whitespace(c: char) -> char {
    if c.is_whitespace() { ' ' } else { c }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleConfig;
    use texcheck_syntax::{AnalysisSession, Document, GrammarRegistry};

    fn pieces(text: &str, skip_math: bool) -> Vec<String> {
        let grammar = GrammarRegistry::builtin();
        let config = RuleConfig::default();
        let doc: Document = AnalysisSession::new(&grammar, ".").scan_text("main.tex", text);
        let ctx = RuleContext::new(&doc, &grammar, &config);
        collect(&ctx, skip_math)
            .iter()
            .map(|p| p.text.to_string())
            .collect()
    }

    #[test]
    fn test_text_and_arguments() {
        assert_eq!(
            pieces(r"Intro \section{Title} \verb|code| end", false),
            vec!["Intro ", "Title", " ", " end"]
        );
    }

    #[test]
    fn test_raw_bodies_are_skipped_but_listing_options_kept() {
        assert_eq!(
            pieces(
                "\\begin{lstlisting}[caption={A \"B\"}]\nx = \"y\"\n\\end{lstlisting}",
                false
            ),
            vec!["A \"B\""]
        );
    }

    #[test]
    fn test_inline_math_is_skipped() {
        assert_eq!(
            pieces(r"a $x - y$ b \(z - 1\) c $$w$$ d", true),
            vec!["a ", " b ", " c ", " d"]
        );
    }

    #[test]
    fn test_math_spanning_commands() {
        assert_eq!(pieces(r"a $\frac{1}{2} - x$ b", true), vec!["a ", " b"]);
    }

    #[test]
    fn test_math_environments_are_skipped() {
        assert_eq!(
            pieces(r"a\begin{align*}x - y\end{align*}b", true),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_offsets_map_to_source() {
        let grammar = GrammarRegistry::builtin();
        let config = RuleConfig::default();
        let source = r"One $m$ two \emph{three}";
        let doc = AnalysisSession::new(&grammar, ".").scan_text("main.tex", source);
        let ctx = RuleContext::new(&doc, &grammar, &config);
        for piece in collect(&ctx, true) {
            let offset = piece.offset_of(0);
            assert_eq!(&source[offset..offset + piece.text.len()], piece.text);
        }
    }

    #[test]
    fn test_offsets_skip_comments_inside_arguments() {
        let grammar = GrammarRegistry::builtin();
        let config = RuleConfig::default();
        let source = "\\section{A % note\nB $m$ C}";
        let doc = AnalysisSession::new(&grammar, ".").scan_text("main.tex", source);
        let ctx = RuleContext::new(&doc, &grammar, &config);
        let pieces = collect(&ctx, true);
        let last = pieces.last().unwrap();
        assert_eq!(last.text, " C");
        assert_eq!(&source[last.offset_of(1)..][..1], "C");
        let first = &pieces[0];
        let b = first.text.find('B').unwrap();
        assert_eq!(&source[first.offset_of(b)..][..1], "B");
    }

    #[test]
    fn test_context_window_reaches_into_neighbours() {
        let grammar = GrammarRegistry::builtin();
        let config = RuleConfig::default();
        let doc = AnalysisSession::new(&grammar, ".")
            .scan_text("main.tex", "\\textbf{Bold}\nsee - here\\ref{x} and more text");
        let ctx = RuleContext::new(&doc, &grammar, &config);
        let prose = collect(&ctx, false);
        let piece = prose.iter().find(|p| p.text.contains(" - ")).unwrap();
        let at = piece.text.find('-').unwrap();
        let (left, right) = context_window(&ctx, piece, at, at + 1, 10);
        assert_eq!(left, "Bold} see ");
        assert_eq!(right, " here\\ref{");
    }

    #[test]
    fn test_context_window_covers_the_whole_owner() {
        let grammar = GrammarRegistry::builtin();
        let config = RuleConfig::default();
        let doc = AnalysisSession::new(&grammar, ".")
            .scan_text("main.tex", "\\section{Rust $x$ - fast} next");
        let ctx = RuleContext::new(&doc, &grammar, &config);
        let prose = collect(&ctx, true);
        let piece = prose.iter().find(|p| p.text.contains('-')).unwrap();
        let at = piece.text.find('-').unwrap();
        let (left, right) = context_window(&ctx, piece, at, at + 1, 12);
        assert_eq!(left, "on{Rust $x$ ");
        assert_eq!(right, " fast} next");
    }
}
