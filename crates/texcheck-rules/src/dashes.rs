//! A hyphen standing alone between spaces is almost always meant as a dash.
//!
//! `well-known` and `--`/`---` are left alone; `word - word` is reported with
//! a short window of surrounding source. Math is skipped, where `-` is minus.

use crate::diagnostic::Diagnostic;
use crate::prose::{self, Prose};
use crate::{Rule, RuleContext, RuleError};

pub struct DashRule;

impl Rule for DashRule {
    fn code(&self) -> &'static str {
        "dash"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let replacement = &ctx.config.hyphen_replacement;
        let width = ctx.config.context_width;
        let mut diagnostics = Vec::new();

        for piece in prose::collect(ctx, true) {
            for index in standalone_hyphens(&piece) {
                let (left, right) = prose::context_window(ctx, &piece, index, index + 1, width);
                let start = piece.offset_of(index);
                let location = ctx.locate(piece.file, start, start + 1);
                diagnostics.push(
                    Diagnostic::warning(
                        self.code(),
                        format!("standalone hyphen, probably meant as a dash (`{replacement}`)"),
                    )
                    .at(ctx.document, &location)
                    .with_original(format!("{left}-{right}"))
                    .with_fix(format!("{left}{replacement}{right}"))
                    .for_node(piece.node.id()),
                );
            }
        }
        Ok(diagnostics)
    }
}

/// Byte indices of `-` whose neighbours in the owning text are both
/// whitespace or its edge.
fn standalone_hyphens(piece: &Prose<'_>) -> Vec<usize> {
    piece
        .text
        .char_indices()
        .filter(|&(index, c)| {
            if c != '-' {
                return false;
            }
            let (before, after) = piece.neighbours(index, index + 1);
            before.is_none_or(char::is_whitespace) && after.is_none_or(char::is_whitespace)
        })
        .map(|(index, _)| index)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleConfig;
    use texcheck_syntax::{AnalysisSession, GrammarRegistry};

    fn check(text: &str) -> Vec<Diagnostic> {
        let grammar = GrammarRegistry::builtin();
        let config = RuleConfig::default();
        let doc = AnalysisSession::new(&grammar, ".").scan_text("main.tex", text);
        DashRule.check(&RuleContext::new(&doc, &grammar, &config)).unwrap()
    }

    #[test]
    fn test_spaced_hyphen_is_flagged() {
        let found = check("word - word");
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].line, found[0].column), (1, 6));
        assert_eq!(found[0].original_text, "word - word");
        assert_eq!(found[0].suggested_fix.as_deref(), Some("word --- word"));
    }

    #[test]
    fn test_compound_words_and_dashes_are_fine() {
        assert!(check("well-known").is_empty());
        assert!(check("pages 1--5 and a -- b or a --- b").is_empty());
        assert!(check("-1 and x-").is_empty());
    }

    #[test]
    fn test_math_is_ignored() {
        assert!(check(r"$a - b$ and \(x - y\) and \[ p - q \]").is_empty());
        assert!(check("\\begin{equation}\na - b\n\\end{equation}").is_empty());
    }

    #[test]
    fn test_hyphen_in_argument() {
        let found = check(r"\section{Rust - a systems language}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column, 15);
    }

    #[test]
    fn test_hyphen_between_math_is_minus() {
        assert!(check("range $a$-$b$ and more").is_empty());
        assert!(check(r"\section{From $a$-$b$}").is_empty());
    }

    #[test]
    fn test_window_keeps_the_rest_of_the_node() {
        let found = check(r"range $a$ - $b$ and \cite{x}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column, 11);
        assert_eq!(found[0].original_text, "range $a$ - $b$ and \\cite{x}");
    }

    #[test]
    fn test_window_inside_argument() {
        let found = check("Text \\section{Rust $x$ - a language} after");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].column, 24);
        assert_eq!(
            found[0].suggested_fix.as_deref(),
            Some("t \\section{Rust $x$ --- a language} after")
        );
    }

    #[test]
    fn test_line_start_hyphen() {
        let found = check("First line\n- second");
        assert_eq!((found[0].line, found[0].column), (2, 1));
        assert_eq!(found[0].original_text, "First line - second");
    }
}
