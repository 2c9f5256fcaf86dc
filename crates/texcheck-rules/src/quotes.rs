//! Forbidden quotation characters.

use crate::diagnostic::Diagnostic;
use crate::prose::{self, Prose};
use crate::{Rule, RuleContext, RuleError};

pub struct QuoteRule;

impl Rule for QuoteRule {
    fn code(&self) -> &'static str {
        "quotes"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let forbidden = &ctx.config.forbidden_quotes;
        let pair = &ctx.config.quote_pair;
        let mut diagnostics = Vec::new();

        for piece in prose::collect(ctx, false) {
            for (index, quote) in piece.text.char_indices() {
                if !forbidden.contains(&quote) {
                    continue;
                }
                let replacement = if opens_quotation(&piece, index) {
                    &pair.open
                } else {
                    &pair.close
                };
                let start = piece.offset_of(index);
                let location = ctx.locate(piece.file, start, start + quote.len_utf8());
                diagnostics.push(
                    Diagnostic::error(
                        self.code(),
                        format!("quotation mark `{quote}` is not allowed; use {}…{}", pair.open, pair.close),
                    )
                    .at(ctx.document, &location)
                    .with_original(quote.to_string())
                    .with_fix(replacement.clone())
                    .for_node(piece.node.id()),
                );
            }
        }
        Ok(diagnostics)
    }
}

/// Whether the quote at `index` opens a quotation: it starts its text or
/// follows whitespace or an opening bracket.
fn opens_quotation(piece: &Prose<'_>, index: usize) -> bool {
    piece
        .neighbours(index, index)
        .0
        .is_none_or(|before| before.is_whitespace() || matches!(before, '(' | '[' | '{'))
}
