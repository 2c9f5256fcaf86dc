//! Punctuation and case of list items.
//!
//! The text right before a list decides its style:
//!
//! - `Fruits:` introduces lowercase items ending in `;`
//! - `Fruits are listed below.` introduces capitalised items ending in `.`
//!
//! Whatever the style, the last item ends a sentence (`.`, `!` or `?`).

use texcheck_syntax::{
    CommandNode, Document, EnvironmentNode, FileId, Node, Parameter, ParseMode, Slot,
};

use crate::diagnostic::Diagnostic;
use crate::{Rule, RuleContext, RuleError};

pub struct ListRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStyle {
    /// `:` intro, lowercase items, `;` after each but the last.
    Colon,
    /// Sentence intro, uppercase items, `.` after each.
    Sentence,
}

impl ListStyle {
    fn classify(intro: char) -> Option<Self> {
        match intro {
            ':' => Some(ListStyle::Colon),
            '.' | '!' | '?' => Some(ListStyle::Sentence),
            _ => None,
        }
    }

    fn separator(self) -> char {
        match self {
            ListStyle::Colon => ';',
            ListStyle::Sentence => '.',
        }
    }

    fn case_matches(self, letter: char) -> bool {
        match self {
            ListStyle::Colon => !letter.is_uppercase(),
            ListStyle::Sentence => !letter.is_lowercase(),
        }
    }

    fn case_name(self) -> &'static str {
        match self {
            ListStyle::Colon => "lowercase",
            ListStyle::Sentence => "uppercase",
        }
    }
}

fn ends_sentence(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// A run of item text and where it starts.
#[derive(Debug, Clone, Copy)]
struct Piece<'d> {
    file: FileId,
    offset: usize,
    text: &'d str,
    /// Set for argument text, which maps through the parameter.
    argument: Option<&'d Parameter>,
}

impl Piece<'_> {
    fn offset_of(&self, index: usize) -> usize {
        self.argument
            .map_or(self.offset + index, |argument| argument.source_offset(index))
    }
}

/// One `\item` and the text up to the next one.
#[derive(Debug)]
struct Item<'d> {
    command: &'d CommandNode,
    pieces: Vec<Piece<'d>>,
    /// Set when a nested list sits inside the item.
    nested_list: bool,
}

/// A character of item text with its file position.
#[derive(Debug, Clone, Copy)]
struct Spot {
    c: char,
    file: FileId,
    offset: usize,
}

impl Item<'_> {
    fn first_letter(&self) -> Option<Spot> {
        self.pieces.iter().find_map(|piece| {
            piece
                .text
                .char_indices()
                .find(|(_, c)| c.is_alphabetic())
                .map(|(index, c)| Spot {
                    c,
                    file: piece.file,
                    offset: piece.offset_of(index),
                })
        })
    }

    fn last_char(&self) -> Option<Spot> {
        self.pieces.iter().rev().find_map(|piece| {
            piece
                .text
                .char_indices()
                .rev()
                .find(|(_, c)| !c.is_whitespace())
                .map(|(index, c)| Spot {
                    c,
                    file: piece.file,
                    offset: piece.offset_of(index),
                })
        })
    }
}

impl Rule for ListRule {
    fn code(&self) -> &'static str {
        "list"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let doc = ctx.document;
        let mut diagnostics = Vec::new();

        for env in doc.environments() {
            if !is_list(ctx, env) {
                continue;
            }
            let intro = introduction(doc, env);
            let Some(style) = intro.and_then(ListStyle::classify) else {
                let found = intro.map_or_else(|| "nothing".to_string(), |c| format!("`{c}`"));
                diagnostics.push(
                    Diagnostic::error(
                        self.code(),
                        format!(
                            "`{}` must follow a colon or a full sentence, found {found}",
                            env.name
                        ),
                    )
                    .at(doc, &env.begin.location)
                    .with_original(intro.map(String::from).unwrap_or_default())
                    .for_node(env.id()),
                );
                continue;
            };

            let items = items(ctx, env);
            let last = items.len().saturating_sub(1);
            for (index, item) in items.iter().enumerate() {
                let (Some(first), Some(end)) = (item.first_letter(), item.last_char()) else {
                    continue;
                };
                if !style.case_matches(first.c) {
                    diagnostics.push(self.at_spot(
                        ctx,
                        item,
                        first,
                        format!("item should start with a {} letter", style.case_name()),
                        if style == ListStyle::Colon {
                            first.c.to_lowercase().collect()
                        } else {
                            first.c.to_uppercase().collect()
                        },
                    ));
                }
                if item.nested_list {
                    continue;
                }
                if index == last {
                    if !ends_sentence(end.c) {
                        diagnostics.push(self.at_spot(
                            ctx,
                            item,
                            end,
                            "last item should end with `.`, `!` or `?`".to_string(),
                            format!("{}.", end.c),
                        ));
                    }
                } else if end.c != style.separator() {
                    diagnostics.push(self.at_spot(
                        ctx,
                        item,
                        end,
                        format!("item should end with `{}`", style.separator()),
                        format!("{}{}", end.c, style.separator()),
                    ));
                }
            }
        }

        Ok(diagnostics)
    }
}

impl ListRule {
    fn at_spot(
        &self,
        ctx: &RuleContext<'_>,
        item: &Item<'_>,
        spot: Spot,
        message: String,
        fix: String,
    ) -> Diagnostic {
        let location = ctx.locate(spot.file, spot.offset, spot.offset + spot.c.len_utf8());
        Diagnostic::error(self.code(), message)
            .at(ctx.document, &location)
            .with_original(spot.c.to_string())
            .with_fix(fix)
            .for_node(item.command.id)
    }
}

fn is_list(ctx: &RuleContext<'_>, env: &EnvironmentNode) -> bool {
    ctx.config
        .list_environments
        .iter()
        .any(|name| name == env.base_name())
}

/// Last visible character before `\begin{list}`, skipping blank text.
fn introduction(doc: &Document, env: &EnvironmentNode) -> Option<char> {
    let mut id = env.id();
    while let Some(node) = doc.before(id) {
        match node {
            Node::Text(text) => match text.content.trim_end().chars().next_back() {
                Some(c) => return Some(c),
                None => id = node.id(),
            },
            // `\textbf{Ingredients:}` introduces as well as plain text.
            Node::Command(command) if command.name != "end" => {
                return command
                    .arguments
                    .iter()
                    .rev()
                    .find(|arg| arg.is_phrase())
                    .and_then(|arg| arg.text().trim_end().chars().next_back());
            }
            _ => return None,
        }
    }
    None
}

/// Splits the direct children of a list into items.
fn items<'d>(ctx: &RuleContext<'d>, env: &'d EnvironmentNode) -> Vec<Item<'d>> {
    let doc = ctx.document;
    let mut items: Vec<Item<'d>> = Vec::new();

    for node in doc.children(env) {
        if let Node::Command(command) = node {
            if command.name == "item" {
                items.push(Item {
                    command,
                    pieces: Vec::new(),
                    nested_list: false,
                });
                continue;
            }
        }
        // Anything before the first `\item` is not part of an item.
        let Some(item) = items.last_mut() else {
            continue;
        };
        match node {
            Node::Text(text) => item.pieces.push(Piece {
                file: text.location.file,
                offset: usize::from(text.location.range.start()),
                text: &text.content,
                argument: None,
            }),
            Node::Command(command) => {
                let schema = ctx.grammar.schema_for(&command.name, false);
                for arg in &command.arguments {
                    let required = schema.slot_order.get(arg.slot) == Some(&Slot::Required);
                    if required && schema.mode_of(Slot::Required) == ParseMode::Phrase {
                        item.pieces.push(Piece {
                            file: command.location.file,
                            offset: usize::from(arg.offset),
                            text: arg.text(),
                            argument: Some(arg),
                        });
                    }
                }
            }
            Node::Environment(inner) => item.nested_list |= is_list(ctx, inner),
        }
    }
    items
}
