//! Scanner for a single `[...]`, `{...}` or `|...|` group after a command name.
//!
//! ## Overview
//!
//! [`scan_slot`] is a five-state machine:
//!
//! ```text
//! AwaitOpen ──open──► ParamName ◄──────────────┐      (value mode)
//!     │                 │  ▲  │ '='             │ '}'
//!     │                 │  └──┘ ','             │
//!     │                 ▼                       │
//!     │               Value ──'{'──► PhraseValue┘
//!     └──open──► Phrase                                (phrase mode)
//! ```
//!
//! Whitespace and comments before the opening delimiter are skipped. Any other
//! character there means the slot is absent: nothing is consumed and no
//! parameters are returned.
//!
//! A bracket balance local to the scan keeps nested delimiter pairs from closing
//! the group early. `%` comments are dropped in every state; an escaped
//! delimiter (`\{`, `\]`, `\%`) is content.
//!
//! An unterminated group is not an error: the scan stops at end of text with the
//! parameters completed so far and [`SlotScan::terminated`] unset.
//!
//! ## Examples
//!
//! ```
//! use texcheck_syntax::grammar::ParseMode;
//! use texcheck_syntax::params::{scan_slot, Delimiters, ScanCursor};
//!
//! let text = r"\usepackage[a4paper, margin=2cm]{geometry}";
//! let start = ScanCursor::at(11);
//! let scan = scan_slot(text, start, ParseMode::Value, Delimiters::BRACKETS, 0);
//!
//! assert_eq!(scan.parameters.len(), 2);
//! assert_eq!(scan.parameters[0].name, "a4paper");
//! assert_eq!(scan.parameters[1].value.as_deref(), Some("2cm"));
//! assert_eq!(scan.consumed, 21);
//! ```

use rowan::TextSize;
use serde::Serialize;

use crate::grammar::ParseMode;

/// Position of the scanner inside one file's text.
///
/// Threaded through every scanning call by value so that no scanning state
/// lives outside the call chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanCursor {
    /// Byte offset into the file text.
    pub offset: usize,
    /// 1-based line of `offset`.
    pub line: u32,
    /// Open-minus-close delimiter count of the group being scanned.
    pub balance: i32,
}

impl ScanCursor {
    pub fn start() -> Self {
        Self {
            offset: 0,
            line: 1,
            balance: 0,
        }
    }

    /// A cursor at `offset`, for text known to contain no newline before it.
    pub fn at(offset: usize) -> Self {
        Self {
            offset,
            ..Self::start()
        }
    }

    pub fn advance(&mut self, ch: char) {
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
        }
    }

    /// Advances over `text[self.offset..target]`.
    pub fn advance_to(&mut self, text: &str, target: usize) {
        if let Some(skipped) = text.get(self.offset..target) {
            self.line += skipped.matches('\n').count() as u32;
            self.offset = target;
        }
    }
}

/// The opening and closing character of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Delimiters {
    pub const BRACKETS: Self = Self {
        open: '[',
        close: ']',
    };
    pub const BRACES: Self = Self {
        open: '{',
        close: '}',
    };
}

/// One value extracted from a group.
///
/// Value-mode groups yield `name` or `name=value` items. Phrase-mode groups
/// yield a single item with an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub value: Option<String>,
    /// Index of the slot (in the command's slot order) this came from.
    pub slot: usize,
    /// Source offset of the first character of [`Parameter::text`].
    pub offset: TextSize,
    /// `(index, offset)` pairs: byte `index` of the text and everything after
    /// it continues at source `offset`, past a dropped `%` comment.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resumes: Vec<(usize, TextSize)>,
}

impl Parameter {
    pub fn phrase(value: impl Into<String>, slot: usize, offset: TextSize) -> Self {
        Self {
            name: String::new(),
            value: Some(value.into()),
            slot,
            offset,
            resumes: Vec::new(),
        }
    }

    pub fn with_resumes(mut self, resumes: Vec<(usize, TextSize)>) -> Self {
        self.resumes = resumes;
        self
    }

    /// Source offset of byte `index` of [`Parameter::text`].
    pub fn source_offset(&self, index: usize) -> usize {
        let (base, offset) = self
            .resumes
            .iter()
            .rev()
            .find(|(at, _)| *at <= index)
            .map_or((0, self.offset), |&(at, offset)| (at, offset));
        usize::from(offset) + (index - base)
    }

    /// The value when present, otherwise the name.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.name)
    }

    pub fn is_phrase(&self) -> bool {
        self.name.is_empty() && self.value.is_some()
    }
}

/// Result of scanning one slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotScan {
    pub parameters: Vec<Parameter>,
    /// Bytes consumed from the start offset; `0` when the slot is absent.
    pub consumed: usize,
    /// Whether the closing delimiter was found.
    pub terminated: bool,
    /// The cursor after the slot.
    pub cursor: ScanCursor,
}

impl SlotScan {
    fn absent(cursor: ScanCursor) -> Self {
        Self {
            parameters: Vec::new(),
            consumed: 0,
            terminated: true,
            cursor,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.consumed == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitOpen,
    ParamName,
    Value,
    Phrase,
    PhraseValue,
}

/// Characters allowed in parameter names and bare values.
pub fn is_parameter_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '!' | '?' | '.' | ':' | '_' | '-')
}

#[derive(Debug, Default)]
struct Pending {
    name: String,
    value: Option<String>,
    offset: Option<usize>,
    resumes: Vec<(usize, TextSize)>,
}

impl Pending {
    fn mark(&mut self, at: usize) {
        self.offset.get_or_insert(at);
    }

    fn finish(&mut self, slot: usize, into: &mut Vec<Parameter>) {
        let pending = std::mem::take(self);
        if pending.name.is_empty() && pending.value.is_none() {
            return;
        }
        into.push(Parameter {
            name: pending.name,
            value: pending.value,
            slot,
            offset: text_size(pending.offset.unwrap_or_default()),
            resumes: pending.resumes,
        });
    }
}

pub(crate) fn text_size(offset: usize) -> TextSize {
    TextSize::from(u32::try_from(offset).unwrap_or(u32::MAX))
}

/// Scans one bracketed group starting at `start`.
///
/// `slot` is recorded on every produced [`Parameter`].
pub fn scan_slot(
    text: &str,
    start: ScanCursor,
    mode: ParseMode,
    delimiters: Delimiters,
    slot: usize,
) -> SlotScan {
    let Delimiters { open, close } = delimiters;
    let mut cursor = ScanCursor {
        balance: 0,
        ..start
    };
    let mut state = State::AwaitOpen;
    let mut parameters = Vec::new();
    let mut pending = Pending::default();
    let mut phrase = String::new();
    let mut phrase_start = 0;
    let mut phrase_resumes = Vec::new();
    let mut value_depth = 0usize;
    let mut in_comment = false;
    let mut escaped = false;

    while let Some(ch) = text[cursor.offset..].chars().next() {
        let at = cursor.offset;
        cursor.advance(ch);

        if in_comment {
            if ch != '\n' {
                continue;
            }
            in_comment = false;
            // The newline ending the comment is content again.
            match state {
                State::Phrase => phrase_resumes.push((phrase.len(), text_size(at))),
                State::PhraseValue => {
                    let resumed = pending.value.as_ref().map_or(0, String::len);
                    pending.resumes.push((resumed, text_size(at)));
                }
                _ => {}
            }
        }

        if escaped {
            escaped = false;
            match state {
                State::Phrase => phrase.push(ch),
                State::PhraseValue => pending.value.get_or_insert_default().push(ch),
                _ => {}
            }
            continue;
        }

        if ch == '%' {
            in_comment = true;
            continue;
        }

        if ch == '\\' {
            // Only control symbols are escapes; `\name` is ordinary content.
            escaped = text[cursor.offset..]
                .chars()
                .next()
                .is_some_and(|next| !next.is_alphabetic());
            match state {
                State::AwaitOpen => return SlotScan::absent(start),
                State::Phrase => phrase.push(ch),
                State::PhraseValue => pending.value.get_or_insert_default().push(ch),
                _ => {}
            }
            continue;
        }

        match state {
            State::AwaitOpen => {
                if ch.is_whitespace() {
                    continue;
                }
                if ch != open {
                    return SlotScan::absent(start);
                }
                cursor.balance = 1;
                phrase_start = cursor.offset;
                state = match mode {
                    ParseMode::Value => State::ParamName,
                    ParseMode::Phrase => State::Phrase,
                };
            }
            State::Phrase => {
                if ch == open {
                    cursor.balance += 1;
                } else if ch == close {
                    cursor.balance -= 1;
                    if cursor.balance == 0 {
                        parameters.push(
                            Parameter::phrase(
                                std::mem::take(&mut phrase),
                                slot,
                                text_size(phrase_start),
                            )
                            .with_resumes(std::mem::take(&mut phrase_resumes)),
                        );
                        return finished(start, cursor, parameters, true);
                    }
                }
                phrase.push(ch);
            }
            State::ParamName => {
                if is_parameter_char(ch) {
                    pending.mark(at);
                    pending.name.push(ch);
                } else if ch == ',' {
                    pending.finish(slot, &mut parameters);
                } else if ch == '=' {
                    pending.value.get_or_insert_default();
                    state = State::Value;
                } else if ch == open {
                    cursor.balance += 1;
                } else if ch == close {
                    cursor.balance -= 1;
                    if cursor.balance == 0 {
                        pending.finish(slot, &mut parameters);
                        return finished(start, cursor, parameters, true);
                    }
                }
            }
            State::Value => {
                if ch == '{' {
                    value_depth = 1;
                    pending.offset = Some(cursor.offset);
                    pending.resumes.clear();
                    pending.value.get_or_insert_default();
                    state = State::PhraseValue;
                } else if ch == ',' {
                    pending.finish(slot, &mut parameters);
                    state = State::ParamName;
                } else if is_parameter_char(ch) {
                    let value = pending.value.get_or_insert_default();
                    if value.is_empty() {
                        pending.offset = Some(at);
                    }
                    value.push(ch);
                } else if ch == open {
                    cursor.balance += 1;
                } else if ch == close {
                    cursor.balance -= 1;
                    if cursor.balance == 0 {
                        pending.finish(slot, &mut parameters);
                        return finished(start, cursor, parameters, true);
                    }
                }
            }
            State::PhraseValue => {
                if ch == '{' {
                    value_depth += 1;
                } else if ch == '}' {
                    value_depth -= 1;
                    if value_depth == 0 {
                        state = State::ParamName;
                        continue;
                    }
                }
                pending.value.get_or_insert_default().push(ch);
            }
        }
    }

    if state == State::AwaitOpen {
        return SlotScan::absent(start);
    }
    finished(start, cursor, parameters, false)
}

fn finished(
    start: ScanCursor,
    cursor: ScanCursor,
    parameters: Vec<Parameter>,
    terminated: bool,
) -> SlotScan {
    SlotScan {
        parameters,
        consumed: cursor.offset - start.offset,
        terminated,
        cursor,
    }
}

/// Scans a group delimited by two occurrences of the same character, as in
/// `\verb|text|`. The delimiter is the character right after the command name.
pub fn scan_boundary(text: &str, start: ScanCursor, slot: usize) -> SlotScan {
    let rest = &text[start.offset..];
    let Some(delimiter) = rest.chars().next() else {
        return SlotScan::absent(start);
    };
    if delimiter.is_alphanumeric() || delimiter.is_whitespace() || matches!(delimiter, '{' | '[')
    {
        return SlotScan::absent(start);
    }

    let mut cursor = start;
    cursor.advance(delimiter);
    let content_start = cursor.offset;
    while let Some(ch) = text[cursor.offset..].chars().next() {
        if ch == '\n' {
            break;
        }
        let at = cursor.offset;
        cursor.advance(ch);
        if ch == delimiter {
            let parameters = vec![Parameter::phrase(
                &text[content_start..at],
                slot,
                text_size(content_start),
            )];
            return finished(start, cursor, parameters, true);
        }
    }
    finished(start, cursor, Vec::new(), false)
}
