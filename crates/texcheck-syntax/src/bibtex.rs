//! Bibliography database reader.
//!
//! ## Overview
//!
//! Citation checks only need to know which keys a `.bib` file defines and where.
//! This reader therefore extracts `@type{key, field = value, ...}` entries and
//! nothing more, on a best-effort basis:
//!
//! - text outside entries and `%` lines between entries are skipped
//! - `@comment`, `@string` and `@preamble` blocks define no keys
//! - field values may be `{...}`, `"..."` or bare words
//!
//! ## Examples
//!
//! ```
//! use texcheck_syntax::bibtex::parse_bibtex;
//!
//! let input = r#"
//!     @article{knuth84,
//!         author = {Donald Knuth},
//!         title = {Literate Programming},
//!         year = 1984
//!     }
//! "#;
//!
//! let file = parse_bibtex(input);
//! assert_eq!(file.keys().collect::<Vec<_>>(), vec!["knuth84"]);
//! assert_eq!(file.entries[0].fields["year"], "1984");
//! ```

use rowan::TextRange;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::CharIndices;

use crate::params::text_size;

/// Block types that look like entries but define no citation key.
const NON_ENTRY_TYPES: &[&str] = &["comment", "string", "preamble"];

/// One `@type{key, ...}` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    /// Lowercased entry type, e.g. `article`.
    pub entry_type: String,
    pub key: String,
    /// Lowercased field names mapped to their raw values.
    pub fields: HashMap<String, String>,
    /// The whole entry.
    pub range: TextRange,
    /// Just the key.
    pub key_range: TextRange,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibFile {
    pub entries: Vec<BibEntry>,
}

impl BibFile {
    /// Keys in file order, duplicates included.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }
}

type Chars<'a> = Peekable<CharIndices<'a>>;

/// Parses `.bib` text, keeping every recognizable entry.
pub fn parse_bibtex(input: &str) -> BibFile {
    let mut entries = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '%' => skip_line(&mut chars),
            '@' => {
                if let Some(entry) = parse_entry(&mut chars, start, input.len()) {
                    entries.push(entry);
                }
            }
            _ => {}
        }
    }

    BibFile { entries }
}

fn parse_entry(chars: &mut Chars<'_>, start: usize, input_len: usize) -> Option<BibEntry> {
    let entry_type = read_until(chars, |c| c == '{' || c == '(' || c.is_whitespace())?;
    let entry_type = entry_type.to_lowercase();
    skip_whitespace(chars);

    let close = match chars.next() {
        Some((_, '{')) => '}',
        Some((_, '(')) => ')',
        _ => return None,
    };
    if NON_ENTRY_TYPES.contains(&entry_type.as_str()) {
        skip_group(chars, close);
        return None;
    }
    skip_whitespace(chars);

    let key_start = chars.peek().map_or(input_len, |&(index, _)| index);
    let key = read_until(chars, |c| c == ',' || c == close || c.is_whitespace())?;
    let key_range = TextRange::new(text_size(key_start), text_size(key_start + key.len()));
    skip_whitespace(chars);
    if let Some(&(_, ',')) = chars.peek() {
        chars.next();
    }

    let mut fields = HashMap::new();
    let mut end = input_len;
    loop {
        skip_whitespace(chars);
        match chars.peek() {
            None => break,
            Some(&(index, c)) if c == close => {
                chars.next();
                end = index + 1;
                break;
            }
            Some(&(_, '%')) => {
                skip_line(chars);
                continue;
            }
            Some(&(_, ',')) => {
                chars.next();
                continue;
            }
            Some(_) => {}
        }

        let Some(name) = read_until(chars, |c| c == '=' || c == ',' || c == close || c.is_whitespace())
        else {
            // Stray character; step over it.
            chars.next();
            continue;
        };
        skip_whitespace(chars);
        if let Some(&(_, '=')) = chars.peek() {
            chars.next();
            skip_whitespace(chars);
            if let Some(value) = read_value(chars, close) {
                fields.insert(name.to_lowercase(), value);
            }
        }
    }

    Some(BibEntry {
        entry_type,
        key,
        fields,
        range: TextRange::new(text_size(start), text_size(end)),
        key_range,
    })
}

fn read_value(chars: &mut Chars<'_>, close: char) -> Option<String> {
    let &(_, c) = chars.peek()?;
    match c {
        '"' => {
            chars.next();
            let mut value = String::new();
            while let Some((_, ch)) = chars.next() {
                match ch {
                    '"' => break,
                    '\\' => {
                        value.push(ch);
                        if let Some((_, escaped)) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    _ => value.push(ch),
                }
            }
            Some(value)
        }
        '{' => {
            chars.next();
            Some(read_braced(chars))
        }
        _ => read_until(chars, |ch| ch == ',' || ch == close || ch.is_whitespace()),
    }
}

/// Reads up to the brace closing an already consumed `{`.
fn read_braced(chars: &mut Chars<'_>) -> String {
    let mut value = String::new();
    let mut depth = 1;
    for (_, ch) in chars.by_ref() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            _ => {}
        }
        value.push(ch);
    }
    value
}

fn skip_group(chars: &mut Chars<'_>, close: char) {
    let mut depth = 1;
    for (_, ch) in chars.by_ref() {
        if ch == '{' || (close == ')' && ch == '(') {
            depth += 1;
        } else if ch == '}' || (close == ')' && ch == ')') {
            depth -= 1;
            if depth == 0 {
                return;
            }
        }
    }
}

fn skip_line(chars: &mut Chars<'_>) {
    for (_, ch) in chars.by_ref() {
        if ch == '\n' {
            return;
        }
    }
}

fn read_until(chars: &mut Chars<'_>, stop: impl Fn(char) -> bool) -> Option<String> {
    let mut s = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if stop(c) {
            break;
        }
        s.push(c);
        chars.next();
    }
    (!s.is_empty()).then_some(s)
}

fn skip_whitespace(chars: &mut Chars<'_>) {
    while chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_bib() {
        let input = r#"
@article{key1,
    author = "Author One",
    title = {Title One}
}

@book{key2,
    author = "Author Two"
}
"#;
        let bib = parse_bibtex(input);
        assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["key1", "key2"]);
        assert_eq!(bib.entries[0].entry_type, "article");
        assert_eq!(bib.entries[1].fields["author"], "Author Two");
    }

    #[test]
    fn test_key_range_points_at_key() {
        let input = "@misc{ key3 , field = {val} }";
        let bib = parse_bibtex(input);
        let entry = &bib.entries[0];
        let range = std::ops::Range::<usize>::from(entry.key_range);
        assert_eq!(&input[range], "key3");
        assert_eq!(u32::from(entry.range.end()) as usize, input.len());
    }

    #[test]
    fn test_non_entries_define_no_keys() {
        let input = r#"
@COMMENT{ @article{hidden, title={x}} }
@string{ jacm = "Journal of the ACM" }
@preamble{ "\newcommand{\noop}[1]{}" }
@article{real, journal = jacm}
"#;
        let bib = parse_bibtex(input);
        assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["real"]);
        assert_eq!(bib.entries[0].fields["journal"], "jacm");
    }

    #[test]
    fn test_percent_lines_are_skipped() {
        let input = r#"
% @article{commented, title={x}}
@Book{ lib,
  % title = {Wrong},
  title = "Library",
  year = 2020
}
"#;
        let bib = parse_bibtex(input);
        assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["lib"]);
        assert_eq!(bib.entries[0].fields["title"], "Library");
        assert_eq!(bib.entries[0].fields["year"], "2020");
    }

    #[test]
    fn test_parenthesized_entry() {
        let bib = parse_bibtex("@misc(paren, note = {x})");
        assert_eq!(bib.entries[0].key, "paren");
        assert_eq!(bib.entries[0].fields["note"], "x");
    }

    #[test]
    fn test_empty_bib() {
        assert!(parse_bibtex("").entries.is_empty());
        assert!(parse_bibtex("just text, no entries").entries.is_empty());
    }

    #[test]
    fn test_unclosed_entry_is_kept() {
        let bib = parse_bibtex("@Article{key,\n  title = {Title}\n");
        assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["key"]);
    }

    #[test]
    fn test_mixed_delimiters_and_trailing_comma() {
        let input = r#"@Misc{x, year = 1999, month = "Jan", note = {Braced},}"#;
        let entry = &parse_bibtex(input).entries[0];
        assert_eq!(entry.fields["year"], "1999");
        assert_eq!(entry.fields["month"], "Jan");
        assert_eq!(entry.fields["note"], "Braced");
    }

    #[test]
    fn test_nested_braces() {
        let bib = parse_bibtex(r#"@misc{k, title = {{Double {Nested}}}}"#);
        assert_eq!(bib.entries[0].fields["title"], "{Double {Nested}}");
    }

    #[test]
    fn test_escaped_quote() {
        let bib = parse_bibtex(r#"@misc{k, title = "O\"Hare"}"#);
        assert_eq!(bib.entries[0].fields["title"], r#"O\"Hare"#);
    }

    #[test]
    fn test_recovers_after_malformed_entry() {
        let input = r#"
            @article{
                author = "Anon"
            }
            @book{key4, title="Valid"}
        "#;
        assert!(parse_bibtex(input).keys().any(|key| key == "key4"));
    }
}
