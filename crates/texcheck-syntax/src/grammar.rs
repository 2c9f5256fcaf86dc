//! Per-command and per-environment argument grammar.
//!
//! ## Overview
//!
//! Every command the scanner meets is looked up in a [`GrammarRegistry`]. The
//! registry answers with a [`ParseInfo`]: how many optional `[...]` and required
//! `{...}` groups follow the name, in which order, and whether each group holds
//! comma-separated `key=value` parameters ([`ParseMode::Value`]) or one free-text
//! phrase ([`ParseMode::Phrase`]).
//!
//! Commands that are not configured still get a schema. The name is matched
//! against a handful of well-known families (references, labels, citations,
//! inclusions, text formatting, math) and the family's shape is used. Anything
//! else is assumed to take one required phrase argument.
//!
//! Environments never fall back: an unknown environment has no slots and its
//! schema reports `exists == false`.
//!
//! ## Examples
//!
//! ```
//! use texcheck_syntax::grammar::{GrammarRegistry, ParseMode, Slot};
//!
//! let grammar = GrammarRegistry::builtin();
//! let schema = grammar.schema_for("usepackage", false);
//! assert!(schema.exists);
//! assert_eq!(schema.slot_order, vec![Slot::Optional, Slot::Required]);
//! assert_eq!(schema.argument_rule.mode, ParseMode::Value);
//!
//! // Unknown commands are classified by name.
//! let guess = grammar.schema_for("parencitep", false);
//! assert!(!guess.exists);
//! assert_eq!(guess.argument_rule.mode, ParseMode::Value);
//! ```

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

use crate::builtin;

/// How the content of one bracketed group is split into parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Comma-separated bare tokens and `key=value` pairs.
    Value,
    /// The whole group is a single free-text value.
    #[default]
    Phrase,
}

/// One position after a command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// `[...]`, filled into the command's parameters.
    Optional,
    /// `{...}`, filled into the command's arguments.
    Required,
    /// A group opened and closed by the same character, as in `\verb|x|`.
    FreeformBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SlotRule {
    #[serde(default)]
    pub mode: ParseMode,
    #[serde(default)]
    pub count: usize,
}

impl SlotRule {
    pub const fn new(mode: ParseMode, count: usize) -> Self {
        Self { mode, count }
    }
}

/// The resolved grammar of a single command or environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseInfo {
    pub name: String,
    /// `false` when the schema was guessed or the name is unknown.
    pub exists: bool,
    /// Rule for the `[...]` slots.
    pub parameter_rule: SlotRule,
    /// Rule for the `{...}` and boundary slots.
    pub argument_rule: SlotRule,
    pub slot_order: Vec<Slot>,
}

impl ParseInfo {
    /// A schema with no slots, used for unknown environments and control symbols.
    pub fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            exists: false,
            parameter_rule: SlotRule::default(),
            argument_rule: SlotRule::default(),
            slot_order: Vec::new(),
        }
    }

    /// Builds a schema from a compact slot pattern.
    ///
    /// `[v]`/`[p]` is an optional slot in value/phrase mode, `{v}`/`{p}` a
    /// required one and `|` a boundary-delimited one. The last mode seen for a
    /// slot kind wins.
    pub fn from_pattern(name: &str, pattern: &str) -> Self {
        let mut info = Self::missing(name);
        info.exists = true;
        let mut chars = pattern.chars();
        while let Some(c) = chars.next() {
            let slot = match c {
                '[' => Slot::Optional,
                '{' => Slot::Required,
                '|' => {
                    info.argument_rule.count += 1;
                    info.slot_order.push(Slot::FreeformBoundary);
                    continue;
                }
                _ => continue,
            };
            let mode = match chars.next() {
                Some('v') => ParseMode::Value,
                _ => ParseMode::Phrase,
            };
            let rule = match slot {
                Slot::Optional => &mut info.parameter_rule,
                _ => &mut info.argument_rule,
            };
            rule.mode = mode;
            rule.count += 1;
            info.slot_order.push(slot);
        }
        info
    }

    pub fn mode_of(&self, slot: Slot) -> ParseMode {
        match slot {
            Slot::Optional => self.parameter_rule.mode,
            Slot::Required => self.argument_rule.mode,
            Slot::FreeformBoundary => ParseMode::Phrase,
        }
    }
}

/// A schema as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSpec {
    pub name: String,
    #[serde(default)]
    pub parameter_rule: SlotRule,
    #[serde(default)]
    pub argument_rule: SlotRule,
    /// Derived from the rule counts (optional slots first) when empty.
    #[serde(default)]
    pub slot_order: Vec<Slot>,
}

impl SchemaSpec {
    fn into_parse_info(self) -> Result<ParseInfo, GrammarError> {
        if self.name.trim().is_empty() {
            return Err(GrammarError::EmptyName);
        }

        let slot_order = if self.slot_order.is_empty() {
            std::iter::repeat_n(Slot::Optional, self.parameter_rule.count)
                .chain(std::iter::repeat_n(Slot::Required, self.argument_rule.count))
                .collect()
        } else {
            self.slot_order
        };

        let optional = slot_order.iter().filter(|s| **s == Slot::Optional).count();
        let required = slot_order.len() - optional;
        if optional != self.parameter_rule.count || required != self.argument_rule.count {
            return Err(GrammarError::SlotCountMismatch {
                name: self.name,
                parameters: self.parameter_rule.count,
                arguments: self.argument_rule.count,
                optional,
                required,
            });
        }

        Ok(ParseInfo {
            name: self.name,
            exists: true,
            parameter_rule: self.parameter_rule,
            argument_rule: self.argument_rule,
            slot_order,
        })
    }
}

/// The full grammar as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrammarSpec {
    pub commands: Vec<SchemaSpec>,
    pub environments: Vec<SchemaSpec>,
    /// Environments whose body is kept as one raw text node.
    pub raw_environments: Vec<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("schema with an empty name")]
    EmptyName,
    #[error("duplicate {kind} schema '{name}'")]
    Duplicate { kind: &'static str, name: String },
    #[error(
        "schema '{name}' declares {parameters} parameter(s) and {arguments} argument(s) \
         but its slot order has {optional} optional and {required} required slot(s)"
    )]
    SlotCountMismatch {
        name: String,
        parameters: usize,
        arguments: usize,
        optional: usize,
        required: usize,
    },
}

/// Families used to guess the grammar of unconfigured commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandFamily {
    Reference,
    Label,
    Citation,
    Include,
    Formatting,
    Math(usize),
    Generic,
}

impl CommandFamily {
    pub fn classify(name: &str) -> Self {
        let base = name.trim_end_matches('*');
        if base.ends_with("label") {
            Self::Label
        } else if base.ends_with("ref") {
            Self::Reference
        } else if base.contains("cite") {
            Self::Citation
        } else if base.starts_with("include")
            || base.starts_with("input")
            || matches!(base, "subfile" | "addbibresource" | "bibliography")
        {
            Self::Include
        } else if let Some(args) = math_arity(base) {
            Self::Math(args)
        } else if base.starts_with("text")
            || base.starts_with("math")
            || matches!(base, "emph" | "underline" | "uline" | "sout" | "mbox" | "fbox")
        {
            Self::Formatting
        } else {
            Self::Generic
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Self::Reference | Self::Label => "{v}",
            Self::Citation => "[p][p]{v}",
            Self::Include => "[v]{p}",
            Self::Formatting | Self::Generic | Self::Math(1) => "{p}",
            Self::Math(0) => "[p]{p}",
            Self::Math(_) => "{p}{p}",
        }
    }
}

/// Argument counts of common math commands; `0` marks `\sqrt`-style
/// optional-then-required shapes.
fn math_arity(command: &str) -> Option<usize> {
    match command {
        "frac" | "dfrac" | "tfrac" | "cfrac" | "binom" | "dbinom" | "tbinom" => Some(2),
        "sqrt" => Some(0),
        "overline" | "underbrace" | "overbrace" | "hat" | "widehat" | "tilde" | "widetilde"
        | "bar" | "vec" | "dot" | "ddot" => Some(1),
        _ => None,
    }
}

/// Immutable lookup table of command and environment schemas.
///
/// Built once, then shared by reference across any number of concurrent
/// analyses.
#[derive(Debug, Clone, Default)]
pub struct GrammarRegistry {
    commands: HashMap<String, ParseInfo>,
    environments: HashMap<String, ParseInfo>,
    raw_environments: HashSet<String>,
}

impl GrammarRegistry {
    /// Builds a registry from configured command and environment schemas.
    pub fn load(
        commands: Vec<SchemaSpec>,
        environments: Vec<SchemaSpec>,
    ) -> Result<Self, GrammarError> {
        let mut registry = Self::default();
        registry.insert_all(commands, false)?;
        registry.insert_all(environments, true)?;
        Ok(registry)
    }

    pub fn from_spec(spec: GrammarSpec) -> Result<Self, GrammarError> {
        let mut registry = Self::load(spec.commands, spec.environments)?;
        registry.raw_environments.extend(spec.raw_environments);
        Ok(registry)
    }

    /// The grammar shipped with texcheck.
    pub fn builtin() -> Self {
        let commands = builtin::COMMANDS
            .iter()
            .map(|(name, pattern)| (name.to_string(), ParseInfo::from_pattern(name, pattern)))
            .collect();
        let environments = builtin::ENVIRONMENTS
            .iter()
            .map(|(name, pattern)| (name.to_string(), ParseInfo::from_pattern(name, pattern)))
            .collect();
        let raw_environments = builtin::RAW_ENVIRONMENTS
            .iter()
            .map(|name| name.to_string())
            .collect();
        Self {
            commands,
            environments,
            raw_environments,
        }
    }

    /// Returns a copy of `self` with every schema of `spec` added on top.
    ///
    /// Schemas in `spec` replace schemas of the same name; duplicates inside
    /// `spec` itself are still rejected.
    pub fn merged(&self, spec: GrammarSpec) -> Result<Self, GrammarError> {
        let overlay = Self::from_spec(spec)?;
        let mut merged = self.clone();
        merged.commands.extend(overlay.commands);
        merged.environments.extend(overlay.environments);
        merged.raw_environments.extend(overlay.raw_environments);
        Ok(merged)
    }

    fn insert_all(
        &mut self,
        specs: Vec<SchemaSpec>,
        environment: bool,
    ) -> Result<(), GrammarError> {
        for spec in specs {
            let info = spec.into_parse_info()?;
            let (table, kind) = if environment {
                (&mut self.environments, "environment")
            } else {
                (&mut self.commands, "command")
            };
            if table.contains_key(&info.name) {
                return Err(GrammarError::Duplicate {
                    kind,
                    name: info.name,
                });
            }
            table.insert(info.name.clone(), info);
        }
        Ok(())
    }

    /// Looks up the schema for `name`.
    ///
    /// Starred names fall back to their unstarred schema. Unknown commands get a
    /// guessed schema; unknown environments get [`ParseInfo::missing`].
    pub fn schema_for(&self, name: &str, is_environment: bool) -> Cow<'_, ParseInfo> {
        let table = if is_environment {
            &self.environments
        } else {
            &self.commands
        };

        if let Some(info) = table
            .get(name)
            .or_else(|| name.strip_suffix('*').and_then(|base| table.get(base)))
        {
            return Cow::Borrowed(info);
        }

        if is_environment {
            return Cow::Owned(ParseInfo::missing(name));
        }

        // Control symbols such as `\%` or `\[` take nothing unless configured.
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Cow::Owned(ParseInfo::missing(name));
        }

        let family = CommandFamily::classify(name);
        log::debug!("no schema for \\{}, guessing {:?}", name, family);
        let mut info = ParseInfo::from_pattern(name, family.pattern());
        info.exists = false;
        Cow::Owned(info)
    }

    /// Whether the body of environment `name` is kept verbatim.
    pub fn is_raw_environment(&self, name: &str) -> bool {
        self.raw_environments.contains(name)
            || name
                .strip_suffix('*')
                .is_some_and(|base| self.raw_environments.contains(base))
    }
}
