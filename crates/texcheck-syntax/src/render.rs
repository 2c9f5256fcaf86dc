//! Source text reconstruction for nodes.
//!
//! Rendering walks a node's schema and writes every present slot back with its
//! delimiters. Phrase slots come back verbatim; value slots are re-joined as
//! `key=value` lists, bracing values that would not scan as a bare word.
//! Scanning the rendered text with the same grammar yields an equivalent
//! command.

use std::ops::Range;

use crate::grammar::{GrammarRegistry, ParseInfo, ParseMode, Slot};
use crate::node::{CommandNode, Node};
use crate::params::{is_parameter_char, Parameter};

/// Renders `command` according to `schema`.
pub fn render_command(command: &CommandNode, schema: &ParseInfo) -> String {
    let mut out = format!("\\{}", command.name);
    render_slots(&mut out, command, schema, None);
    out
}

/// Renders any node, looking schemas up in `grammar`.
///
/// Environments render as their `\begin` line only.
pub fn render_node(node: &Node, grammar: &GrammarRegistry) -> String {
    render_node_around(node, grammar, None).0
}

/// Renders `node` and reports the byte range that the text of `target`, one
/// of the node's own parameters, occupies in the result.
pub fn render_node_around(
    node: &Node,
    grammar: &GrammarRegistry,
    target: Option<&Parameter>,
) -> (String, Option<Range<usize>>) {
    match node {
        Node::Text(text) => (text.content.clone(), None),
        Node::Command(command) => {
            let mut out = format!("\\{}", command.name);
            let schema = grammar.schema_for(&command.name, false);
            let range = render_slots(&mut out, command, &schema, target);
            (out, range)
        }
        Node::Environment(env) => {
            let mut out = format!("\\begin{{{}}}", env.name);
            let schema = grammar.schema_for(&env.name, true);
            let range = render_slots(&mut out, &env.begin, &schema, target);
            (out, range)
        }
    }
}

fn render_slots(
    out: &mut String,
    command: &CommandNode,
    schema: &ParseInfo,
    target: Option<&Parameter>,
) -> Option<Range<usize>> {
    let mut found = None;
    let is_target = |p: &Parameter| target.is_some_and(|t| std::ptr::eq(t, p));

    for (index, slot) in schema.slot_order.iter().enumerate() {
        let source = match slot {
            Slot::Optional => &command.parameters,
            Slot::Required | Slot::FreeformBoundary => &command.arguments,
        };
        let values: Vec<&Parameter> = source.iter().filter(|p| p.slot == index).collect();
        if values.is_empty() {
            continue;
        }

        let (open, close) = match slot {
            Slot::Optional => ('[', ']'),
            Slot::Required => ('{', '}'),
            Slot::FreeformBoundary => {
                let delimiter = boundary_for(values.iter().map(|p| p.text()));
                (delimiter, delimiter)
            }
        };
        out.push(open);
        let verbatim =
            *slot == Slot::FreeformBoundary || schema.mode_of(*slot) == ParseMode::Phrase;
        for (position, parameter) in values.into_iter().enumerate() {
            if !verbatim && position > 0 {
                out.push(',');
            }
            let start = if verbatim {
                out.len()
            } else {
                push_pair_prefix(out, parameter)
            };
            out.push_str(parameter.text());
            if is_target(parameter) {
                found = Some(start..out.len());
            }
            if !verbatim && needs_braces(parameter) {
                out.push('}');
            }
        }
        out.push(close);
    }
    found
}

/// Writes `name=` or `name={` ahead of a value and returns where the value starts.
fn push_pair_prefix(out: &mut String, parameter: &Parameter) -> usize {
    if parameter.value.is_some() {
        out.push_str(&parameter.name);
        out.push('=');
        if needs_braces(parameter) {
            out.push('{');
        }
    }
    out.len()
}

fn needs_braces(parameter: &Parameter) -> bool {
    parameter
        .value
        .as_deref()
        .is_some_and(|value| value.is_empty() || !value.chars().all(is_parameter_char))
}

/// A delimiter that occurs in none of `bodies`.
fn boundary_for<'a>(bodies: impl Iterator<Item = &'a str> + Clone) -> char {
    ['|', '!', '+', '@', '#', '"']
        .into_iter()
        .find(|c| bodies.clone().all(|body| !body.contains(*c)))
        .unwrap_or('|')
}
