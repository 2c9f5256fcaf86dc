//! Node types of the flat command stream.

use rowan::TextRange;
use serde::Serialize;

use crate::params::Parameter;
use crate::source::LineCol;

/// Stable index of a node in its [`Document`](crate::Document).
///
/// Ids are handed out in append order and never reused, so `NodeId(n - 1)` is
/// always the node scanned right before `NodeId(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a file in a [`SourceMap`](crate::source::SourceMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FileId(pub u32);

/// Where a node sits in its own file. Positions are never renumbered across
/// included files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: FileId,
    /// Byte range in the file.
    pub range: TextRange,
    pub start: LineCol,
    /// Position right after the last character.
    pub end: LineCol,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextNode {
    pub id: NodeId,
    pub content: String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandNode {
    pub id: NodeId,
    /// Name without the backslash; starred forms keep the `*`.
    pub name: String,
    /// Values of the `[...]` slots.
    pub parameters: Vec<Parameter>,
    /// Values of the `{...}` and boundary slots.
    pub arguments: Vec<Parameter>,
    pub location: Location,
    /// Set on commands materialized from `lstlisting` options.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl CommandNode {
    /// Text of the first argument, trimmed.
    pub fn first_argument(&self) -> Option<&str> {
        self.arguments.first().map(|arg| arg.text().trim())
    }

    /// Every comma-separated key in the arguments, in order.
    ///
    /// Works the same for value-mode (`{a,b}` as two parameters) and
    /// phrase-mode (`{a, b}` as one) grammars.
    pub fn argument_keys(&self) -> Vec<&str> {
        self.arguments
            .iter()
            .flat_map(|arg| arg.text().split(','))
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .collect()
    }

    pub fn slots(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().chain(self.arguments.iter())
    }
}

/// `\begin{name} ... \end{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentNode {
    /// The `\begin` command; its slots hold the environment's own options and
    /// arguments, not the name.
    pub begin: CommandNode,
    pub name: String,
    /// The matching `\end`, absent when the environment runs to end of file.
    pub end: Option<NodeId>,
    /// Direct children, in scan order.
    pub children: Vec<NodeId>,
}

impl EnvironmentNode {
    pub fn id(&self) -> NodeId {
        self.begin.id
    }

    pub fn base_name(&self) -> &str {
        self.name.trim_end_matches('*')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Node {
    Text(TextNode),
    Command(CommandNode),
    Environment(EnvironmentNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Text(text) => text.id,
            Node::Command(command) => command.id,
            Node::Environment(env) => env.begin.id,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            Node::Text(text) => &text.location,
            Node::Command(command) => &command.location,
            Node::Environment(env) => &env.begin.location,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_command(&self) -> Option<&CommandNode> {
        match self {
            Node::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn as_environment(&self) -> Option<&EnvironmentNode> {
        match self {
            Node::Environment(env) => Some(env),
            _ => None,
        }
    }

    /// The command carrying this node's slots: the command itself or an
    /// environment's `\begin`.
    pub fn slot_owner(&self) -> Option<&CommandNode> {
        match self {
            Node::Text(_) => None,
            Node::Command(command) => Some(command),
            Node::Environment(env) => Some(&env.begin),
        }
    }

    /// Whether this is a command named `name`.
    pub fn is_command(&self, name: &str) -> bool {
        self.as_command().is_some_and(|command| command.name == name)
    }
}
