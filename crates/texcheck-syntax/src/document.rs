//! The node arena produced by one analysis.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::node::{CommandNode, EnvironmentNode, Location, Node, NodeId, TextNode};
use crate::source::SourceMap;

/// A recoverable problem met while scanning. Scanning always continues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ScanIssue {
    /// `\input`/`\include` named a file that could not be read.
    MissingInclude { path: PathBuf, location: Location },
    /// An inclusion would re-enter a file that is still being scanned.
    IncludeCycle { path: PathBuf, location: Location },
    /// `\begin{name}` with no configured grammar for `name`.
    UnknownEnvironment { name: String, location: Location },
    /// `\begin{name}` without a matching `\end{name}`.
    UnterminatedEnvironment { name: String, location: Location },
    /// A `[`/`{` group left open at end of file.
    UnterminatedGroup { command: String, location: Location },
}

impl ScanIssue {
    pub fn location(&self) -> &Location {
        match self {
            ScanIssue::MissingInclude { location, .. }
            | ScanIssue::IncludeCycle { location, .. }
            | ScanIssue::UnknownEnvironment { location, .. }
            | ScanIssue::UnterminatedEnvironment { location, .. }
            | ScanIssue::UnterminatedGroup { location, .. } => location,
        }
    }
}

/// Failure to start an analysis at all.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Every node of one analysis, indexed by [`NodeId`].
///
/// The arena is the single owner of all nodes. Environments refer to their
/// children by id, and the flat scan order is the id order, so "node before"
/// and "node after" are plain index arithmetic.
#[derive(Debug, Default)]
pub struct Document {
    nodes: Vec<Node>,
    parents: Vec<Option<NodeId>>,
    roots: Vec<NodeId>,
    sources: SourceMap,
    issues: Vec<ScanIssue>,
    base_dir: PathBuf,
}

impl Document {
    pub(crate) fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            ..Self::default()
        }
    }

    pub(crate) fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len())
    }

    /// Appends `node` and attaches it under `parent` (or the top level).
    pub(crate) fn push(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = node.id();
        debug_assert_eq!(id, self.next_id());
        self.nodes.push(node);
        self.parents.push(parent);
        match parent {
            Some(parent) => {
                if let Some(Node::Environment(env)) = self.nodes.get_mut(parent.0) {
                    env.children.push(id);
                }
            }
            None => self.roots.push(id),
        }
        id
    }

    /// Appends `node` with `parent` as owner but outside its children list.
    pub(crate) fn push_detached(&mut self, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = node.id();
        self.nodes.push(node);
        self.parents.push(parent);
        id
    }

    pub(crate) fn environment_mut(&mut self, id: NodeId) -> Option<&mut EnvironmentNode> {
        match self.nodes.get_mut(id.0) {
            Some(Node::Environment(env)) => Some(env),
            _ => None,
        }
    }

    pub(crate) fn sources_mut(&mut self) -> &mut SourceMap {
        &mut self.sources
    }

    pub(crate) fn report(&mut self, issue: ScanIssue) {
        self.issues.push(issue);
    }

    /// All nodes in scan order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the nodes that are not inside any environment.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn issues(&self) -> &[ScanIssue] {
        &self.issues
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn file_path(&self, location: &Location) -> Option<&Path> {
        self.sources.path(location.file)
    }

    /// The node scanned right before `id`.
    pub fn before(&self, id: NodeId) -> Option<&Node> {
        id.0.checked_sub(1).and_then(|index| self.nodes.get(index))
    }

    /// The node scanned right after `id`.
    pub fn after(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 + 1)
    }

    /// The environment `id` is a child of.
    pub fn parent(&self, id: NodeId) -> Option<&EnvironmentNode> {
        self.parents
            .get(id.0)
            .copied()
            .flatten()
            .and_then(|parent| self.node(parent))
            .and_then(Node::as_environment)
    }

    /// Enclosing environments of `id`, innermost first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &EnvironmentNode> {
        std::iter::successors(self.parent(id), |env| self.parent(env.id()))
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextNode> {
        self.nodes.iter().filter_map(Node::as_text)
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandNode> {
        self.nodes.iter().filter_map(Node::as_command)
    }

    pub fn commands_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a CommandNode> {
        self.commands().filter(move |command| command.name == name)
    }

    pub fn environments(&self) -> impl Iterator<Item = &EnvironmentNode> {
        self.nodes.iter().filter_map(Node::as_environment)
    }

    /// Children of `env`, resolved against the arena.
    pub fn children<'a>(&'a self, env: &'a EnvironmentNode) -> impl Iterator<Item = &'a Node> {
        env.children.iter().filter_map(|id| self.node(*id))
    }

    /// Every node nested anywhere below `env`, in scan order.
    pub fn descendants(&self, env: &EnvironmentNode) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = env.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            out.push(node);
            if let Node::Environment(inner) = node {
                stack.extend(inner.children.iter().rev().copied());
            }
        }
        out
    }

    /// The `document` environment, if any.
    pub fn body(&self) -> Option<&EnvironmentNode> {
        self.environments().find(|env| env.name == "document")
    }

    /// Nodes before `\begin{document}`; the whole document when there is none.
    pub fn preamble(&self) -> &[Node] {
        match self.body() {
            Some(body) => &self.nodes[..body.id().0],
            None => &self.nodes,
        }
    }
}
