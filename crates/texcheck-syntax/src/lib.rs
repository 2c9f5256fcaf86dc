//! Grammar-driven scanner for LaTeX sources.
//!
//! ## Overview
//!
//! The crate turns a LaTeX project into a flat, position-annotated stream of
//! [`Node`]s held in a [`Document`] arena:
//!
//! - [`Node::Text`] for runs of prose between commands
//! - [`Node::Command`] for `\name` with its bracket and brace slots
//! - [`Node::Environment`] for `\begin{name} ... \end{name}`, owning its children
//!
//! Which groups follow a command, and how their content is split, is decided by
//! a [`GrammarRegistry`] rather than by hard-coded rules. `\input` and
//! `\include` are followed while scanning, so a document spanning several files
//! reads as one stream whose nodes still point into their own files.
//!
//! Scanning never fails on malformed input. Unclosed groups, unknown
//! environments and missing files are recorded as [`ScanIssue`]s and scanning
//! goes on.
//!
//! ## Examples
//!
//! ```
//! use texcheck_syntax::{AnalysisSession, GrammarRegistry, Node};
//!
//! let grammar = GrammarRegistry::builtin();
//! let doc = AnalysisSession::new(&grammar, ".").scan_text(
//!     "main.tex",
//!     r"\begin{itemize}\item First;\item Second.\end{itemize}",
//! );
//!
//! let list = doc.environments().next().unwrap();
//! let items = doc.children(list).filter(|n| n.is_command("item")).count();
//! assert_eq!(items, 2);
//! assert!(matches!(doc.node(list.end.unwrap()), Some(Node::Command(_))));
//! ```

pub mod bibtex;
mod builtin;
pub mod document;
mod environment;
pub mod grammar;
pub mod include;
pub mod node;
pub mod params;
pub mod render;
mod scanner;
pub mod session;
pub mod source;

pub use document::{Document, ScanError, ScanIssue};
pub use grammar::{GrammarError, GrammarRegistry, GrammarSpec, ParseInfo, ParseMode, Slot};
pub use node::{CommandNode, EnvironmentNode, FileId, Location, Node, NodeId, TextNode};
pub use params::Parameter;
pub use rowan::{TextRange, TextSize};
pub use session::AnalysisSession;
pub use source::{LineCol, SourceFile, SourceMap};
