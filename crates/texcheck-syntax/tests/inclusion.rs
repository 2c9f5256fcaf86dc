use std::fs;
use std::path::Path;

use tempfile::TempDir;
use texcheck_syntax::{AnalysisSession, Document, GrammarRegistry, LineCol, Node, ScanError, ScanIssue};

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, text) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, text).unwrap();
    }
    dir
}

fn scan(dir: &Path, start: &str) -> Document {
    let grammar = GrammarRegistry::builtin();
    AnalysisSession::new(&grammar, dir).scan(start).unwrap()
}

fn contents(doc: &Document) -> Vec<String> {
    doc.nodes()
        .iter()
        .map(|node| match node {
            Node::Text(text) => text.content.clone(),
            Node::Command(command) => format!("\\{}", command.name),
            Node::Environment(env) => format!("<{}>", env.name),
        })
        .collect()
}

#[test]
fn test_transitive_inclusion_in_reading_order() {
    let dir = project(&[
        ("main.tex", "before \\input{mid} after"),
        ("mid.tex", "\\input{leaf}"),
        ("leaf.tex", "\\emph{leaf}"),
    ]);
    let doc = scan(dir.path(), "main.tex");
    assert_eq!(contents(&doc), vec!["before ", "\\emph", " after"]);
    assert_eq!(doc.sources().len(), 3);
    assert!(doc.issues().is_empty());
}

#[test]
fn test_included_nodes_keep_their_own_positions() {
    let dir = project(&[
        ("main.tex", "line one\n\\include{chapters/one}\n\\label{end}"),
        ("chapters/one.tex", "\n\n  \\label{inner}"),
    ]);
    let doc = scan(dir.path(), "main.tex");

    let inner = doc.commands_named("label").next().unwrap();
    assert_eq!(inner.first_argument(), Some("inner"));
    assert_eq!(inner.location.start, LineCol { line: 3, column: 3 });
    assert!(doc.file_path(&inner.location).unwrap().ends_with("chapters/one.tex"));

    let outer = doc.commands_named("label").nth(1).unwrap();
    assert_eq!(outer.location.start, LineCol { line: 3, column: 1 });
    assert!(doc.file_path(&outer.location).unwrap().ends_with("main.tex"));
}

#[test]
fn test_inclusion_inside_environment_keeps_parent() {
    let dir = project(&[
        ("main.tex", "\\begin{document}\\input{body.tex}\\end{document}"),
        ("body.tex", "\\section{A}"),
    ]);
    let doc = scan(dir.path(), "main.tex");
    let body = doc.body().unwrap();
    assert!(doc.children(body).any(|n| n.is_command("section")));
}

#[test]
fn test_missing_include_is_reported() {
    let dir = project(&[("main.tex", "a \\input{nowhere} b")]);
    let doc = scan(dir.path(), "main.tex");
    assert_eq!(contents(&doc), vec!["a ", " b"]);
    match doc.issues() {
        [ScanIssue::MissingInclude { path, location }] => {
            assert!(path.ends_with("nowhere.tex"));
            assert_eq!(location.start, LineCol { line: 1, column: 3 });
        }
        other => panic!("unexpected issues: {other:?}"),
    }
}

#[test]
fn test_include_cycle_terminates() {
    let dir = project(&[
        ("a.tex", "A\\input{b}"),
        ("b.tex", "B\\input{a}"),
    ]);
    let doc = scan(dir.path(), "a.tex");
    assert_eq!(contents(&doc), vec!["A", "B"]);
    assert!(matches!(doc.issues(), [ScanIssue::IncludeCycle { .. }]));
}

#[test]
fn test_same_file_included_twice_is_not_a_cycle() {
    let dir = project(&[
        ("main.tex", "\\input{part}\\input{part}"),
        ("part.tex", "x"),
    ]);
    let doc = scan(dir.path(), "main.tex");
    assert_eq!(contents(&doc), vec!["x", "x"]);
    assert!(doc.issues().is_empty());
}

#[test]
fn test_unreadable_start_file_is_an_error() {
    let dir = project(&[]);
    let grammar = GrammarRegistry::builtin();
    let result = AnalysisSession::new(&grammar, dir.path()).scan("absent.tex");
    assert!(matches!(result, Err(ScanError::Read { .. })));
}
