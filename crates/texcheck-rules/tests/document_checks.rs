use std::fs;
use std::path::Path;

use texcheck_rules::{Diagnostic, RuleConfig, RuleContext, RuleEngine, Severity};
use texcheck_syntax::{AnalysisSession, GrammarRegistry};

fn run(dir: &Path, start: &str, config: &RuleConfig) -> Vec<Diagnostic> {
    let grammar = GrammarRegistry::builtin();
    let doc = AnalysisSession::new(&grammar, dir).scan(start).unwrap();
    RuleEngine::new().run(&RuleContext::new(&doc, &grammar, config))
}

fn codes(found: &[Diagnostic]) -> Vec<&'static str> {
    found.iter().map(|d| d.code).collect()
}

#[test]
fn test_citations_are_checked_in_both_directions() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("refs.bib"), "@book{a, title={A}}\n@misc{b, note={B}}\n").unwrap();
    fs::write(dir.path().join("main.tex"), "As shown \\cite{a}.\n\\bibliography{refs}\n").unwrap();

    let found = run(dir.path(), "main.tex", &RuleConfig::default());
    assert_eq!(codes(&found), vec!["citation"]);
    assert_eq!(found[0].original_text, "b");
    assert_eq!(found[0].severity, Severity::Error);
}

#[test]
fn test_diagnostics_point_into_included_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("chapters")).unwrap();
    fs::write(
        dir.path().join("main.tex"),
        "\\begin{document}\n\\input{chapters/one}\n\\end{document}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("chapters/one.tex"),
        "First line.\nA \"quoted\" word - and more.\n",
    )
    .unwrap();

    let found = run(dir.path(), "main.tex", &RuleConfig::default());
    let spots: Vec<_> = found
        .iter()
        .map(|d| (d.code, d.line, d.column, d.file.as_ref().unwrap().ends_with("one.tex")))
        .collect();
    assert_eq!(
        spots,
        vec![
            ("quotes", 2, 3, true),
            ("quotes", 2, 10, true),
            ("dash", 2, 17, true),
        ]
    );
}

#[test]
fn test_missing_include_is_a_warning_and_checking_continues() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.tex"), "\\input{absent}\nSee \\ref{x}.\n").unwrap();

    let found = run(dir.path(), "main.tex", &RuleConfig::default());
    let summary: Vec<_> = found.iter().map(|d| (d.code, d.severity)).collect();
    assert_eq!(
        summary,
        vec![("scan", Severity::Warning), ("label", Severity::Error)]
    );
}

#[test]
fn test_list_and_labels_in_one_document() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("main.tex"),
        "Intro: \\begin{itemize}\\item one;\\item Two.\\end{itemize}\n\\label{a}\\label{b} \\ref{b} \\ref{c}\n",
    )
    .unwrap();

    let found = run(dir.path(), "main.tex", &RuleConfig::default());
    let summary: Vec<_> = found
        .iter()
        .map(|d| (d.code, d.original_text.as_str()))
        .collect();
    assert_eq!(summary, vec![("list", "T"), ("label", "a"), ("label", "c")]);
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.tex"), "word - word\n").unwrap();

    let found = run(dir.path(), "main.tex", &RuleConfig::default());
    let json = serde_json::to_value(&found).unwrap();
    assert_eq!(json[0]["code"], "dash");
    assert_eq!(json[0]["severity"], "warning");
    assert_eq!(json[0]["line"], 1);
    assert_eq!(json[0]["suggested_fix"], "word --- word");
}
