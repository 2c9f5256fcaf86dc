use texcheck_syntax::{AnalysisSession, Document, GrammarRegistry, Node, ScanIssue};

fn scan(text: &str) -> Document {
    let grammar = GrammarRegistry::builtin();
    AnalysisSession::new(&grammar, ".").scan_text("main.tex", text)
}

#[test]
fn test_incomplete_environment() {
    let doc = scan("\\begin{itemize");
    assert!(doc.nodes()[0].is_command("begin"));
    assert!(matches!(doc.issues(), [ScanIssue::UnterminatedGroup { .. }]));
}

#[test]
fn test_incomplete_group() {
    let input = "\\textbf{Hello";
    let doc = scan(input);
    let command = doc.commands().next().unwrap();
    // The command still covers the whole input.
    assert_eq!(u32::from(command.location.range.len()) as usize, input.len());
}

#[test]
fn test_stray_braces() {
    let doc = scan("\\} \\{ } {");
    let names: Vec<_> = doc.commands().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["}", "{"]);
    assert!(doc.issues().is_empty());
}

#[test]
fn test_text_is_covered_without_gaps() {
    let input = "Intro \\emph{x} % note\nmore \\begin{center}y\\end{center} tail";
    let doc = scan(input);
    let mut covered = 0;
    for node in doc.nodes() {
        let range = node.location().range;
        assert!(u32::from(range.start()) as usize >= covered);
        covered = u32::from(range.end()) as usize;
        if let Node::Text(text) = node {
            assert_eq!(&input[std::ops::Range::<usize>::from(range)], text.content);
        }
    }
}

#[test]
fn test_garbage_does_not_panic() {
    for input in [
        "\\",
        "{{{{",
        "}}}}",
        "\\begin{}",
        "\\end{x}",
        "\\verb",
        "\\verb|never",
        "\\usepackage[a=,=b,,]{}",
        "%",
        "\\begin{verbatim}",
        "\\begin{lstlisting}[caption=",
        "ü\\ü\\\u{1F600}",
    ] {
        let doc = scan(input);
        for (index, node) in doc.nodes().iter().enumerate() {
            assert_eq!(node.id().0, index, "{input:?}");
        }
    }
}
