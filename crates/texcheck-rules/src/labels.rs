//! Labels against references.
//!
//! A reference to a key nobody labels is an error, a label defined twice is an
//! error, and a label nobody references is a warning. Figures and tables (see
//! [`RuleConfig::label_environments`](crate::RuleConfig::label_environments))
//! must carry a `\label` somewhere inside.

use std::collections::{HashMap, HashSet};

use texcheck_syntax::CommandNode;

use crate::diagnostic::Diagnostic;
use crate::{Rule, RuleContext, RuleError};

pub struct LabelRule;

impl Rule for LabelRule {
    fn code(&self) -> &'static str {
        "label"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let doc = ctx.document;
        let mut diagnostics = Vec::new();

        let mut labels: HashMap<&str, &CommandNode> = HashMap::new();
        let mut label_order = Vec::new();
        for command in doc.commands_named("label") {
            let Some(key) = command.first_argument().filter(|key| !key.is_empty()) else {
                continue;
            };
            if let Some(first) = labels.get(key) {
                diagnostics.push(
                    Diagnostic::error(
                        self.code(),
                        format!(
                            "label `{key}` is already defined at line {}",
                            first.location.start.line
                        ),
                    )
                    .at(doc, &command.location)
                    .with_original(key)
                    .for_node(command.id),
                );
                continue;
            }
            labels.insert(key, command);
            label_order.push(key);
        }

        let mut referenced = HashSet::new();
        for command in doc.commands().filter(|c| ctx.config.is_reference(&c.name)) {
            for key in command.argument_keys() {
                if !referenced.insert(key) || labels.contains_key(key) {
                    continue;
                }
                diagnostics.push(
                    Diagnostic::error(self.code(), format!("reference to undefined label `{key}`"))
                        .at(doc, &command.location)
                        .with_original(key)
                        .for_node(command.id),
                );
            }
        }

        for key in label_order.into_iter().filter(|key| !referenced.contains(key)) {
            let command = labels[key];
            diagnostics.push(
                Diagnostic::warning(self.code(), format!("label `{key}` is never referenced"))
                    .at(doc, &command.location)
                    .with_original(key)
                    .for_node(command.id),
            );
        }

        for env in doc.environments() {
            if !ctx
                .config
                .label_environments
                .iter()
                .any(|name| name == env.base_name())
            {
                continue;
            }
            let labelled = doc
                .descendants(env)
                .into_iter()
                .any(|node| node.is_command("label"));
            if !labelled {
                diagnostics.push(
                    Diagnostic::warning(self.code(), format!("`{}` has no \\label", env.name))
                        .at(doc, &env.begin.location)
                        .with_original(format!("\\begin{{{}}}", env.name))
                        .for_node(env.id()),
                );
            }
        }

        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleConfig, Severity};
    use texcheck_syntax::{AnalysisSession, GrammarRegistry};

    fn check(text: &str) -> Vec<Diagnostic> {
        let grammar = GrammarRegistry::builtin();
        let config = RuleConfig::default();
        let doc = AnalysisSession::new(&grammar, ".").scan_text("main.tex", text);
        LabelRule.check(&RuleContext::new(&doc, &grammar, &config)).unwrap()
    }

    fn summary(found: &[Diagnostic]) -> Vec<(Severity, String)> {
        found
            .iter()
            .map(|d| (d.severity, d.original_text.clone()))
            .collect()
    }

    #[test]
    fn test_unreferenced_and_dangling_are_reported_once_each() {
        let found = check(r"\label{a}\label{b} \ref{b} \ref{c} \eqref{c}");
        assert_eq!(
            summary(&found),
            vec![
                (Severity::Error, "c".to_string()),
                (Severity::Warning, "a".to_string()),
            ]
        );
    }

    #[test]
    fn test_duplicate_label() {
        let found = check("\\label{x}\n\\label{x}\n\\ref{x}");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
        assert_eq!(found[0].line, 2);
        assert!(found[0].message.contains("line 1"));
    }

    #[test]
    fn test_figure_without_label() {
        let found = check(
            "\\begin{figure}\\caption{A}\\end{figure}\n\\begin{table}\\begin{center}\\label{t}\\end{center}\\end{table}\\ref{t}",
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 1);
        assert!(found[0].message.contains("figure"));
    }

    #[test]
    fn test_listing_label_counts() {
        let found = check("\\begin{lstlisting}[label=lst:a, caption=Code]\nx\n\\end{lstlisting}\nSee \\ref{lst:a}.");
        assert!(found.is_empty());
    }

    #[test]
    fn test_multiple_keys_in_cref() {
        let found = check(r"\label{a}\label{b}\cref{a,b}");
        assert!(found.is_empty());
    }
}
