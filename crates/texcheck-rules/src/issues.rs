//! Problems the scanner recovered from, as diagnostics.
//!
//! How loud each kind is comes from
//! [`SoftFailurePolicy`](crate::SoftFailurePolicy); a kind set to `null`
//! is dropped.

use texcheck_syntax::ScanIssue;

use crate::diagnostic::{Diagnostic, Severity};
use crate::{Rule, RuleContext, RuleError};

pub struct ScanIssueRule;

impl Rule for ScanIssueRule {
    fn code(&self) -> &'static str {
        "scan"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let policy = &ctx.config.soft_failures;
        let mut diagnostics = Vec::new();

        for issue in ctx.document.issues() {
            let (severity, message): (Option<Severity>, String) = match issue {
                ScanIssue::MissingInclude { path, .. } => (
                    policy.missing_include,
                    format!("included file {} cannot be read", path.display()),
                ),
                ScanIssue::IncludeCycle { path, .. } => (
                    policy.include_cycle,
                    format!("{} includes itself; inclusion skipped", path.display()),
                ),
                ScanIssue::UnknownEnvironment { name, .. } => (
                    policy.unknown_environment,
                    format!("unknown environment `{name}`; its options are not checked"),
                ),
                ScanIssue::UnterminatedEnvironment { name, .. } => (
                    policy.unterminated_environment,
                    format!("`\\begin{{{name}}}` has no matching `\\end{{{name}}}`"),
                ),
                ScanIssue::UnterminatedGroup { command, .. } => (
                    policy.unterminated_group,
                    format!("group after `\\{command}` is never closed"),
                ),
            };
            let Some(severity) = severity else {
                continue;
            };
            diagnostics.push(
                Diagnostic::new(severity, self.code(), message).at(ctx.document, issue.location()),
            );
        }
        Ok(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleConfig;
    use texcheck_syntax::{AnalysisSession, GrammarRegistry};

    fn check_with(text: &str, config: &RuleConfig) -> Vec<Diagnostic> {
        let grammar = GrammarRegistry::builtin();
        let doc = AnalysisSession::new(&grammar, ".").scan_text("main.tex", text);
        ScanIssueRule.check(&RuleContext::new(&doc, &grammar, config)).unwrap()
    }

    #[test]
    fn test_default_severities() {
        let found = check_with(
            "\\begin{mystery}x\\end{mystery}\n\\begin{center}open",
            &RuleConfig::default(),
        );
        let summary: Vec<_> = found.iter().map(|d| (d.line, d.severity)).collect();
        assert_eq!(summary, vec![(1, Severity::Info), (2, Severity::Warning)]);
        assert!(found[1].message.contains("\\end{center}"));
    }

    #[test]
    fn test_silenced_kind_is_dropped() {
        let mut config = RuleConfig::default();
        config.soft_failures.unknown_environment = None;
        config.soft_failures.unterminated_group = Some(Severity::Error);
        let found = check_with("\\begin{mystery}x\\end{mystery} \\textbf{never", &config);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity, Severity::Error);
        assert!(found[0].message.contains("textbf"));
    }
}
