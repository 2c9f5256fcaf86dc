#![no_main]
use libfuzzer_sys::fuzz_target;
use texcheck_rules::{RuleConfig, RuleContext, RuleEngine};
use texcheck_syntax::{AnalysisSession, GrammarRegistry};

fuzz_target!(|data: &[u8]| {
    // Lossy conversion keeps inputs that are "almost" text.
    let text = String::from_utf8_lossy(data);
    let grammar = GrammarRegistry::builtin();
    let config = RuleConfig::default();
    // Inclusions resolve against a directory that does not exist, so every
    // `\input` takes the missing-file path.
    let document = AnalysisSession::new(&grammar, "/nonexistent-texcheck-fuzz")
        .scan_text("fuzz.tex", &*text);
    let _ = RuleEngine::new().run(&RuleContext::new(&document, &grammar, &config));
});
