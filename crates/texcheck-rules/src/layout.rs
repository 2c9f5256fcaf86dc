//! Page margins, line spacing and fonts.
//!
//! Each concern has a preferred way of being set: `geometry` for margins,
//! `setspace` for spacing, a font package (or `fontspec`) for fonts. The pass
//! reports
//!
//! - packages on the forbidden list, or missing from a non-empty allowed list
//! - low-level commands that bypass the preferred package
//! - line spacing other than [`RuleConfig::line_spacing`](crate::RuleConfig)
//! - fonts outside the configured font lists
//! - a concern set more than once, as one summary per concern

use once_cell::sync::Lazy;
use regex::Regex;

use texcheck_syntax::{CommandNode, Document, Node};

use crate::diagnostic::Diagnostic;
use crate::{Rule, RuleContext, RuleError};

/// Packages whose only job is selecting a text font.
pub const FONT_PACKAGES: &[&str] = &[
    "times",
    "mathptmx",
    "newtxtext",
    "tgtermes",
    "helvet",
    "courier",
    "palatino",
    "mathpazo",
    "tgpagella",
    "lmodern",
    "libertine",
    "charter",
    "bookman",
    "kpfonts",
    "fourier",
    "utopia",
    "avant",
    "sourcesanspro",
    "roboto",
    "noto",
];

/// Lengths that belong to `geometry`.
const MARGIN_LENGTHS: &[&str] = &[
    "oddsidemargin",
    "evensidemargin",
    "topmargin",
    "textwidth",
    "textheight",
    "hoffset",
    "voffset",
    "headheight",
    "headsep",
    "footskip",
    "marginparwidth",
];

/// Lengths and macros that belong to `setspace`.
const SPACING_LENGTHS: &[&str] = &["baselinestretch", "baselineskip"];

static FACTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+(?:\.\d*)?|\.\d+)\s*$").expect("valid spacing regex"));

/// A plain length assignment such as `=2cm` or ` 16cm` after a length command.
static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*=?\s*[-+]?(\d|\.\d)").expect("valid assignment regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Concern {
    Margins,
    Spacing,
    Fonts,
}

impl Concern {
    const ALL: [Concern; 3] = [Concern::Margins, Concern::Spacing, Concern::Fonts];

    fn name(self) -> &'static str {
        match self {
            Concern::Margins => "margins",
            Concern::Spacing => "line spacing",
            Concern::Fonts => "the font",
        }
    }

    fn preferred(self) -> &'static str {
        match self {
            Concern::Margins => "the geometry package",
            Concern::Spacing => "the setspace package",
            Concern::Fonts => "a font package or fontspec",
        }
    }
}

/// One place where a concern is set.
#[derive(Debug)]
struct Definition<'d> {
    concern: Concern,
    command: &'d CommandNode,
}

/// What the walk over the document found.
#[derive(Debug, Default)]
struct Findings<'d> {
    definitions: Vec<Definition<'d>>,
    spacings: Vec<(f64, &'d CommandNode, String)>,
    fonts: Vec<(&'d str, &'d CommandNode)>,
}

impl<'d> Findings<'d> {
    fn define(&mut self, concern: Concern, command: &'d CommandNode) {
        self.definitions.push(Definition { concern, command });
    }

    fn spacing(&mut self, value: &str, command: &'d CommandNode, original: String) {
        if let Some(factor) = parse_factor(value) {
            self.spacings.push((factor, command, original));
        }
    }
}

pub struct LayoutRule;

impl Rule for LayoutRule {
    fn code(&self) -> &'static str {
        "layout"
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Result<Vec<Diagnostic>, RuleError> {
        let doc = ctx.document;
        let mut diagnostics = Vec::new();
        let mut found = Findings::default();
        let preamble = doc.preamble().len();

        for node in doc.nodes() {
            let Node::Command(command) = node else {
                continue;
            };
            match command.name.as_str() {
                // Packages can only be loaded before `\begin{document}`.
                "usepackage" | "RequirePackage" if command.id.index() < preamble => {
                    self.packages(ctx, command, &mut found, &mut diagnostics)
                }
                "geometry" => found.define(Concern::Margins, command),
                "onehalfspacing" => {
                    found.define(Concern::Spacing, command);
                    found.spacing("1.5", command, "\\onehalfspacing".to_string());
                }
                "doublespacing" => {
                    found.define(Concern::Spacing, command);
                    found.spacing("2", command, "\\doublespacing".to_string());
                }
                "singlespacing" => {
                    found.define(Concern::Spacing, command);
                    found.spacing("1", command, "\\singlespacing".to_string());
                }
                "setstretch" => {
                    found.define(Concern::Spacing, command);
                    if let Some(value) = command.first_argument() {
                        found.spacing(value, command, format!("\\setstretch{{{value}}}"));
                    }
                }
                "setmainfont" => {
                    found.define(Concern::Fonts, command);
                    if let Some(font) = command.first_argument() {
                        found.fonts.push((font, command));
                    }
                }
                "linespread" => {
                    found.define(Concern::Spacing, command);
                    diagnostics.push(self.bypass(doc, command, Concern::Spacing));
                    if let Some(value) = command.first_argument() {
                        found.spacing(value, command, format!("\\linespread{{{value}}}"));
                    }
                }
                "fontfamily" => {
                    found.define(Concern::Fonts, command);
                    diagnostics.push(self.bypass(doc, command, Concern::Fonts));
                    if let Some(font) = command.first_argument() {
                        found.fonts.push((font, command));
                    }
                }
                "renewcommand" => {
                    let target = command.first_argument().map(length_name);
                    if target == Some("baselinestretch") {
                        found.define(Concern::Spacing, command);
                        diagnostics.push(self.bypass(doc, command, Concern::Spacing));
                        if let Some(value) = command.arguments.get(1).map(|arg| arg.text().trim()) {
                            found.spacing(
                                value,
                                command,
                                format!("\\renewcommand{{\\baselinestretch}}{{{value}}}"),
                            );
                        }
                    }
                }
                "setlength" | "addtolength" => {
                    let target = command.first_argument().map(length_name).unwrap_or_default();
                    if let Some(concern) = length_concern(target) {
                        found.define(concern, command);
                        diagnostics.push(self.bypass(doc, command, concern));
                    }
                }
                name => {
                    if let Some(concern) = length_concern(name) {
                        if is_assignment(doc, command) {
                            found.define(concern, command);
                            diagnostics.push(self.bypass(doc, command, concern));
                        }
                    }
                }
            }
        }

        self.check_spacing(ctx, &found, &mut diagnostics);
        self.check_fonts(ctx, &found, &mut diagnostics);

        for concern in Concern::ALL {
            let places: Vec<_> = found
                .definitions
                .iter()
                .filter(|definition| definition.concern == concern)
                .collect();
            if places.len() < 2 {
                continue;
            }
            let lines: Vec<String> = places
                .iter()
                .map(|definition| definition.command.location.start.line.to_string())
                .collect();
            let second = places[1].command;
            diagnostics.push(
                Diagnostic::warning(
                    self.code(),
                    format!(
                        "{} set {} times (lines {}); set it once with {}",
                        concern.name(),
                        places.len(),
                        lines.join(", "),
                        concern.preferred()
                    ),
                )
                .at(doc, &second.location)
                .for_node(second.id),
            );
        }

        Ok(diagnostics)
    }
}

impl LayoutRule {
    fn packages<'d>(
        &self,
        ctx: &RuleContext<'d>,
        command: &'d CommandNode,
        found: &mut Findings<'d>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let doc = ctx.document;
        let config = ctx.config;
        for package in command.argument_keys() {
            if config.forbidden_packages.iter().any(|p| p == package) {
                diagnostics.push(
                    Diagnostic::error(self.code(), format!("package `{package}` is not allowed"))
                        .at(doc, &command.location)
                        .with_original(package)
                        .for_node(command.id),
                );
            } else if !config.allowed_packages.is_empty()
                && !config.allowed_packages.iter().any(|p| p == package)
            {
                diagnostics.push(
                    Diagnostic::warning(
                        self.code(),
                        format!("package `{package}` is not on the allowed list"),
                    )
                    .at(doc, &command.location)
                    .with_original(package)
                    .for_node(command.id),
                );
            }

            match package {
                "geometry" if !command.parameters.is_empty() => {
                    found.define(Concern::Margins, command)
                }
                "setspace" => {
                    let option = command.parameters.iter().find_map(|option| {
                        let value = match option.name.as_str() {
                            "onehalfspacing" => "1.5",
                            "doublespacing" => "2",
                            "singlespacing" => "1",
                            _ => return None,
                        };
                        Some((value, &option.name))
                    });
                    if let Some((value, name)) = option {
                        found.define(Concern::Spacing, command);
                        found.spacing(value, command, format!("\\usepackage[{name}]{{setspace}}"));
                    }
                }
                font if FONT_PACKAGES.contains(&font) => {
                    found.define(Concern::Fonts, command);
                    found.fonts.push((font, command));
                }
                _ => {}
            }
        }
    }

    fn bypass(&self, doc: &Document, command: &CommandNode, concern: Concern) -> Diagnostic {
        Diagnostic::warning(
            self.code(),
            format!(
                "`\\{}` sets {} directly; use {}",
                command.name,
                concern.name(),
                concern.preferred()
            ),
        )
        .at(doc, &command.location)
        .with_original(format!("\\{}", command.name))
        .for_node(command.id)
    }

    fn check_spacing(&self, ctx: &RuleContext<'_>, found: &Findings<'_>, diagnostics: &mut Vec<Diagnostic>) {
        let required = ctx.config.line_spacing;
        for (factor, command, original) in &found.spacings {
            if (factor - required).abs() < 1e-6 {
                continue;
            }
            diagnostics.push(
                Diagnostic::error(
                    self.code(),
                    format!("line spacing is {factor}, required {required}"),
                )
                .at(ctx.document, &command.location)
                .with_original(original.clone())
                .with_fix(format!("\\setstretch{{{required}}}"))
                .for_node(command.id),
            );
        }
    }

    fn check_fonts(&self, ctx: &RuleContext<'_>, found: &Findings<'_>, diagnostics: &mut Vec<Diagnostic>) {
        let config = ctx.config;
        for &(font, command) in &found.fonts {
            let message = if listed(&config.forbidden_fonts, font) {
                format!("font `{font}` is not allowed")
            } else if !config.allowed_fonts.is_empty() && !listed(&config.allowed_fonts, font) {
                format!("font `{font}` is not on the allowed list")
            } else {
                continue;
            };
            diagnostics.push(
                Diagnostic::error(self.code(), message)
                    .at(ctx.document, &command.location)
                    .with_original(font)
                    .for_node(command.id),
            );
        }
    }
}

fn listed(list: &[String], font: &str) -> bool {
    list.iter().any(|f| f.eq_ignore_ascii_case(font))
}

/// `\oddsidemargin` -> `oddsidemargin`.
fn length_name(arg: &str) -> &str {
    arg.trim().trim_start_matches('\\')
}

fn length_concern(name: &str) -> Option<Concern> {
    if MARGIN_LENGTHS.contains(&name) {
        Some(Concern::Margins)
    } else if SPACING_LENGTHS.contains(&name) {
        Some(Concern::Spacing)
    } else {
        None
    }
}

/// Whether a bare length command is being assigned, as in `\textwidth=16cm`,
/// rather than read.
fn is_assignment(doc: &Document, command: &CommandNode) -> bool {
    match doc.after(command.id) {
        Some(Node::Text(text)) => ASSIGNMENT.is_match(&text.content),
        _ => false,
    }
}

fn parse_factor(value: &str) -> Option<f64> {
    FACTOR
        .captures(value)
        .and_then(|caps| caps.get(1))
        .and_then(|number| number.as_str().parse().ok())
}
