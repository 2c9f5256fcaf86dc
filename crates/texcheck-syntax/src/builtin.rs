//! Default grammar tables.
//!
//! Patterns use the notation of [`ParseInfo::from_pattern`](crate::grammar::ParseInfo::from_pattern).

pub(crate) const COMMANDS: &[(&str, &str)] = &[
    // Preamble
    ("documentclass", "[v]{v}"),
    ("usepackage", "[v]{v}"),
    ("RequirePackage", "[v]{v}"),
    ("title", "[p]{p}"),
    ("author", "{p}"),
    ("date", "{p}"),
    ("newcommand", "{p}[p][p]{p}"),
    ("renewcommand", "{p}[p][p]{p}"),
    ("providecommand", "{p}[p][p]{p}"),
    ("newenvironment", "{p}[p][p]{p}{p}"),
    ("renewenvironment", "{p}[p][p]{p}{p}"),
    ("setlength", "{p}{p}"),
    ("addtolength", "{p}{p}"),
    ("setcounter", "{p}{p}"),
    ("addtocounter", "{p}{p}"),
    // Page layout, spacing and fonts
    ("geometry", "{v}"),
    ("linespread", "{p}"),
    ("setstretch", "{p}"),
    ("onehalfspacing", ""),
    ("doublespacing", ""),
    ("singlespacing", ""),
    ("fontsize", "{p}{p}"),
    ("fontfamily", "{p}"),
    ("selectfont", ""),
    ("setmainfont", "[v]{p}"),
    ("setsansfont", "[v]{p}"),
    ("setmonofont", "[v]{p}"),
    ("oddsidemargin", ""),
    ("evensidemargin", ""),
    ("topmargin", ""),
    ("textwidth", ""),
    ("textheight", ""),
    ("hoffset", ""),
    ("voffset", ""),
    ("headheight", ""),
    ("headsep", ""),
    ("footskip", ""),
    ("marginparwidth", ""),
    ("leftmargin", ""),
    ("baselinestretch", ""),
    ("baselineskip", ""),
    ("parindent", ""),
    ("parskip", ""),
    // Sectioning
    ("part", "[p]{p}"),
    ("chapter", "[p]{p}"),
    ("section", "[p]{p}"),
    ("subsection", "[p]{p}"),
    ("subsubsection", "[p]{p}"),
    ("paragraph", "[p]{p}"),
    ("subparagraph", "[p]{p}"),
    ("caption", "[p]{p}"),
    ("footnote", "[p]{p}"),
    // Cross references
    ("label", "{v}"),
    ("ref", "{v}"),
    ("eqref", "{v}"),
    ("pageref", "{v}"),
    ("autoref", "{v}"),
    ("nameref", "{v}"),
    ("cref", "{v}"),
    ("Cref", "{v}"),
    // Citations and bibliography
    ("cite", "[p][p]{v}"),
    ("citep", "[p][p]{v}"),
    ("citet", "[p][p]{v}"),
    ("parencite", "[p][p]{v}"),
    ("textcite", "[p][p]{v}"),
    ("autocite", "[p][p]{v}"),
    ("footcite", "[p][p]{v}"),
    ("nocite", "{v}"),
    ("bibitem", "[p]{v}"),
    ("bibliography", "{v}"),
    ("bibliographystyle", "{p}"),
    ("addbibresource", "[v]{p}"),
    ("printbibliography", "[v]"),
    // Inclusion
    ("input", "{p}"),
    ("include", "{p}"),
    ("includeonly", "{v}"),
    ("includegraphics", "[v]{p}"),
    // Lists
    ("item", "[p]"),
    // Text
    ("textbf", "{p}"),
    ("textit", "{p}"),
    ("texttt", "{p}"),
    ("textrm", "{p}"),
    ("textsf", "{p}"),
    ("textsc", "{p}"),
    ("emph", "{p}"),
    ("underline", "{p}"),
    ("mbox", "{p}"),
    ("fbox", "{p}"),
    ("url", "{p}"),
    ("href", "{p}{p}"),
    ("vspace", "{p}"),
    ("hspace", "{p}"),
    ("multicolumn", "{p}{p}{p}"),
    ("cline", "{p}"),
    ("verb", "|"),
    ("lstinline", "[v]|"),
    ("\\", "[p]"),
    // Commands without arguments
    ("maketitle", ""),
    ("tableofcontents", ""),
    ("listoffigures", ""),
    ("listoftables", ""),
    ("appendix", ""),
    ("frontmatter", ""),
    ("mainmatter", ""),
    ("backmatter", ""),
    ("centering", ""),
    ("raggedright", ""),
    ("raggedleft", ""),
    ("noindent", ""),
    ("indent", ""),
    ("newpage", ""),
    ("clearpage", ""),
    ("newline", ""),
    ("linebreak", "[p]"),
    ("pagebreak", "[p]"),
    ("par", ""),
    ("hline", ""),
    ("toprule", ""),
    ("midrule", ""),
    ("bottomrule", ""),
    ("hfill", ""),
    ("vfill", ""),
    ("bigskip", ""),
    ("medskip", ""),
    ("smallskip", ""),
    ("quad", ""),
    ("qquad", ""),
    ("ldots", ""),
    ("dots", ""),
    ("today", ""),
    ("LaTeX", ""),
    ("TeX", ""),
    ("protect", ""),
    ("relax", ""),
    ("normalfont", ""),
    ("bfseries", ""),
    ("itshape", ""),
    ("ttfamily", ""),
    ("rmfamily", ""),
    ("sffamily", ""),
    ("tiny", ""),
    ("scriptsize", ""),
    ("footnotesize", ""),
    ("small", ""),
    ("normalsize", ""),
    ("large", ""),
    ("Large", ""),
    ("LARGE", ""),
    ("huge", ""),
    ("Huge", ""),
    ("left", ""),
    ("right", ""),
    ("cdot", ""),
    ("times", ""),
];

pub(crate) const ENVIRONMENTS: &[(&str, &str)] = &[
    ("document", ""),
    ("abstract", ""),
    ("titlepage", ""),
    ("itemize", "[v]"),
    ("enumerate", "[v]"),
    ("description", "[v]"),
    ("list", "{p}{p}"),
    ("figure", "[v]"),
    ("table", "[v]"),
    ("wrapfigure", "[p]{p}{p}"),
    ("subfigure", "[p]{p}"),
    ("tabular", "[p]{p}"),
    ("tabularx", "{p}{p}"),
    ("longtable", "[p]{p}"),
    ("array", "[p]{p}"),
    ("minipage", "[p]{p}"),
    ("center", ""),
    ("flushleft", ""),
    ("flushright", ""),
    ("quote", ""),
    ("quotation", ""),
    ("equation", ""),
    ("align", ""),
    ("gather", ""),
    ("multline", ""),
    ("eqnarray", ""),
    ("math", ""),
    ("displaymath", ""),
    ("cases", ""),
    ("matrix", ""),
    ("pmatrix", ""),
    ("bmatrix", ""),
    ("theorem", "[p]"),
    ("lemma", "[p]"),
    ("definition", "[p]"),
    ("proof", "[p]"),
    ("thebibliography", "{p}"),
    ("verbatim", ""),
    ("Verbatim", "[v]"),
    ("lstlisting", "[v]"),
    ("minted", "[v]{p}"),
    ("comment", ""),
];

pub(crate) const RAW_ENVIRONMENTS: &[&str] = &["verbatim", "Verbatim", "lstlisting", "minted"];
