//! Compiled pattern tables for amendment recognition.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::bill::AmendmentKind;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid amendment regex")
}

// Target references

/// `(15 U.S.C. 6502)`, `(15 U.S.C. 6505(d))`, `(11 U.S.C. 101 et seq.)`
pub(crate) static USC_CITATION: Lazy<Regex> = Lazy::new(|| {
    compile(r"\((\d+)\s+U\.S\.C\.\s+(\d+[a-z]?)(\([a-z]\)(?:\(\d+\))*)?(?:\s+et\s+seq\.)?\)")
});

/// `Section 1303` or `Section 1306(d)`
pub(crate) static SECTION_OF_TITLE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)Section\s+(\d+[a-zA-Z]?)(\([a-z]\)(?:\(\d+\))*)?"));

/// `of title 42` or `Title 42`
pub(crate) static TITLE_OF_USC: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(?:of\s+)?title\s+(\d+)"));

// Directive kinds

pub(crate) static STRIKE_INSERT: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r#"(?i)(?:by\s+)?striking\s+"#,
        r#"["\x{201c}]([^"\x{201d}]+)["\x{201d}]"#,
        r#"\s+and\s+inserting\s+"#,
        r#"["\x{201c}]([^"\x{201d}]+)["\x{201d}]"#,
    ))
});

pub(crate) static REPEAL: Lazy<Regex> = Lazy::new(|| compile(r"(?i)is\s+(?:hereby\s+)?repealed"));

pub(crate) static ADD_NEW_SECTION: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?i)(?:by\s+)?inserting\s+after\s+(?:section|subsection)\s+",
        r"(\([a-zA-Z0-9]+\)|\d+[a-zA-Z]?)\s+the\s+following\s+new\s+(?:section|subsection)",
    ))
});

pub(crate) static ADD_AT_END: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:by\s+)?adding\s+at\s+the\s+end\s+the\s+following"));

pub(crate) static REDESIGNATE: Lazy<Regex> = Lazy::new(|| {
    compile(concat!(
        r"(?i)(?:by\s+)?redesignating\s+",
        r"(?:paragraph|subsection|section|subparagraph|clause)\s+",
        r"\(([a-zA-Z0-9]+)\)\s+as\s+",
        r"(?:paragraph|subsection|section|subparagraph|clause)\s+",
        r"\(([a-zA-Z0-9]+)\)",
    ))
});

pub(crate) static TABLE_OF_CONTENTS: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)table\s+of\s+contents\s+.{0,120}is\s+amended"));

// Structure

/// `is amended--`, `is amended—` or `is amended by`
pub(crate) static IS_AMENDED: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)is\s+amended\s*[\x{2014}\-]{1,2}|is\s+amended\s+by\b"));

/// Indented `(1) ` at the start of a line.
pub(crate) static NUMBERED_CLAUSE: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^\s+\((\d+)\)\s"));

/// Indented `(A) ` at the start of a line.
pub(crate) static LETTERED_ITEM: Lazy<Regex> = Lazy::new(|| compile(r"(?m)^\s+\(([A-Z])\)\s"));

pub(crate) static IN_SUBSECTION: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:in(?:tes\s+in)?)\s+subsection\s+\(([a-z])\)"));

pub(crate) static PARAGRAPH_REF: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)(?:in\s+)?paragraph\s+\((\d+[A-Za-z]*)\)"));

/// Greedy quoted block, used after the introducing colon.
pub(crate) static QUOTED_BLOCK: Lazy<Regex> =
    Lazy::new(|| compile(r#"["\x{201c}](.+)["\x{201d}]"#));

/// Directive kinds in priority order. More specific patterns come first so a
/// generic one (repeal) never shadows them.
pub(crate) fn kind_rules() -> [(AmendmentKind, &'static Regex); 6] {
    [
        (AmendmentKind::StrikeInsert, &*STRIKE_INSERT),
        (AmendmentKind::Redesignate, &*REDESIGNATE),
        (AmendmentKind::TableOfContents, &*TABLE_OF_CONTENTS),
        (AmendmentKind::AddNewSection, &*ADD_NEW_SECTION),
        (AmendmentKind::AddAtEnd, &*ADD_AT_END),
        (AmendmentKind::Repeal, &*REPEAL),
    ]
}
