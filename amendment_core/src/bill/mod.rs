//! Bill model - amendments, sections and the bill that carries them.
//!
//! Structural parsing of raw bill files happens elsewhere; this module only
//! models the result and fills in amendments via the [`Recognizer`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::recognizer::Recognizer;

/// The kind of change an amendment directive makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmendmentKind {
    /// "by striking X and inserting Y"
    StrikeInsert,
    /// "is repealed"
    Repeal,
    /// "inserting after section X the following new section"
    AddNewSection,
    /// "adding at the end the following"
    AddAtEnd,
    /// "redesignating paragraph (X) as paragraph (Y)"
    Redesignate,
    /// "The table of contents ... is amended"
    TableOfContents,
    /// Any kind this version does not know about.
    #[serde(other)]
    Other,
}

impl AmendmentKind {
    pub fn label(self) -> &'static str {
        match self {
            AmendmentKind::StrikeInsert => "strike_insert",
            AmendmentKind::Repeal => "repeal",
            AmendmentKind::AddNewSection => "add_new_section",
            AmendmentKind::AddAtEnd => "add_at_end",
            AmendmentKind::Redesignate => "redesignate",
            AmendmentKind::TableOfContents => "table_of_contents",
            AmendmentKind::Other => "unknown",
        }
    }
}

impl fmt::Display for AmendmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where in the U.S. Code an amendment points.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TargetRef {
    pub title: String,
    #[serde(default)]
    pub section: Option<String>,
    /// Parenthesised designator chain such as `(b)` or `(b)(1)`.
    #[serde(default)]
    pub subsection: Option<String>,
}

impl TargetRef {
    pub fn new(title: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            section: Some(section.into()),
            subsection: None,
        }
    }

    /// A reference to a whole title, as in "title 11 et seq.".
    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_subsection(mut self, subsection: impl Into<String>) -> Self {
        self.subsection = Some(subsection.into());
        self
    }

    /// Same title and section, different subsection.
    pub fn scoped(&self, subsection: Option<String>) -> Self {
        Self {
            subsection,
            ..self.clone()
        }
    }

    /// Subsection written in parenthesised form, whichever way it was stored.
    pub fn subsection_designator(&self) -> Option<String> {
        self.subsection.as_deref().map(|sub| {
            if sub.starts_with('(') {
                sub.to_string()
            } else {
                format!("({sub})")
            }
        })
    }

    /// Citation form, e.g. `15 U.S.C. 6502(b)`.
    pub fn citation(&self) -> String {
        let mut citation = format!("{} U.S.C.", self.title);
        if let Some(section) = &self.section {
            citation.push(' ');
            citation.push_str(section);
        }
        if let Some(designator) = self.subsection_designator() {
            citation.push_str(&designator);
        }
        citation
    }
}

/// A single amendment directive. Built once by the recognizer and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amendment {
    pub kind: AmendmentKind,
    pub target: TargetRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strike_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insert_text: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl Amendment {
    /// Create a new amendment with no strike/insert text.
    pub fn new(kind: AmendmentKind, target: TargetRef) -> Self {
        Self {
            kind,
            target,
            strike_text: None,
            insert_text: None,
            description: String::new(),
        }
    }

    pub fn with_strike_text(mut self, text: impl Into<String>) -> Self {
        self.strike_text = Some(text.into());
        self
    }

    pub fn with_insert_text(mut self, text: impl Into<String>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A numbered section of a bill.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BillSection {
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub amendments: Vec<Amendment>,
    #[serde(default)]
    pub raw_text: String,
}

impl BillSection {
    /// Create a section from its number, heading and raw text.
    pub fn new(number: impl Into<String>, title: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            amendments: Vec::new(),
            raw_text: raw_text.into(),
        }
    }

    pub fn with_amendment(mut self, amendment: Amendment) -> Self {
        self.amendments.push(amendment);
        self
    }

    /// Replace this section's amendments with those recognized in its raw text.
    pub fn recognize(&mut self, recognizer: &Recognizer) {
        self.amendments = recognizer.extract_amendments(&self.raw_text);
    }
}

/// A bill: header metadata plus its sections.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Bill {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,
    pub bill_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub congress: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(default)]
    pub sections: Vec<BillSection>,
    #[serde(default)]
    pub raw_text: String,
}

/// Aggregate counts for a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BillStatistics {
    pub sections: usize,
    pub amendments: usize,
    pub by_kind: BTreeMap<AmendmentKind, usize>,
    pub total_characters: usize,
}

impl Bill {
    /// Create a new bill with a number and title.
    pub fn new(bill_number: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            bill_number: bill_number.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_short_title(mut self, short_title: impl Into<String>) -> Self {
        self.short_title = Some(short_title.into());
        self
    }

    pub fn with_congress(mut self, congress: impl Into<String>) -> Self {
        self.congress = Some(congress.into());
        self
    }

    pub fn with_section(mut self, section: BillSection) -> Self {
        if !self.raw_text.is_empty() {
            self.raw_text.push('\n');
        }
        self.raw_text.push_str(&section.raw_text);
        self.sections.push(section);
        self
    }

    /// Run the recognizer over every section.
    pub fn with_recognized_amendments(mut self, recognizer: &Recognizer) -> Self {
        for section in &mut self.sections {
            section.recognize(recognizer);
        }
        self
    }

    /// All amendments in section order.
    pub fn amendments(&self) -> impl Iterator<Item = &Amendment> {
        self.sections.iter().flat_map(|section| section.amendments.iter())
    }

    pub fn statistics(&self) -> BillStatistics {
        let mut by_kind = BTreeMap::new();
        for amendment in self.amendments() {
            *by_kind.entry(amendment.kind).or_default() += 1;
        }

        BillStatistics {
            sections: self.sections.len(),
            amendments: by_kind.values().sum(),
            by_kind,
            total_characters: self.raw_text.chars().count(),
        }
    }

    /// Distinct target titles, in first-seen order.
    pub fn titles_affected(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();
        for amendment in self.amendments() {
            if !amendment.target.title.is_empty() && !titles.contains(&amendment.target.title) {
                titles.push(amendment.target.title.clone());
            }
        }
        titles
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let display_title = self
            .short_title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(&self.title);

        match (self.bill_number.is_empty(), display_title.is_empty()) {
            (false, false) => write!(f, "{} - {}", self.bill_number, display_title)?,
            (false, true) => f.write_str(&self.bill_number)?,
            (true, _) => f.write_str(display_title)?,
        }

        if let Some(congress) = self.congress.as_deref().filter(|c| !c.is_empty()) {
            write!(f, " ({congress} Congress)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citation_forms() {
        let target = TargetRef::new("15", "6502");
        assert_eq!(target.citation(), "15 U.S.C. 6502");
        assert_eq!(target.clone().with_subsection("(b)(1)").citation(), "15 U.S.C. 6502(b)(1)");
        assert_eq!(target.with_subsection("b").citation(), "15 U.S.C. 6502(b)");
        assert_eq!(TargetRef::title_only("11").citation(), "11 U.S.C.");
    }

    #[test]
    fn test_unknown_kind_deserializes_to_other() {
        let kind: AmendmentKind = serde_json::from_str("\"strike_everything\"").unwrap();
        assert_eq!(kind, AmendmentKind::Other);
        assert_eq!(kind.label(), "unknown");

        let known: AmendmentKind = serde_json::from_str("\"add_at_end\"").unwrap();
        assert_eq!(known, AmendmentKind::AddAtEnd);
    }

    #[test]
    fn test_display() {
        let bill = Bill::new("H.R. 1234", "A bill to do things")
            .with_short_title("Short Title")
            .with_congress("118th");
        assert_eq!(bill.to_string(), "H.R. 1234 - Short Title (118th Congress)");

        let bare = Bill::new("S. 456", "Title");
        assert_eq!(bare.to_string(), "S. 456 - Title");
    }

    #[test]
    fn test_statistics() {
        let bill = Bill::new("H.R. 1", "Test").with_section(
            BillSection::new("2", "Amendments", "text")
                .with_amendment(Amendment::new(AmendmentKind::Repeal, TargetRef::new("15", "1")))
                .with_amendment(Amendment::new(AmendmentKind::Repeal, TargetRef::new("15", "2")))
                .with_amendment(Amendment::new(AmendmentKind::AddAtEnd, TargetRef::new("42", "3"))),
        );

        let stats = bill.statistics();
        assert_eq!(stats.sections, 1);
        assert_eq!(stats.amendments, 3);
        assert_eq!(stats.by_kind[&AmendmentKind::Repeal], 2);
        assert_eq!(bill.titles_affected(), vec!["15", "42"]);
    }
}
