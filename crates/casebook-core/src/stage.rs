//! Workflow stages recorded in a case's progress log.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of a case's workflow.
///
/// The five enumerated stages cover the usual lifecycle; anything else is
/// kept verbatim as `Custom`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    Registered,
    UnderInvestigation,
    HearingScheduled,
    JudgmentPassed,
    Closed,
    Custom(String),
}

impl Stage {
    /// Enumerated stages in menu order (choices 1..=5).
    pub const ENUMERATED: [Stage; 5] = [
        Stage::Registered,
        Stage::UnderInvestigation,
        Stage::HearingScheduled,
        Stage::JudgmentPassed,
        Stage::Closed,
    ];

    /// Map a numbered menu choice to its enumerated stage.
    ///
    /// Returns `None` for any choice outside 1..=5; the caller falls back to
    /// free text.
    pub fn from_menu_choice(choice: i64) -> Option<Self> {
        let index = usize::try_from(choice).ok()?.checked_sub(1)?;
        Self::ENUMERATED.get(index).cloned()
    }

    /// Stage whose display label is exactly `label`; any other text is
    /// kept verbatim as `Custom`.
    ///
    /// `from_label(stage.label()) == stage` holds for every stage except a
    /// `Custom` that spells an enumerated label, which reads back as that
    /// enumerated stage and displays the same.
    pub fn from_label(label: &str) -> Self {
        Self::ENUMERATED
            .into_iter()
            .find(|stage| stage.label() == label)
            .unwrap_or_else(|| Stage::Custom(label.to_string()))
    }

    /// Parse a typed stage argument: a display label, or a variant name in
    /// any case (`closed`, `UnderInvestigation`). Other text becomes `Custom`.
    pub fn parse_name(text: &str) -> Self {
        Self::ENUMERATED
            .into_iter()
            .find(|stage| text.eq_ignore_ascii_case(stage.variant_name()))
            .unwrap_or_else(|| Self::from_label(text))
    }

    /// Human-readable label, as written to the records file.
    pub fn label(&self) -> &str {
        match self {
            Stage::Registered => "Case Registered",
            Stage::UnderInvestigation => "Under Investigation",
            Stage::HearingScheduled => "Hearing Scheduled",
            Stage::JudgmentPassed => "Judgment Passed",
            Stage::Closed => "Case Closed",
            Stage::Custom(label) => label,
        }
    }

    fn variant_name(&self) -> &'static str {
        match self {
            Stage::Registered => "Registered",
            Stage::UnderInvestigation => "UnderInvestigation",
            Stage::HearingScheduled => "HearingScheduled",
            Stage::JudgmentPassed => "JudgmentPassed",
            Stage::Closed => "Closed",
            Stage::Custom(_) => "Custom",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Stage {
    fn from(label: String) -> Self {
        match Self::from_label(&label) {
            Stage::Custom(_) => Stage::Custom(label),
            stage => stage,
        }
    }
}

impl From<Stage> for String {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Custom(label) => label,
            other => other.label().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choices_map_to_enumerated_stages() {
        assert_eq!(Stage::from_menu_choice(1), Some(Stage::Registered));
        assert_eq!(Stage::from_menu_choice(5), Some(Stage::Closed));
        assert_eq!(Stage::from_menu_choice(0), None);
        assert_eq!(Stage::from_menu_choice(6), None);
        assert_eq!(Stage::from_menu_choice(-3), None);
    }

    #[test]
    fn from_label_matches_display_labels_only() {
        assert_eq!(
            Stage::from_label("Under Investigation"),
            Stage::UnderInvestigation
        );
        assert_eq!(
            Stage::from_label("closed"),
            Stage::Custom("closed".to_string())
        );
        assert_eq!(
            Stage::from_label("Registered"),
            Stage::Custom("Registered".to_string())
        );
        assert_eq!(Stage::from_label(""), Stage::Custom(String::new()));
    }

    #[test]
    fn parse_name_accepts_variant_names_in_any_case() {
        assert_eq!(
            Stage::parse_name("underinvestigation"),
            Stage::UnderInvestigation
        );
        assert_eq!(Stage::parse_name("closed"), Stage::Closed);
        assert_eq!(Stage::parse_name("Case Closed"), Stage::Closed);
        assert_eq!(
            Stage::parse_name("Appeal Filed"),
            Stage::Custom("Appeal Filed".to_string())
        );
    }

    #[test]
    fn custom_label_is_kept_verbatim() {
        let stage = Stage::Custom("  Evidence  sealed ".to_string());
        assert_eq!(stage.to_string(), "  Evidence  sealed ");
        assert_eq!(Stage::from_label(stage.label()), stage);
    }

    #[test]
    fn custom_text_that_names_a_variant_survives_serde() {
        let stage = Stage::Custom("closed".to_string());
        let json = serde_json::to_string(&stage).expect("serialize");
        let back: Stage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, stage);
    }

    #[test]
    fn serializes_as_label_string() {
        let json = serde_json::to_string(&Stage::HearingScheduled).expect("serialize");
        assert_eq!(json, "\"Hearing Scheduled\"");
        let back: Stage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Stage::HearingScheduled);
    }
}
