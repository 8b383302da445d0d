use serde::{Deserialize, Serialize};

/// Count ceiling used when a participation item or per-item extra has no
/// explicit maximum.
pub const UNBOUNDED_COUNT: f64 = 9999.0;

/// Cap applied to a capped extra that omits `max`.
pub const DEFAULT_EXTRA_MAX: f64 = 1000.0;

/// Rubric configuration.
///
/// Declares every scorable category, its limits and weights, and the award
/// tiers filled in rank order. The engine treats it as read-only input.
///
/// Example YAML:
/// ```yaml
/// committee: "WHO – AIS"
/// speech_sections:
///   - name: "Speech 1"
///     fields:
///       - { key: s1_research, label: Research, max: 3 }
/// participation_items:
///   - { key: poi, label: "POI (x1)", max: 999, weight: 1 }
/// extra_items:
///   - { key: verbatim, label: "Verbatim items × 5", per_item: 5 }
///   - { key: documentation, label: Documentation, max: 25 }
/// award_tiers:
///   - { label: BD, title: Best Delegate, slots: 1 }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RubricConfig {
    /// Committee name, used for export file names
    #[serde(default)]
    pub committee: String,

    #[serde(default)]
    pub speech_sections: Vec<SpeechSection>,

    #[serde(default)]
    pub participation_items: Vec<ParticipationItem>,

    #[serde(default)]
    pub extra_items: Vec<ExtraItem>,

    /// Evaluated in declared order when auto-assigning awards
    #[serde(default)]
    pub award_tiers: Vec<AwardTier>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SpeechSection {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<ScoreField>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoreField {
    pub key: String,
    pub label: String,
    pub max: f64,
}

/// Counted participation (points of order, points of information, ...).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ParticipationItem {
    pub key: String,
    pub label: String,
    #[serde(default = "default_count_max")]
    pub max: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

/// Bonus category.
///
/// Either count-based (`per_item` multiplier) or value-based (`max` cap).
/// Use [`ExtraItem::mode`] rather than inspecting the fields directly.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExtraItem {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_item: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtraMode {
    /// Count read from `counts`, multiplied
    PerItem(f64),
    /// Value read from `scores`, clamped to the cap
    Capped(f64),
}

impl ExtraItem {
    pub fn mode(&self) -> ExtraMode {
        match self.per_item {
            Some(multiplier) if multiplier != 0.0 => ExtraMode::PerItem(multiplier),
            _ => ExtraMode::Capped(self.max.unwrap_or(DEFAULT_EXTRA_MAX)),
        }
    }

    pub fn is_per_item(&self) -> bool {
        matches!(self.mode(), ExtraMode::PerItem(_))
    }
}

/// Award tier: `slots` participants receive `label`, filled in rank order.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AwardTier {
    pub label: String,
    /// Long-form name shown in the recognition view
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(alias = "count")]
    pub slots: usize,
}

fn default_count_max() -> f64 {
    UNBOUNDED_COUNT
}

fn default_weight() -> f64 {
    1.0
}

fn field(key: &str, label: &str, max: f64) -> ScoreField {
    ScoreField {
        key: key.to_string(),
        label: label.to_string(),
        max,
    }
}

fn speech(number: usize) -> SpeechSection {
    let prefix = format!("s{}", number);
    SpeechSection {
        name: format!("Speech {}", number),
        fields: vec![
            field(&format!("{}_research", prefix), "Research", 3.0),
            field(&format!("{}_analysis", prefix), "Analysis", 4.0),
            field(&format!("{}_impact", prefix), "Impact", 3.0),
        ],
    }
}

fn participation(key: &str, label: &str) -> ParticipationItem {
    ParticipationItem {
        key: key.to_string(),
        label: label.to_string(),
        max: 999.0,
        weight: 1.0,
    }
}

fn per_item(key: &str, label: &str, multiplier: f64) -> ExtraItem {
    ExtraItem {
        key: key.to_string(),
        label: label.to_string(),
        per_item: Some(multiplier),
        max: None,
    }
}

fn capped(key: &str, label: &str, max: f64) -> ExtraItem {
    ExtraItem {
        key: key.to_string(),
        label: label.to_string(),
        per_item: None,
        max: Some(max),
    }
}

fn tier(label: &str, title: &str, slots: usize) -> AwardTier {
    AwardTier {
        label: label.to_string(),
        title: Some(title.to_string()),
        slots,
    }
}

impl Default for RubricConfig {
    fn default() -> Self {
        Self {
            committee: "WHO – AIS".to_string(),
            speech_sections: (1..=3).map(speech).collect(),
            participation_items: vec![
                participation("poo", "POO (x1)"),
                participation("poi", "POI (x1)"),
                participation("replies", "Replies (x1)"),
            ],
            extra_items: vec![
                per_item("verbatim", "Verbatim items (count) × 5", 5.0),
                capped("documentation", "Documentation", 25.0),
                capped("diplomacy", "Diplomatic Courtesy", 3.5),
                capped("lobbying", "Lobbying", 3.5),
                per_item("substantive", "Substantive chits (count) × 5", 5.0),
                per_item("replypoi", "Reply & POI bonus (count) × 1", 1.0),
                capped("chits", "Non-substantive chits", 5.0),
            ],
            award_tiers: vec![
                tier("BD", "Best Delegate", 1),
                tier("HC", "High Commendation", 1),
                tier("SM", "Special Mention", 3),
                tier("VM", "Verbal Mention", 2),
            ],
        }
    }
}

impl RubricConfig {
    /// Keys read from a participant's `counts` map, in declared order.
    pub fn count_keys(&self) -> impl Iterator<Item = &str> {
        self.participation_items
            .iter()
            .map(|p| p.key.as_str())
            .chain(
                self.extra_items
                    .iter()
                    .filter(|e| e.is_per_item())
                    .map(|e| e.key.as_str()),
            )
    }

    /// Keys read from a participant's `scores` map, in declared order.
    pub fn score_keys(&self) -> impl Iterator<Item = &str> {
        self.speech_sections
            .iter()
            .flat_map(|s| s.fields.iter().map(|f| f.key.as_str()))
            .chain(
                self.extra_items
                    .iter()
                    .filter(|e| !e.is_per_item())
                    .map(|e| e.key.as_str()),
            )
    }

    pub fn tier(&self, label: &str) -> Option<&AwardTier> {
        self.award_tiers.iter().find(|t| t.label == label)
    }

    /// Total number of award slots across all tiers.
    pub fn total_slots(&self) -> usize {
        self.award_tiers.iter().map(|t| t.slots).sum()
    }
}
