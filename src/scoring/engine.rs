use super::config::{ExtraMode, RubricConfig, UNBOUNDED_COUNT};
use super::inputs::RawInputs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Speech,
    Participation,
    Extras,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub category: Category,
    pub key: String,
    pub label: String, // e.g. "Speech 1 – Research", "POI (x1)"
    pub raw: f64,      // Coerced value before clamping
    pub points: f64,   // Clamped and weighted, unrounded
}

/// Category subtotals and final total, each rounded to two decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub speech_total: f64,
    pub participation_total: f64,
    pub extras_total: f64,
    pub final_total: f64,
}

#[derive(Debug, Clone)]
pub struct ScoreResult {
    pub totals: Totals,
    pub breakdown: Vec<Contribution>,
}

/// Score one participant's raw inputs against the rubric.
///
/// Never fails: blank or garbled inputs count as zero, and every value is
/// clamped into its category's range before weighting.
pub fn compute_totals(config: &RubricConfig, scores: &RawInputs, counts: &RawInputs) -> Totals {
    calculate_score(config, scores, counts).totals
}

/// Same as [`compute_totals`] but keeps the per-item breakdown.
pub fn calculate_score(config: &RubricConfig, scores: &RawInputs, counts: &RawInputs) -> ScoreResult {
    let mut breakdown = Vec::new();

    let mut speech = 0.0;
    for section in &config.speech_sections {
        for field in &section.fields {
            let raw = scores.value(&field.key);
            let points = clamp(raw, 0.0, field.max);
            speech += points;
            breakdown.push(Contribution {
                category: Category::Speech,
                key: field.key.clone(),
                label: format!("{} – {}", section.name, field.label),
                raw,
                points,
            });
        }
    }

    let mut participation = 0.0;
    for item in &config.participation_items {
        let raw = counts.value(&item.key);
        let points = clamp(raw, 0.0, item.max) * item.weight;
        participation += points;
        breakdown.push(Contribution {
            category: Category::Participation,
            key: item.key.clone(),
            label: item.label.clone(),
            raw,
            points,
        });
    }

    let mut extras = 0.0;
    for item in &config.extra_items {
        let (raw, points) = match item.mode() {
            ExtraMode::PerItem(multiplier) => {
                let raw = counts.value(&item.key);
                (raw, clamp(raw, 0.0, UNBOUNDED_COUNT) * multiplier)
            }
            ExtraMode::Capped(max) => {
                let raw = scores.value(&item.key);
                (raw, clamp(raw, 0.0, max))
            }
        };
        extras += points;
        breakdown.push(Contribution {
            category: Category::Extras,
            key: item.key.clone(),
            label: item.label.clone(),
            raw,
            points,
        });
    }

    // Final total is rounded once from the unrounded sums
    let totals = Totals {
        speech_total: round2(speech),
        participation_total: round2(participation),
        extras_total: round2(extras),
        final_total: round2(speech + participation + extras),
    };

    ScoreResult { totals, breakdown }
}

/// Clamp into `[low, high]`. A negative or NaN upper bound collapses to `low`.
pub fn clamp(value: f64, low: f64, high: f64) -> f64 {
    if value.is_nan() || high.is_nan() {
        return low;
    }
    value.min(high).max(low)
}

/// Round to hundredths, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
