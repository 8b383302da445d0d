use crate::ledger::Participant;
use crate::scoring::{compute_totals, rank, ExtraMode, RubricConfig};

/// One tabular sheet: a header row and data rows of equal width.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Build the Marking, Recognition and Verbatim sheets.
pub fn build_workbook(config: &RubricConfig, participants: &[Participant]) -> Workbook {
    Workbook {
        sheets: vec![
            marking_sheet(config, participants),
            recognition_sheet(config, participants),
            verbatim_sheet(participants),
        ],
    }
}

/// Every raw value plus the four totals, one row per participant.
/// Columns follow the rubric's declared order left to right.
pub fn marking_sheet(config: &RubricConfig, participants: &[Participant]) -> Sheet {
    let mut headers = vec!["S.NO".to_string(), "Portfolio".to_string()];
    for section in &config.speech_sections {
        for field in &section.fields {
            headers.push(format!(
                "{} – {} (/ {})",
                section.name,
                field.label,
                number(field.max)
            ));
        }
    }
    for item in &config.participation_items {
        headers.push(item.label.clone());
    }
    for item in &config.extra_items {
        headers.push(match item.mode() {
            ExtraMode::PerItem(_) => item.label.clone(),
            ExtraMode::Capped(max) => format!("{} (/ {})", item.label, number(max)),
        });
    }
    headers.extend(
        ["Speech Total", "Participation", "Extras", "FINAL"]
            .iter()
            .map(|h| h.to_string()),
    );

    let rows = participants
        .iter()
        .map(|p| {
            let mut row = vec![p.sequence.to_string(), p.portfolio.clone()];
            for section in &config.speech_sections {
                for field in &section.fields {
                    row.push(number(p.scores.value(&field.key)));
                }
            }
            for item in &config.participation_items {
                row.push(number(p.counts.value(&item.key)));
            }
            for item in &config.extra_items {
                let value = match item.mode() {
                    ExtraMode::PerItem(_) => p.counts.value(&item.key),
                    ExtraMode::Capped(_) => p.scores.value(&item.key),
                };
                row.push(number(value));
            }
            let totals = compute_totals(config, &p.scores, &p.counts);
            row.push(number(totals.speech_total));
            row.push(number(totals.participation_total));
            row.push(number(totals.extras_total));
            row.push(number(totals.final_total));
            row
        })
        .collect();

    Sheet {
        name: "Marking".to_string(),
        headers,
        rows,
    }
}

/// Awarded participants, grouped by tier in declared order, ranked within
/// each tier. Labels that match no tier come last.
pub fn recognition_sheet(config: &RubricConfig, participants: &[Participant]) -> Sheet {
    let ranked = rank(participants, config);
    let tier_index = |award: &str| {
        config
            .award_tiers
            .iter()
            .position(|t| t.label == award)
            .unwrap_or(config.award_tiers.len())
    };

    let mut awarded: Vec<_> = ranked
        .iter()
        .filter(|r| !r.participant.award.is_empty())
        .collect();
    awarded.sort_by_key(|r| tier_index(&r.participant.award));

    let rows = awarded
        .into_iter()
        .map(|r| {
            vec![
                r.participant.award.clone(),
                r.participant.sequence.to_string(),
                r.participant.portfolio.clone(),
                number(r.totals.final_total),
            ]
        })
        .collect();

    Sheet {
        name: "Recognition".to_string(),
        headers: ["Award", "S.NO", "Portfolio", "Score"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows,
    }
}

pub fn verbatim_sheet(participants: &[Participant]) -> Sheet {
    Sheet {
        name: "Verbatim".to_string(),
        headers: ["S.NO", "Portfolio", "Notes"]
            .iter()
            .map(|h| h.to_string())
            .collect(),
        rows: participants
            .iter()
            .map(|p| vec![p.sequence.to_string(), p.portfolio.clone(), p.notes.clone()])
            .collect(),
    }
}

fn number(value: f64) -> String {
    format!("{}", value)
}
