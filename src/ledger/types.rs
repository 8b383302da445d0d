use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::{
    plan_awards, rank, validate_rubric, AwardPlan, RawInput, RawInputs, Ranked, RubricConfig,
};

/// One delegate being marked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    /// Stable for the record's lifetime
    #[serde(default)]
    pub id: String,
    /// Operator-assigned serial number; not guaranteed unique
    #[serde(default, alias = "sno")]
    pub sequence: u32,
    #[serde(default)]
    pub portfolio: String,
    #[serde(default)]
    pub scores: RawInputs,
    #[serde(default)]
    pub counts: RawInputs,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub award: String,
}

impl Participant {
    pub fn new(id: String, sequence: u32) -> Self {
        Self {
            id,
            sequence,
            portfolio: String::new(),
            scores: RawInputs::new(),
            counts: RawInputs::new(),
            notes: String::new(),
            award: String::new(),
        }
    }

    /// Short form of the id for display and selection
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(idx, _)| idx)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }

    /// Portfolio, or a placeholder when none has been entered yet
    pub fn display_name(&self) -> &str {
        if self.portfolio.trim().is_empty() {
            "(no portfolio)"
        } else {
            &self.portfolio
        }
    }
}

/// Rubric plus every participant: the whole persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub config: RubricConfig,
    #[serde(default, alias = "delegates")]
    pub participants: Vec<Participant>,
}

impl Ledger {
    pub fn new(config: RubricConfig) -> Self {
        Self {
            config,
            participants: Vec::new(),
        }
    }

    /// Append a participant with a fresh id and the next serial number.
    ///
    /// Counts are seeded with zero for every counted category so a new record
    /// shows explicit zeros rather than blanks.
    pub fn add_participant(&mut self) -> &mut Participant {
        let sequence = self
            .participants
            .iter()
            .map(|p| p.sequence)
            .max()
            .map(|max| max + 1)
            .unwrap_or(1);

        let mut participant = Participant::new(Uuid::new_v4().to_string(), sequence);
        for key in self.config.count_keys() {
            participant.counts.set(key, RawInput::Number(0.0));
        }

        tracing::debug!(id = %participant.id, sequence, "participant added");
        self.participants.push(participant);
        let last = self.participants.len() - 1;
        &mut self.participants[last]
    }

    /// Remove a participant by id.
    /// Returns true if a participant was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        before != self.participants.len()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    fn edit(&mut self, id: &str, apply: impl FnOnce(&mut Participant)) -> bool {
        match self.participants.iter_mut().find(|p| p.id == id) {
            Some(participant) => {
                apply(participant);
                true
            }
            None => false,
        }
    }

    pub fn set_score(&mut self, id: &str, key: &str, input: RawInput) -> bool {
        self.edit(id, |p| p.scores.set(key, input))
    }

    pub fn set_count(&mut self, id: &str, key: &str, input: RawInput) -> bool {
        self.edit(id, |p| p.counts.set(key, input))
    }

    pub fn set_portfolio(&mut self, id: &str, portfolio: &str) -> bool {
        self.edit(id, |p| p.portfolio = portfolio.to_string())
    }

    pub fn set_notes(&mut self, id: &str, notes: &str) -> bool {
        self.edit(id, |p| p.notes = notes.to_string())
    }

    pub fn set_sequence(&mut self, id: &str, sequence: u32) -> bool {
        self.edit(id, |p| p.sequence = sequence)
    }

    pub fn set_award(&mut self, id: &str, award: &str) -> bool {
        self.edit(id, |p| p.award = award.trim().to_string())
    }

    /// Reset every award to empty. Nothing else is touched.
    pub fn clear_awards(&mut self) {
        for participant in &mut self.participants {
            participant.award.clear();
        }
    }

    /// Clear all awards, then apply `plan`.
    pub fn apply_award_plan(&mut self, plan: &AwardPlan) {
        self.clear_awards();
        for participant in &mut self.participants {
            if let Some(label) = plan.get(&participant.id) {
                participant.award = label.clone();
            }
        }
    }

    /// Rank, plan awards from the configured tiers and apply them.
    pub fn auto_assign_awards(&mut self) -> AwardPlan {
        let plan = {
            let ranked = rank(&self.participants, &self.config);
            plan_awards(&ranked, &self.config.award_tiers)
        };
        self.apply_award_plan(&plan);
        tracing::info!(awarded = plan.len(), "awards assigned");
        plan
    }

    pub fn ranked(&self) -> Vec<Ranked<'_>> {
        rank(&self.participants, &self.config)
    }

    /// Replace the rubric after validating it. Participants keep their raw
    /// inputs; keys no longer in the rubric are simply ignored by scoring.
    pub fn replace_config(&mut self, config: RubricConfig) -> Result<(), Vec<String>> {
        validate_rubric(&config)?;
        self.config = config;
        Ok(())
    }

    /// Default rubric, no participants.
    pub fn reset(&mut self) {
        *self = Ledger::default();
    }

    /// Resolve a selector to a participant id.
    ///
    /// Accepts an exact id, a unique id prefix of at least four characters,
    /// or a serial number shared by exactly one participant.
    pub fn resolve(&self, selector: &str) -> Result<String> {
        let selector = selector.trim();
        if selector.is_empty() {
            bail!("Empty participant selector");
        }

        if let Some(p) = self.get(selector) {
            return Ok(p.id.clone());
        }

        if let Ok(sequence) = selector.parse::<u32>() {
            let matches: Vec<&Participant> = self
                .participants
                .iter()
                .filter(|p| p.sequence == sequence)
                .collect();
            match matches.as_slice() {
                [only] => return Ok(only.id.clone()),
                [] => {}
                many => bail!(
                    "Serial number {} is shared by {} participants; use an id instead ({})",
                    sequence,
                    many.len(),
                    many.iter()
                        .map(|p| p.short_id())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            }
        }

        if selector.len() >= 4 {
            let matches: Vec<&Participant> = self
                .participants
                .iter()
                .filter(|p| p.id.starts_with(selector))
                .collect();
            match matches.as_slice() {
                [only] => return Ok(only.id.clone()),
                [] => {}
                many => bail!("Id prefix '{}' matches {} participants", selector, many.len()),
            }
        }

        bail!("No participant matches '{}'", selector)
    }

    /// Participants whose portfolio contains `text` (case-insensitive) or
    /// whose serial number contains it, in insertion order.
    pub fn filter(&self, text: &str) -> Vec<&Participant> {
        let needle = text.trim().to_lowercase();
        self.participants
            .iter()
            .filter(|p| {
                needle.is_empty()
                    || p.portfolio.to_lowercase().contains(&needle)
                    || p.sequence.to_string().contains(&needle)
            })
            .collect()
    }

    /// Whether `key` is read by the rubric from the `scores` map.
    pub fn is_score_key(&self, key: &str) -> bool {
        self.config.score_keys().any(|k| k == key)
    }

    /// Whether `key` is read by the rubric from the `counts` map.
    pub fn is_count_key(&self, key: &str) -> bool {
        self.config.count_keys().any(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::compute_totals;

    fn ledger_with(n: usize) -> Ledger {
        let mut ledger = Ledger::default();
        for _ in 0..n {
            ledger.add_participant();
        }
        ledger
    }

    #[test]
    fn test_add_assigns_next_sequence_and_zero_counts() {
        let mut ledger = Ledger::default();
        let first = ledger.add_participant().clone();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.counts.len(), 6);
        assert_eq!(first.counts.get("poi"), Some(&RawInput::Number(0.0)));
        assert!(first.scores.is_empty());
        assert!(first.award.is_empty());

        ledger.participants[0].sequence = 10;
        let second = ledger.add_participant();
        assert_eq!(second.sequence, 11);
        assert_ne!(second.id, first.id);
    }

    #[test]
    fn test_remove_by_id() {
        let mut ledger = ledger_with(2);
        let id = ledger.participants[0].id.clone();

        assert!(ledger.remove(&id));
        assert!(!ledger.remove(&id));
        assert_eq!(ledger.participants.len(), 1);
    }

    #[test]
    fn test_setters_touch_one_record() {
        let mut ledger = ledger_with(2);
        let id = ledger.participants[1].id.clone();

        assert!(ledger.set_score(&id, "s1_research", RawInput::Number(2.0)));
        assert!(ledger.set_count(&id, "poi", RawInput::Number(3.0)));
        assert!(ledger.set_portfolio(&id, "France"));
        assert!(ledger.set_notes(&id, "strong opening"));
        assert!(ledger.set_sequence(&id, 7));
        assert!(ledger.set_award(&id, " HC "));
        assert!(!ledger.set_notes("missing", "x"));

        let p = ledger.get(&id).unwrap();
        assert_eq!(p.scores.value("s1_research"), 2.0);
        assert_eq!(p.counts.value("poi"), 3.0);
        assert_eq!(p.portfolio, "France");
        assert_eq!(p.notes, "strong opening");
        assert_eq!(p.sequence, 7);
        assert_eq!(p.award, "HC");

        let other = &ledger.participants[0];
        assert!(other.portfolio.is_empty());
        assert_eq!(other.counts.value("poi"), 0.0);
    }

    #[test]
    fn test_scoring_does_not_mutate_records() {
        let mut ledger = ledger_with(1);
        let id = ledger.participants[0].id.clone();
        ledger.set_score(&id, "s1_research", RawInput::Number(99.0));
        let before = ledger.clone();

        let _ = compute_totals(&ledger.config, &ledger.participants[0].scores, &ledger.participants[0].counts);
        let _ = ledger.ranked();

        assert_eq!(ledger, before);
        assert_eq!(ledger.participants[0].scores.value("s1_research"), 99.0);
    }

    #[test]
    fn test_auto_assign_after_clear_is_repeatable() {
        let mut ledger = ledger_with(9);
        let ids: Vec<String> = ledger.participants.iter().map(|p| p.id.clone()).collect();
        for (i, id) in ids.iter().enumerate() {
            ledger.set_count(id, "poi", RawInput::Number((i % 4) as f64));
        }
        ledger.set_award(&ids[8], "stale");

        ledger.clear_awards();
        ledger.auto_assign_awards();
        let first: Vec<String> = ledger.participants.iter().map(|p| p.award.clone()).collect();

        ledger.clear_awards();
        ledger.auto_assign_awards();
        let second: Vec<String> = ledger.participants.iter().map(|p| p.award.clone()).collect();

        assert_eq!(first, second);
        assert!(!first.contains(&"stale".to_string()));
        assert_eq!(first.iter().filter(|a| !a.is_empty()).count(), 7);
    }

    #[test]
    fn test_clear_awards_touches_only_awards() {
        let mut ledger = ledger_with(2);
        let id = ledger.participants[0].id.clone();
        ledger.set_award(&id, "BD");
        ledger.set_notes(&id, "keep me");

        ledger.clear_awards();

        assert!(ledger.participants.iter().all(|p| p.award.is_empty()));
        assert_eq!(ledger.get(&id).unwrap().notes, "keep me");
    }

    #[test]
    fn test_apply_plan_clears_unplanned() {
        let mut ledger = ledger_with(2);
        let a = ledger.participants[0].id.clone();
        let b = ledger.participants[1].id.clone();
        ledger.set_award(&b, "VM");

        let plan: AwardPlan = [(a.clone(), "BD".to_string())].into_iter().collect();
        ledger.apply_award_plan(&plan);

        assert_eq!(ledger.get(&a).unwrap().award, "BD");
        assert_eq!(ledger.get(&b).unwrap().award, "");
    }

    #[test]
    fn test_replace_config_rejects_invalid() {
        let mut ledger = Ledger::default();
        let mut bad = RubricConfig::default();
        bad.participation_items[1].key = "poo".to_string();

        assert!(ledger.replace_config(bad).is_err());
        assert_eq!(ledger.config, RubricConfig::default());
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut ledger = ledger_with(3);
        ledger.config.committee = "UNSC".to_string();

        ledger.reset();

        assert!(ledger.participants.is_empty());
        assert_eq!(ledger.config, RubricConfig::default());
    }

    #[test]
    fn test_resolve_by_sequence_id_and_prefix() {
        let mut ledger = ledger_with(3);
        let id = ledger.participants[1].id.clone();

        assert_eq!(ledger.resolve("2").unwrap(), id);
        assert_eq!(ledger.resolve(&id).unwrap(), id);
        assert_eq!(ledger.resolve(&id[..8]).unwrap(), id);
        assert!(ledger.resolve("42").is_err());
        assert!(ledger.resolve("").is_err());

        ledger.participants[2].sequence = 2;
        let err = ledger.resolve("2").unwrap_err().to_string();
        assert!(err.contains("shared by 2"));
    }

    #[test]
    fn test_filter_matches_portfolio_or_sequence() {
        let mut ledger = ledger_with(12);
        let france = ledger.participants[0].id.clone();
        ledger.set_portfolio(&france, "France");

        let by_name = ledger.filter("fra");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, france);

        // "1", "10", "11", "12"
        assert_eq!(ledger.filter("1").len(), 4);
        assert_eq!(ledger.filter("").len(), 12);
    }

    #[test]
    fn test_legacy_field_names() {
        let json = r#"{"delegates": [{"id": "abc", "sno": 4, "portfolio": "Chile", "scores": {}, "counts": {"poi": 1}, "notes": "", "award": ""}]}"#;
        let ledger: Ledger = serde_json::from_str(json).unwrap();
        assert_eq!(ledger.participants[0].sequence, 4);
        assert_eq!(ledger.participants[0].counts.value("poi"), 1.0);
        assert_eq!(ledger.config, RubricConfig::default());
    }

    #[test]
    fn test_short_id() {
        let p = Participant::new("0123456789abcdef".to_string(), 1);
        assert_eq!(p.short_id(), "01234567");
        let short = Participant::new("ab".to_string(), 1);
        assert_eq!(short.short_id(), "ab");
    }
}
