use std::cmp::Ordering;
use std::collections::BTreeMap;

use super::config::{AwardTier, RubricConfig};
use super::engine::{compute_totals, Totals};
use crate::ledger::Participant;

/// Group key used for participants without an award.
pub const UNASSIGNED: &str = "Unassigned";

/// A participant in ranked position with freshly computed totals.
#[derive(Debug, Clone)]
pub struct Ranked<'a> {
    pub participant: &'a Participant,
    pub totals: Totals,
    /// 1-based position in the ranking
    pub position: usize,
}

/// Score every participant, then order by final total descending.
///
/// Sorting is stable, so participants on equal totals keep their insertion
/// order.
pub fn rank<'a>(participants: &'a [Participant], config: &RubricConfig) -> Vec<Ranked<'a>> {
    let mut scored: Vec<(&Participant, Totals)> = participants
        .iter()
        .map(|p| (p, compute_totals(config, &p.scores, &p.counts)))
        .collect();

    scored.sort_by(|a, b| {
        b.1.final_total
            .partial_cmp(&a.1.final_total)
            .unwrap_or(Ordering::Equal)
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (participant, totals))| Ranked {
            participant,
            totals,
            position: idx + 1,
        })
        .collect()
}

/// Award labels keyed by participant id.
pub type AwardPlan = BTreeMap<String, String>;

/// Fill tiers in declared order from the top of the ranking.
///
/// A single cursor runs across tier boundaries. When the ranking runs out,
/// the remaining tiers get no recipients.
pub fn plan_awards(ranked: &[Ranked<'_>], tiers: &[AwardTier]) -> AwardPlan {
    let mut plan = AwardPlan::new();
    let mut remaining = ranked.iter();

    for tier in tiers {
        for entry in remaining.by_ref().take(tier.slots) {
            plan.insert(entry.participant.id.clone(), tier.label.clone());
        }
    }

    plan
}

#[derive(Debug, Clone)]
pub struct AwardGroup<'a, 'b> {
    /// Award label, empty for unassigned participants
    pub award: String,
    pub members: Vec<&'b Ranked<'a>>,
}

impl AwardGroup<'_, '_> {
    pub fn display_label(&self) -> &str {
        if self.award.is_empty() {
            UNASSIGNED
        } else {
            &self.award
        }
    }
}

/// Group ranked entries by their current award.
///
/// Groups are keyed by the exact award value and appear in order of first
/// appearance; members keep ranked order.
pub fn group_by_award<'a, 'b>(ranked: &'b [Ranked<'a>]) -> Vec<AwardGroup<'a, 'b>> {
    let mut groups: Vec<AwardGroup<'a, 'b>> = Vec::new();

    for entry in ranked {
        let award = entry.participant.award.as_str();
        match groups.iter_mut().find(|g| g.award == award) {
            Some(group) => group.members.push(entry),
            None => groups.push(AwardGroup {
                award: award.to_string(),
                members: vec![entry],
            }),
        }
    }

    groups
}
