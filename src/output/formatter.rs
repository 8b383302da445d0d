use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::ledger::Participant;
use crate::scoring::{AwardGroup, Category, Ranked, RubricConfig, ScoreResult};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a total with exactly two decimals ("32.00", "3.01")
pub fn format_total(total: f64) -> String {
    format!("{:.2}", total)
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Pad to `width` characters (not bytes)
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Format ranked participants as a table:
/// Rank, S.NO, Speech, Participation, Extras, Final, Award, Portfolio
pub fn format_ranked_table(ranked: &[Ranked], use_colors: bool) -> String {
    if ranked.is_empty() {
        return "No participants yet.".to_string();
    }

    let term_width = get_terminal_width();
    let header = format!(
        "{:>4} {:>5}  {:>7} {:>7} {:>7} {:>7}  {:<6} {}",
        "#", "S.NO", "Speech", "Part.", "Extras", "FINAL", "Award", "Portfolio"
    );
    let fixed_width = header.chars().count() - "Portfolio".len();

    let mut lines = vec![if use_colors {
        header.dimmed().to_string()
    } else {
        header
    }];

    for entry in ranked {
        let p = entry.participant;
        let portfolio = match term_width {
            Some(width) if width > fixed_width + 10 => truncate_text(p.display_name(), width - fixed_width),
            Some(_) => truncate_text(p.display_name(), 20),
            None => p.display_name().to_string(),
        };
        let award = pad(&p.award, 6);
        let final_str = format!("{:>7}", format_total(entry.totals.final_total));

        let line = format!(
            "{:>3}. {:>5}  {:>7} {:>7} {:>7} {}  {} {}",
            entry.position,
            p.sequence,
            format_total(entry.totals.speech_total),
            format_total(entry.totals.participation_total),
            format_total(entry.totals.extras_total),
            if use_colors {
                final_str.bold().to_string()
            } else {
                final_str
            },
            if use_colors && !p.award.is_empty() {
                award.yellow().to_string()
            } else {
                award
            },
            portfolio
        );
        lines.push(line);
    }

    lines.join("\n")
}

/// Multi-line view of one participant with every rubric line.
pub fn format_participant_detail(
    participant: &Participant,
    result: &ScoreResult,
    use_colors: bool,
) -> String {
    let title = format!("#{} {}", participant.sequence, participant.display_name());
    let mut lines = vec![
        if use_colors {
            title.bold().to_string()
        } else {
            title
        },
        format!("  Id: {}", participant.id),
    ];
    if !participant.award.is_empty() {
        lines.push(format!("  Award: {}", participant.award));
    }

    let sections = [
        (Category::Speech, "Speeches", result.totals.speech_total),
        (Category::Participation, "Participation", result.totals.participation_total),
        (Category::Extras, "Extras", result.totals.extras_total),
    ];
    for (category, heading, subtotal) in sections {
        lines.push(format!("  {}: {}", heading, format_total(subtotal)));
        for c in result.breakdown.iter().filter(|c| c.category == category) {
            let clamped = if (c.raw - c.points).abs() > f64::EPSILON {
                format!(" (entered {})", c.raw)
            } else {
                String::new()
            };
            lines.push(format!("    {:<40} {:>7}{}", c.label, format_total(c.points), clamped));
        }
    }

    let final_line = format!("  Final: {}", format_total(result.totals.final_total));
    lines.push(if use_colors {
        final_line.bold().to_string()
    } else {
        final_line
    });

    if !participant.notes.is_empty() {
        lines.push(format!("  Notes: {}", participant.notes));
    }

    lines.join("\n")
}

/// Recognition view: one block per award group, ranked within each group.
pub fn format_recognition(groups: &[AwardGroup], config: &RubricConfig, use_colors: bool) -> String {
    if groups.is_empty() {
        return "No participants yet.".to_string();
    }

    let mut blocks = Vec::new();
    for group in groups {
        let heading = match config.tier(&group.award).and_then(|t| t.title.as_deref()) {
            Some(title) => format!("{} – {} ({})", group.display_label(), title, group.members.len()),
            None => format!("{} ({})", group.display_label(), group.members.len()),
        };
        let mut lines = vec![if use_colors {
            heading.bold().to_string()
        } else {
            heading
        }];
        for entry in &group.members {
            lines.push(format!(
                "  {:>5}  {:>7}  {}",
                entry.participant.sequence,
                format_total(entry.totals.final_total),
                entry.participant.display_name()
            ));
        }
        blocks.push(lines.join("\n"));
    }

    blocks.join("\n\n")
}

/// Notes view: serial number, portfolio and notes per participant.
pub fn format_notes(participants: &[&Participant]) -> String {
    if participants.is_empty() {
        return "No participants yet.".to_string();
    }

    participants
        .iter()
        .map(|p| {
            let notes = if p.notes.is_empty() { "-" } else { p.notes.as_str() };
            format!("{:>5}  {}: {}", p.sequence, p.display_name(), notes)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format as tab-separated values for scripting
/// Columns: rank, sno, final, award, portfolio (no headers, no colors)
pub fn format_tsv(ranked: &[Ranked]) -> String {
    ranked
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                r.position,
                r.participant.sequence,
                format_total(r.totals.final_total),
                r.participant.award,
                r.participant.portfolio
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;
    use crate::scoring::{calculate_score, group_by_award, RawInput};

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::default();
        for (portfolio, poi) in [("Canada", 2.0), ("Egypt", 6.0)] {
            let id = ledger.add_participant().id.clone();
            ledger.set_portfolio(&id, portfolio);
            ledger.set_count(&id, "poi", RawInput::Number(poi));
        }
        ledger
    }

    #[test]
    fn test_format_total() {
        assert_eq!(format_total(32.0), "32.00");
        assert_eq!(format_total(3.01), "3.01");
        assert_eq!(format_total(0.0), "0.00");
    }

    #[test]
    fn test_ranked_table_empty() {
        assert_eq!(format_ranked_table(&[], false), "No participants yet.");
    }

    #[test]
    fn test_ranked_table_orders_rows() {
        let ledger = sample_ledger();
        let ranked = ledger.ranked();
        let table = format_ranked_table(&ranked, false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("FINAL"));
        assert!(lines[1].starts_with("  1."));
        assert!(lines[1].contains("6.00"));
        assert!(lines[1].contains("Egypt"));
        assert!(lines[2].contains("Canada"));
    }

    #[test]
    fn test_participant_detail_shows_clamping() {
        let mut ledger = sample_ledger();
        let id = ledger.participants[0].id.clone();
        ledger.set_score(&id, "s1_analysis", RawInput::Number(9.0));
        ledger.set_notes(&id, "good");
        let p = ledger.get(&id).unwrap();
        let result = calculate_score(&ledger.config, &p.scores, &p.counts);

        let detail = format_participant_detail(p, &result, false);

        assert!(detail.starts_with("#1 Canada"));
        assert!(detail.contains("Speeches: 4.00"));
        assert!(detail.contains("Speech 1 – Analysis"));
        assert!(detail.contains("(entered 9)"));
        assert!(detail.contains("Participation: 2.00"));
        assert!(detail.contains("Final: 6.00"));
        assert!(detail.contains("Notes: good"));
    }

    #[test]
    fn test_recognition_uses_tier_titles() {
        let mut ledger = sample_ledger();
        ledger.auto_assign_awards();
        ledger.add_participant();
        let ranked = ledger.ranked();
        let groups = group_by_award(&ranked);

        let text = format_recognition(&groups, &ledger.config, false);

        assert!(text.contains("BD – Best Delegate (1)"));
        assert!(text.contains("HC – High Commendation (1)"));
        assert!(text.contains("Unassigned (1)"));
        assert!(text.contains("(no portfolio)"));
    }

    #[test]
    fn test_notes_view() {
        let mut ledger = sample_ledger();
        let id = ledger.participants[1].id.clone();
        ledger.set_notes(&id, "quoted article 51");

        let text = format_notes(&ledger.filter(""));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "    1  Canada: -");
        assert_eq!(lines[1], "    2  Egypt: quoted article 51");
    }

    #[test]
    fn test_format_tsv() {
        let ledger = sample_ledger();
        let ranked = ledger.ranked();
        assert_eq!(format_tsv(&ranked), "1\t2\t6.00\t\tEgypt\n2\t1\t2.00\t\tCanada");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("Short", 20), "Short");
        assert_eq!(truncate_text("This is a very long title", 15), "This is a ve...");
        assert_eq!(truncate_text("Hello world", 3), "Hel");
    }

    #[test]
    fn test_pad_counts_chars() {
        assert_eq!(pad("BD", 4), "BD  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }
}
