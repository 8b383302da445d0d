use std::collections::HashSet;

use super::config::RubricConfig;

/// Validate a rubric before it is used or persisted.
/// Returns all validation errors at once (not just the first).
pub fn validate_rubric(config: &RubricConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let mut seen_keys = HashSet::new();

    let mut check_key = |path: String, key: &str, errors: &mut Vec<String>| {
        if key.trim().is_empty() {
            errors.push(format!("{}.key: must not be empty", path));
        } else if !seen_keys.insert(key.to_string()) {
            errors.push(format!("{}.key: duplicate key '{}'", path, key));
        }
    };

    for (si, section) in config.speech_sections.iter().enumerate() {
        for (fi, field) in section.fields.iter().enumerate() {
            let path = format!("speech_sections[{}].fields[{}]", si, fi);
            check_key(path.clone(), &field.key, &mut errors);
            if !is_limit(field.max) {
                errors.push(format!(
                    "{}.max: must be a non-negative number, got {}",
                    path, field.max
                ));
            }
        }
    }

    for (i, item) in config.participation_items.iter().enumerate() {
        let path = format!("participation_items[{}]", i);
        check_key(path.clone(), &item.key, &mut errors);
        if !is_limit(item.max) {
            errors.push(format!(
                "{}.max: must be a non-negative number, got {}",
                path, item.max
            ));
        }
        if !is_limit(item.weight) {
            errors.push(format!(
                "{}.weight: must be a non-negative number, got {}",
                path, item.weight
            ));
        }
    }

    for (i, item) in config.extra_items.iter().enumerate() {
        let path = format!("extra_items[{}]", i);
        check_key(path.clone(), &item.key, &mut errors);
        match (item.per_item, item.max) {
            (Some(_), Some(_)) => {
                errors.push(format!(
                    "{}: set either per_item or max, not both",
                    path
                ));
            }
            (Some(multiplier), None) if !is_limit(multiplier) => {
                errors.push(format!(
                    "{}.per_item: must be a non-negative number, got {}",
                    path, multiplier
                ));
            }
            (None, Some(max)) if !is_limit(max) => {
                errors.push(format!(
                    "{}.max: must be a non-negative number, got {}",
                    path, max
                ));
            }
            _ => {}
        }
    }

    let mut seen_labels = HashSet::new();
    for (i, tier) in config.award_tiers.iter().enumerate() {
        let label = tier.label.trim();
        if label.is_empty() {
            errors.push(format!("award_tiers[{}].label: must not be empty", i));
        } else if !seen_labels.insert(label.to_string()) {
            errors.push(format!(
                "award_tiers[{}].label: duplicate label '{}'",
                i, label
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_limit(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::{AwardTier, ExtraItem, ScoreField, SpeechSection};

    #[test]
    fn test_default_rubric_is_valid() {
        assert!(validate_rubric(&RubricConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_rubric_is_valid() {
        let config = RubricConfig {
            committee: String::new(),
            speech_sections: vec![],
            participation_items: vec![],
            extra_items: vec![],
            award_tiers: vec![],
        };
        assert!(validate_rubric(&config).is_ok());
    }

    #[test]
    fn test_duplicate_key_across_categories() {
        let mut config = RubricConfig::default();
        config.extra_items[0].key = "s1_research".to_string();

        let errors = validate_rubric(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("extra_items[0].key"));
        assert!(errors[0].contains("duplicate"));
    }

    #[test]
    fn test_negative_max() {
        let mut config = RubricConfig::default();
        config.speech_sections[1].fields[2].max = -1.0;

        let errors = validate_rubric(&config).unwrap_err();
        assert!(errors[0].contains("speech_sections[1].fields[2].max"));
    }

    #[test]
    fn test_extra_with_both_modes() {
        let mut config = RubricConfig::default();
        config.extra_items.push(ExtraItem {
            key: "both".to_string(),
            label: "Both".to_string(),
            per_item: Some(2.0),
            max: Some(5.0),
        });

        let errors = validate_rubric(&config).unwrap_err();
        assert!(errors[0].contains("extra_items[7]"));
        assert!(errors[0].contains("not both"));
    }

    #[test]
    fn test_bad_award_tiers() {
        let mut config = RubricConfig::default();
        config.award_tiers.push(AwardTier {
            label: " ".to_string(),
            title: None,
            slots: 1,
        });
        config.award_tiers.push(AwardTier {
            label: "BD".to_string(),
            title: None,
            slots: 1,
        });

        let errors = validate_rubric(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("award_tiers[4].label"));
        assert!(errors[1].contains("duplicate label 'BD'"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RubricConfig::default();
        config.speech_sections.push(SpeechSection {
            name: "Broken".to_string(),
            fields: vec![ScoreField {
                key: String::new(),
                label: "Nothing".to_string(),
                max: f64::NAN,
            }],
        });
        config.participation_items[0].weight = -2.0;

        let errors = validate_rubric(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
