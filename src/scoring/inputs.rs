use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw, unclamped entry for one participant and one rubric key.
///
/// Entries are kept as typed so a blank or garbled value survives a save and
/// reload unchanged; the engine only ever sees the coerced number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInput {
    Number(f64),
    Text(String),
    Blank,
}

impl RawInput {
    /// Classify operator-typed text.
    ///
    /// Only finite numbers are stored as `Number`; "inf" or "1e999" stay as
    /// text, since JSON cannot hold a non-finite value.
    pub fn from_entry(entry: &str) -> Self {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            return RawInput::Blank;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => RawInput::Number(n),
            _ => RawInput::Text(entry.to_string()),
        }
    }

    /// Numeric value of this entry. Blank, unparseable and non-finite all
    /// become 0.
    pub fn coerce(&self) -> f64 {
        let n = match self {
            RawInput::Number(n) => *n,
            RawInput::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            RawInput::Blank => 0.0,
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }
}

impl From<f64> for RawInput {
    fn from(n: f64) -> Self {
        RawInput::Number(n)
    }
}

impl std::fmt::Display for RawInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawInput::Number(n) => write!(f, "{}", n),
            RawInput::Text(s) => write!(f, "{}", s),
            RawInput::Blank => Ok(()),
        }
    }
}

/// Key → raw entry mapping for one participant. Absent keys read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInputs(BTreeMap<String, RawInput>);

impl RawInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&RawInput> {
        self.0.get(key)
    }

    /// Coerced value for `key`, 0 when absent.
    pub fn value(&self, key: &str) -> f64 {
        self.0.get(key).map(RawInput::coerce).unwrap_or(0.0)
    }

    pub fn set(&mut self, key: impl Into<String>, input: RawInput) {
        self.0.insert(key.into(), input);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawInput)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<RawInput>> FromIterator<(K, V)> for RawInputs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entry_classifies() {
        assert_eq!(RawInput::from_entry(""), RawInput::Blank);
        assert_eq!(RawInput::from_entry("   "), RawInput::Blank);
        assert_eq!(RawInput::from_entry("3.5"), RawInput::Number(3.5));
        assert_eq!(RawInput::from_entry(" 2 "), RawInput::Number(2.0));
        assert_eq!(
            RawInput::from_entry("abc"),
            RawInput::Text("abc".to_string())
        );
    }

    #[test]
    fn test_coerce_garbage_is_zero() {
        assert_eq!(RawInput::Blank.coerce(), 0.0);
        assert_eq!(RawInput::Text("abc".to_string()).coerce(), 0.0);
        assert_eq!(RawInput::Text("3abc".to_string()).coerce(), 0.0);
        assert_eq!(RawInput::Text(" 4 ".to_string()).coerce(), 4.0);
        assert_eq!(RawInput::Number(f64::NAN).coerce(), 0.0);
        assert_eq!(RawInput::Number(-2.0).coerce(), -2.0);
    }

    #[test]
    fn test_non_finite_entry_is_zero() {
        for entry in ["inf", "-inf", "infinity", "1e999", "NaN"] {
            let input = RawInput::from_entry(entry);
            assert_eq!(input, RawInput::Text(entry.to_string()), "{entry}");
            assert_eq!(input.coerce(), 0.0, "{entry}");
        }
        assert_eq!(RawInput::Number(f64::INFINITY).coerce(), 0.0);
        assert_eq!(RawInput::Number(f64::NEG_INFINITY).coerce(), 0.0);
    }

    #[test]
    fn test_absent_key_reads_zero() {
        let inputs: RawInputs = [("a", 1.5)].into_iter().collect();
        assert_eq!(inputs.value("a"), 1.5);
        assert_eq!(inputs.value("missing"), 0.0);
    }

    #[test]
    fn test_json_accepts_numbers_strings_and_null() {
        let inputs: RawInputs =
            serde_json::from_str(r#"{"a": 2, "b": "7", "c": "", "d": null, "e": "x"}"#).unwrap();
        assert_eq!(inputs.get("a"), Some(&RawInput::Number(2.0)));
        assert_eq!(inputs.value("b"), 7.0);
        assert_eq!(inputs.value("c"), 0.0);
        assert_eq!(inputs.get("d"), Some(&RawInput::Blank));
        assert_eq!(inputs.value("e"), 0.0);
    }

    #[test]
    fn test_display_preserves_entry() {
        assert_eq!(RawInput::Number(3.0).to_string(), "3");
        assert_eq!(RawInput::Text("n/a".to_string()).to_string(), "n/a");
        assert_eq!(RawInput::Blank.to_string(), "");
    }
}
