use serde::{Deserialize, Serialize};

/// Application settings from `config.yaml`. Every field is optional.
///
/// Example YAML:
/// ```yaml
/// ledger_path: /home/me/mun/who-ledger.json
/// export_dir: /home/me/mun/exports
/// log_level: info
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Ledger file (defaults to ~/.config/mun-marker/ledger.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_path: Option<String>,

    /// Directory for spreadsheet exports (defaults to the working directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<String>,

    /// Log filter used when neither --verbose nor MUN_MARKER_LOG is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}
