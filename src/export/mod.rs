pub mod sheets;

pub use sheets::{build_workbook, marking_sheet, recognition_sheet, verbatim_sheet, Sheet, Workbook};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File-name stem for a committee: whitespace runs become `_`.
/// Falls back to "committee" when the name is blank.
pub fn file_stem(committee: &str) -> String {
    let stem = committee.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "committee".to_string()
    } else {
        stem
    }
}

/// Write each sheet as `<stem>_<sheet>.csv` under `dir`.
/// Returns the written paths in sheet order.
pub fn write_workbook(dir: &Path, stem: &str, workbook: &Workbook) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory at {}", dir.display()))?;
    }

    let mut written = Vec::with_capacity(workbook.sheets.len());
    for sheet in &workbook.sheets {
        let path = dir.join(format!("{}_{}.csv", stem, sheet.name.to_lowercase()));
        write_sheet(&path, sheet)?;
        tracing::info!(sheet = %sheet.name, rows = sheet.rows.len(), path = %path.display(), "sheet exported");
        written.push(path);
    }
    Ok(written)
}

fn write_sheet(path: &Path, sheet: &Sheet) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer
        .write_record(&sheet.headers)
        .with_context(|| format!("Failed to write {} header", sheet.name))?;
    for row in &sheet.rows {
        writer
            .write_record(row)
            .with_context(|| format!("Failed to write {} row", sheet.name))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("WHO – AIS"), "WHO_–_AIS");
        assert_eq!(file_stem("  Security   Council "), "Security_Council");
        assert_eq!(file_stem(""), "committee");
    }

    #[test]
    fn test_write_workbook_creates_three_csv_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut ledger = Ledger::default();
        let id = ledger.add_participant().id.clone();
        ledger.set_portfolio(&id, "Ghana, Republic of");
        ledger.set_notes(&id, "said \"hello\"");

        let workbook = build_workbook(&ledger.config, &ledger.participants);
        let out = dir.path().join("exports");
        let paths = write_workbook(&out, "UNSC", &workbook).unwrap();

        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("UNSC_marking.csv"));
        assert!(paths[1].ends_with("UNSC_recognition.csv"));
        assert!(paths[2].ends_with("UNSC_verbatim.csv"));

        let mut reader = csv::Reader::from_path(&paths[2]).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["S.NO", "Portfolio", "Notes"]);
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[1], "Ghana, Republic of");
        assert_eq!(&record[2], "said \"hello\"");
    }
}
