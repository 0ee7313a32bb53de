//! Station/phase keyed azimuth and slowness uncertainties.
//!
//! File format, one entry per line:
//!
//! ```text
//! # station phase slo_unc (s/dg) az_unc (dg)
//! *      *        0.31   2.10
//! *      P        0.30   2.00
//! QSPA   *        0.50   5.00
//! WRA    P        0.55   5.50
//! ```
//!
//! `*` matches any station or phase. A file must define the `* *` row.

use crate::error::UncertaintyError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub const WILDCARD: &str = "*";

/// Uncertainties in the table's native units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzShEntry {
    /// seconds/degree
    pub slowness_s_per_deg: f64,
    /// degrees
    pub azimuth_deg: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AzShUncertaintyTable {
    entries: BTreeMap<String, BTreeMap<String, AzShEntry>>,
}

impl AzShUncertaintyTable {
    pub fn load(path: &Path) -> Result<Self, UncertaintyError> {
        let text = std::fs::read_to_string(path).map_err(|source| UncertaintyError::TableIo {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text, &path.display().to_string())?;
        tracing::debug!(path = %path.display(), entries = table.len(), "loaded azimuth/slowness uncertainty table");
        Ok(table)
    }

    /// Parse table text; `source_name` labels errors.
    pub fn parse(text: &str, source_name: &str) -> Result<Self, UncertaintyError> {
        let mut entries: BTreeMap<String, BTreeMap<String, AzShEntry>> = BTreeMap::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parse_error = |message: String| UncertaintyError::TableParse {
                source_name: source_name.to_string(),
                line: index + 1,
                message,
            };

            let tokens: Vec<&str> = line.split_whitespace().collect();
            let [sta, phase, slowness, azimuth] = tokens[..] else {
                return Err(parse_error(format!(
                    "expected 'station phase slowness azimuth', found {} fields",
                    tokens.len()
                )));
            };
            let number = |token: &str| {
                token
                    .parse::<f64>()
                    .map_err(|_| parse_error(format!("'{}' is not a number", token)))
            };
            let entry = AzShEntry {
                slowness_s_per_deg: number(slowness)?,
                azimuth_deg: number(azimuth)?,
            };
            entries
                .entry(sta.to_string())
                .or_default()
                .insert(phase.to_string(), entry);
        }

        let has_default = entries
            .get(WILDCARD)
            .is_some_and(|phases| phases.contains_key(WILDCARD));
        if !has_default {
            return Err(UncertaintyError::MissingDefaultEntry {
                source_name: source_name.to_string(),
            });
        }
        Ok(Self { entries })
    }

    /// Entry for `sta` and `phase`, trying (sta, phase), (sta, *),
    /// (*, phase), (*, *). A station without rows uses the `*` rows.
    pub fn lookup(&self, sta: &str, phase: &str) -> Option<AzShEntry> {
        let wildcard = self.entries.get(WILDCARD);
        let phases = self.entries.get(sta).or(wildcard)?;
        phases
            .get(phase)
            .or_else(|| phases.get(WILDCARD))
            .or_else(|| wildcard.and_then(|w| w.get(phase)))
            .or_else(|| wildcard.and_then(|w| w.get(WILDCARD)))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for AzShUncertaintyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# station phase slo_unc (s/dg) az_unc (dg)")?;
        for (sta, phases) in &self.entries {
            for (phase, entry) in phases {
                writeln!(
                    f,
                    "{:<6} {:<6} {:>6.2} {:>6.2}",
                    sta, phase, entry.slowness_s_per_deg, entry.azimuth_deg
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORDS: &str = "\
# station phase slo_unc (s/dg) az_unc (dg)
* * 0.31 2.1
* P 0.30 2.0

QSPA * 0.50 5.0
WRA P 0.55 5.5
";

    fn table() -> AzShUncertaintyTable {
        AzShUncertaintyTable::parse(RECORDS, "records").unwrap()
    }

    #[test]
    fn test_lookup_order() {
        let table = table();
        assert_eq!(table.len(), 4);

        let exact = table.lookup("WRA", "P").unwrap();
        assert_eq!(exact.slowness_s_per_deg, 0.55);
        assert_eq!(exact.azimuth_deg, 5.5);

        // station row set, phase wildcard
        assert_eq!(table.lookup("QSPA", "Lg").unwrap().azimuth_deg, 5.0);
        // known station without a matching row falls back to the "*" station
        assert_eq!(table.lookup("WRA", "Pn").unwrap().azimuth_deg, 2.1);
        // unknown station uses the "*" rows
        assert_eq!(table.lookup("ASAR", "P").unwrap().azimuth_deg, 2.0);
        assert_eq!(table.lookup("ASAR", "Sn").unwrap().slowness_s_per_deg, 0.31);
    }

    #[test]
    fn test_empty_table_has_no_entries() {
        let table = AzShUncertaintyTable::default();
        assert!(table.is_empty());
        assert_eq!(table.lookup("WRA", "P"), None);
    }

    #[test]
    fn test_missing_default_row() {
        let err = AzShUncertaintyTable::parse("WRA P 0.55 5.5\n", "records").unwrap_err();
        assert!(matches!(err, UncertaintyError::MissingDefaultEntry { .. }));
    }

    #[test]
    fn test_malformed_lines_name_line_number() {
        let err = AzShUncertaintyTable::parse("* * 0.5 5.0\nWRA P 0.55\n", "records").unwrap_err();
        match err {
            UncertaintyError::TableParse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {:?}", other),
        }

        let err = AzShUncertaintyTable::parse("* * 0.5 wide\n", "records").unwrap_err();
        assert!(err.to_string().contains("'wide' is not a number"));
    }

    #[test]
    fn test_display_reparses() {
        let table = table();
        let text = table.to_string();
        assert!(text.starts_with("# station phase slo_unc (s/dg) az_unc (dg)\n"));
        assert!(text.contains("WRA    P        0.55   5.50"));
        assert_eq!(AzShUncertaintyTable::parse(&text, "rendered").unwrap(), table);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AzShUncertaintyTable::load(Path::new("/no/such/azsh.dat")).unwrap_err();
        assert!(matches!(err, UncertaintyError::TableIo { .. }));
    }
}
