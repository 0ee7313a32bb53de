//! Choosing the uncertainty models from configuration.

use crate::error::UncertaintyError;
use crate::table::AzShUncertaintyTable;
use rstt_core::{ConfigError, Properties};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Keys naming the travel-time uncertainty type, first present wins.
pub const TYPE_KEYS: [&str; 3] = [
    "rsttTTUncertaintyType",
    "slbmTTUncertaintyType",
    "slbmUncertaintyType",
];

/// Keys naming the azimuth/slowness uncertainty file, first present wins.
pub const AZSH_FILE_KEYS: [&str; 2] = ["slbmAzSloUncertaintyFile", "AzSloUncertaintyFile"];

/// File looked up when the configured path is a directory.
pub const AZSH_FILE_NAME: &str = "azimuth_slowness_uncertainty.dat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UncertaintyType {
    DistanceDependent,
    PathDependent,
    HierarchicalDistanceDependent,
    HierarchicalPathDependent,
}

impl UncertaintyType {
    pub const ALL: [UncertaintyType; 4] = [
        UncertaintyType::DistanceDependent,
        UncertaintyType::PathDependent,
        UncertaintyType::HierarchicalDistanceDependent,
        UncertaintyType::HierarchicalPathDependent,
    ];

    /// Classify free text such as "distance_dependent" or
    /// "Hierarchical Path". Exactly one of "distance" and "path" must
    /// appear; "hierarchical" is optional. Case is ignored.
    pub fn classify(raw: &str) -> Result<Self, UncertaintyError> {
        let text = raw.to_lowercase();
        let hierarchical = text.contains("hierarchical");
        let distance = text.contains("distance");
        let path = text.contains("path");

        match (hierarchical, distance, path) {
            (false, true, false) => Ok(UncertaintyType::DistanceDependent),
            (false, false, true) => Ok(UncertaintyType::PathDependent),
            (true, true, false) => Ok(UncertaintyType::HierarchicalDistanceDependent),
            (true, false, true) => Ok(UncertaintyType::HierarchicalPathDependent),
            _ => Err(UncertaintyError::InvalidType {
                value: raw.to_string(),
            }),
        }
    }

    pub fn from_properties(properties: &Properties) -> Result<Self, UncertaintyError> {
        let (_, raw) = properties
            .get_first(&TYPE_KEYS)
            .ok_or_else(|| ConfigError::missing(&TYPE_KEYS))?;
        Self::classify(raw)
    }

    pub fn name(&self) -> &'static str {
        match self {
            UncertaintyType::DistanceDependent => "DistanceDependent",
            UncertaintyType::PathDependent => "PathDependent",
            UncertaintyType::HierarchicalDistanceDependent => "HierarchicalDistanceDependent",
            UncertaintyType::HierarchicalPathDependent => "HierarchicalPathDependent",
        }
    }

    pub fn is_hierarchical(&self) -> bool {
        matches!(
            self,
            UncertaintyType::HierarchicalDistanceDependent | UncertaintyType::HierarchicalPathDependent
        )
    }

    /// The non-hierarchical model this type falls back to. The hierarchy
    /// itself is resolved by the caller.
    pub fn base(&self) -> Self {
        match self {
            UncertaintyType::DistanceDependent | UncertaintyType::HierarchicalDistanceDependent => {
                UncertaintyType::DistanceDependent
            }
            UncertaintyType::PathDependent | UncertaintyType::HierarchicalPathDependent => {
                UncertaintyType::PathDependent
            }
        }
    }

    pub fn is_distance_dependent(&self) -> bool {
        self.base() == UncertaintyType::DistanceDependent
    }
}

impl fmt::Display for UncertaintyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UncertaintyType {
    type Err = UncertaintyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::classify(s)
    }
}

/// Where azimuth and slowness uncertainties come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AzShSource {
    /// Not configured: an empty table, every lookup falls through to the
    /// built-in values.
    #[default]
    Default,
    /// Configured as "null": no table at all.
    Disabled,
    File(PathBuf),
}

impl AzShSource {
    pub fn from_properties(properties: &Properties) -> Self {
        match properties.get_first(&AZSH_FILE_KEYS) {
            None => AzShSource::Default,
            Some((_, value)) if value.eq_ignore_ascii_case("null") => AzShSource::Disabled,
            Some((_, value)) => AzShSource::File(resolve_table_path(Path::new(value))),
        }
    }

    /// Load the table this source names. `Ok(None)` when disabled.
    pub fn load_table(&self) -> Result<Option<AzShUncertaintyTable>, UncertaintyError> {
        match self {
            AzShSource::Default => Ok(Some(AzShUncertaintyTable::default())),
            AzShSource::Disabled => Ok(None),
            AzShSource::File(path) => AzShUncertaintyTable::load(path).map(Some),
        }
    }

    /// Human-readable name of the model file.
    pub fn describe(&self) -> String {
        match self {
            AzShSource::Default => "built-in".to_string(),
            AzShSource::Disabled => "null".to_string(),
            AzShSource::File(path) => path.display().to_string(),
        }
    }
}

fn resolve_table_path(path: &Path) -> PathBuf {
    let nested = path.join(AZSH_FILE_NAME);
    if path.is_dir() && nested.exists() {
        nested
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        let cases = [
            ("Hierarchical_Distance_Dependent", UncertaintyType::HierarchicalDistanceDependent),
            ("PATH dependent", UncertaintyType::PathDependent),
            ("distance_dependent", UncertaintyType::DistanceDependent),
            ("hierarchical path", UncertaintyType::HierarchicalPathDependent),
        ];
        for (raw, expected) in cases {
            assert_eq!(UncertaintyType::classify(raw).unwrap(), expected, "{}", raw);
        }
    }

    #[test]
    fn test_classify_rejects_ambiguous() {
        for raw in ["distance path", "nonsense", "", "hierarchical"] {
            let err = UncertaintyType::classify(raw).unwrap_err();
            let message = err.to_string();
            assert!(message.contains("HierarchicalPathDependent"), "{}", message);
            assert!(message.contains("DistanceDependent"), "{}", message);
        }
    }

    #[test]
    fn test_base_and_hierarchy() {
        assert_eq!(
            UncertaintyType::HierarchicalPathDependent.base(),
            UncertaintyType::PathDependent
        );
        assert!(UncertaintyType::HierarchicalDistanceDependent.is_distance_dependent());
        assert!(!UncertaintyType::PathDependent.is_hierarchical());
        assert_eq!(
            "HierarchicalDistanceDependent".parse::<UncertaintyType>().unwrap(),
            UncertaintyType::HierarchicalDistanceDependent
        );
    }

    #[test]
    fn test_type_from_properties_key_order() {
        let props = Properties::from_pairs([
            ("slbmUncertaintyType", "path_dependent"),
            ("slbmTTUncertaintyType", "distance_dependent"),
        ]);
        assert_eq!(
            UncertaintyType::from_properties(&props).unwrap(),
            UncertaintyType::DistanceDependent
        );

        let err = UncertaintyType::from_properties(&Properties::new()).unwrap_err();
        assert!(matches!(err, UncertaintyError::Config(ConfigError::Missing { .. })));
    }

    #[test]
    fn test_azsh_source_states() {
        assert_eq!(AzShSource::from_properties(&Properties::new()), AzShSource::Default);

        let props = Properties::from_pairs([("slbmAzSloUncertaintyFile", "NULL")]);
        assert_eq!(AzShSource::from_properties(&props), AzShSource::Disabled);
        assert_eq!(AzShSource::Disabled.load_table().unwrap(), None);

        let props = Properties::from_pairs([("AzSloUncertaintyFile", "/data/azsh.dat")]);
        assert_eq!(
            AzShSource::from_properties(&props),
            AzShSource::File(PathBuf::from("/data/azsh.dat"))
        );

        let table = AzShSource::Default.load_table().unwrap().unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_azsh_directory_resolves_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(AZSH_FILE_NAME);
        std::fs::write(&file, "* * 0.5 5.0\n").unwrap();

        let props = Properties::from_pairs([(
            "slbmAzSloUncertaintyFile",
            dir.path().to_string_lossy().into_owned(),
        )]);
        let source = AzShSource::from_properties(&props);
        assert_eq!(source, AzShSource::File(file));
        assert!(source.load_table().unwrap().is_some());
    }
}
