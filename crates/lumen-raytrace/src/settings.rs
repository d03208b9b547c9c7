//! Acceleration structure configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, TraceError};

/// Tuning parameters for parallel BVH construction.
///
/// These only change how work is spread over the pool. Any combination of
/// values yields a structure answering every query identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Ranges with at most this many primitives are always built on the
    /// worker that reached them.
    pub min_primitives_for_threading: usize,
    /// Fewest workers that must be assigned to a range before its own
    /// bounds and SAH buckets are computed by several workers at once.
    pub min_workers_for_data_parallel: usize,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            min_primitives_for_threading: 10_000,
            min_workers_for_data_parallel: 2,
        }
    }
}

impl BuildSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.min_workers_for_data_parallel < 2 {
            return Err(TraceError::InvalidSettings(
                "min_workers_for_data_parallel must be at least 2".into(),
            ));
        }
        Ok(())
    }
}

/// Which acceleration structure to build over a scene's primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    /// Bounding volume hierarchy.
    Bvh,
    /// Whatever the renderer considers the best general choice.
    #[default]
    Default,
}

impl FromStr for StructureKind {
    type Err = TraceError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bvh" => Ok(Self::Bvh),
            "default" => Ok(Self::Default),
            other => Err(TraceError::UnknownStructure(other.to_string())),
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bvh => f.write_str("bvh"),
            Self::Default => f.write_str("default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        assert!(BuildSettings::default().validate().is_ok());
    }

    #[test]
    fn test_single_worker_data_parallel_rejected() {
        let settings = BuildSettings {
            min_workers_for_data_parallel: 1,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(TraceError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_settings_from_partial_toml() {
        let settings: BuildSettings = toml::from_str("min_primitives_for_threading = 64").unwrap();
        assert_eq!(settings.min_primitives_for_threading, 64);
        assert_eq!(settings.min_workers_for_data_parallel, 2);
    }

    #[test]
    fn test_structure_kind_from_str() {
        assert_eq!("bvh".parse::<StructureKind>().unwrap(), StructureKind::Bvh);
        assert_eq!(
            "default".parse::<StructureKind>().unwrap(),
            StructureKind::Default
        );
        let err = "octree".parse::<StructureKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown intersection structure type: octree");
    }

    #[test]
    fn test_structure_kind_roundtrips_through_display() {
        for kind in [StructureKind::Bvh, StructureKind::Default] {
            assert_eq!(kind.to_string().parse::<StructureKind>().unwrap(), kind);
        }
    }
}
