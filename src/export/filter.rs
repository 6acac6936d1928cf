//! Layer exclusion by name pattern
//!
//! Topology and validation tooling leaves auxiliary layers (errors, dirty
//! areas, rules, fixes) next to the real data. They are dropped from
//! exports by case-insensitive glob matching on the layer name.

use crate::error::{ConfigError, ExportError, ExportResult};
use crate::gdb::GeodatabaseReader;
use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Patterns always applied; user patterns are added on top
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "*topology*",
    "*topo*",
    "*_dirty*",
    "*_err*",
    "*_fix*",
    "*_rule*",
    "*_valid*",
    "*_check*",
    "*_correction*",
];

/// Runs of `*`; glob only accepts `**` as a whole path component
static STAR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{2,}").expect("Invalid star run regex"));

/// Patterns and names are lowercased before matching, which covers
/// non-ASCII letters the glob crate only compares exactly
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compiled set of exclusion patterns
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<Pattern>,
}

impl ExclusionFilter {
    /// Filter with only the default topology patterns
    pub fn with_defaults() -> Self {
        let patterns = DEFAULT_EXCLUDE_PATTERNS
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();
        Self { patterns }
    }

    /// Default patterns plus `extra`
    pub fn with_extra<I, S>(extra: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::with_defaults();
        for pattern in extra {
            filter.add(pattern.as_ref())?;
        }
        Ok(filter)
    }

    /// Compile and append one pattern; blank patterns are ignored
    pub fn add(&mut self, pattern: &str) -> Result<(), ConfigError> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Ok(());
        }

        let normalized = STAR_RUN.replace_all(pattern, "*").to_lowercase();
        let compiled = Pattern::new(&normalized).map_err(|e| ConfigError::InvalidExcludePattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.patterns.push(compiled);
        Ok(())
    }

    /// Check if a layer name matches any pattern
    pub fn is_excluded(&self, layer: &str) -> bool {
        let layer = layer.to_lowercase();
        self.patterns
            .iter()
            .any(|p| p.matches_with(&layer, MATCH_OPTIONS))
    }

    /// Split layer names into kept and excluded, preserving order
    pub fn partition(&self, layers: Vec<String>) -> LayerSelection {
        let (excluded, kept) = layers
            .into_iter()
            .partition(|name| self.is_excluded(name));
        LayerSelection { kept, excluded }
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Result of filtering the layer list of one container
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSelection {
    /// Layers to export, in listing order
    pub kept: Vec<String>,

    /// Layers dropped by a pattern, in listing order
    pub excluded: Vec<String>,
}

/// List the layers of `gdb` and apply `filter`
///
/// Fails when the container cannot be listed, has no layers, or when every
/// layer is excluded.
pub fn select_layers<R: GeodatabaseReader + ?Sized>(
    reader: &R,
    gdb: &Path,
    filter: &ExclusionFilter,
) -> ExportResult<LayerSelection> {
    let layers = reader
        .list_layers(gdb)
        .map_err(|e| ExportError::ListLayers {
            path: gdb.to_path_buf(),
            reason: e.to_string(),
        })?;

    info!(total = layers.len(), "Listed layers");
    if layers.is_empty() {
        return Err(ExportError::NoLayers {
            path: gdb.to_path_buf(),
        });
    }

    let selection = filter.partition(layers);
    for name in &selection.excluded {
        debug!(layer = %name, "Excluded by pattern");
    }

    if selection.kept.is_empty() {
        return Err(ExportError::AllLayersExcluded {
            path: gdb.to_path_buf(),
            excluded: selection.excluded.len(),
        });
    }

    info!(
        kept = selection.kept.len(),
        excluded = selection.excluded.len(),
        "Filtered layers"
    );
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gdb::{MemoryGdb, MemoryLayer, MemoryReader};

    #[test]
    fn test_defaults_compile() {
        assert_eq!(
            ExclusionFilter::with_defaults().patterns.len(),
            DEFAULT_EXCLUDE_PATTERNS.len()
        );
    }

    #[test]
    fn test_topology_case_insensitive() {
        let filter = ExclusionFilter::with_defaults();
        for name in ["Topology_Errors", "TOPOLOGY_ERRORS", "topology_errors", "tOpOlOgY_eRrOrS"] {
            assert!(filter.is_excluded(name), "{} should be excluded", name);
        }
    }

    #[test]
    fn test_non_ascii_names_case_insensitive() {
        let filter = ExclusionFilter::with_extra(["*_revisión*"]).unwrap();
        assert!(filter.is_excluded("calles_revisión"));
        assert!(filter.is_excluded("CALLES_REVISIÓN"));
        assert!(filter.is_excluded("Calles_Revisión_2024"));
        assert!(!filter.is_excluded("calles"));

        let filter = ExclusionFilter::with_extra(["ÁREAS_*"]).unwrap();
        assert!(filter.is_excluded("áreas_verdes"));
    }

    #[test]
    fn test_double_star_matches_like_single() {
        let filter = ExclusionFilter::with_extra(["**_tmp", "a***b"]).unwrap();
        assert!(filter.is_excluded("roads_tmp"));
        assert!(filter.is_excluded("Parcels_TMP"));
        assert!(filter.is_excluded("a_long_b"));
        assert!(!filter.is_excluded("roads"));
    }

    #[test]
    fn test_dirty_pattern() {
        let filter = ExclusionFilter::with_defaults();
        assert!(filter.is_excluded("Roads_Dirty"));
        assert!(filter.is_excluded("Roads_dirty_areas"));
        assert!(!filter.is_excluded("Roads"));
        assert!(!filter.is_excluded("Parcels"));
    }

    #[test]
    fn test_extra_patterns_are_additive() {
        let filter = ExclusionFilter::with_extra(["tmp_*"]).unwrap();
        assert_eq!(filter.patterns.len(), DEFAULT_EXCLUDE_PATTERNS.len() + 1);
        assert!(filter.is_excluded("TMP_buffer"));
        assert!(filter.is_excluded("Roads_Rule_1"));
        assert!(!filter.is_excluded("buffer"));
    }

    #[test]
    fn test_blank_extra_pattern_ignored() {
        let filter = ExclusionFilter::with_extra(["  ", ""]).unwrap();
        assert_eq!(filter.patterns.len(), DEFAULT_EXCLUDE_PATTERNS.len());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ExclusionFilter::with_extra(["[abc"]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExcludePattern { .. }));
    }

    #[test]
    fn test_partition_preserves_order() {
        let filter = ExclusionFilter::with_defaults();
        let selection = filter.partition(vec![
            "Roads".into(),
            "Roads_Dirty".into(),
            "Parcels".into(),
            "Net_Topology".into(),
        ]);
        assert_eq!(selection.kept, vec!["Roads", "Parcels"]);
        assert_eq!(selection.excluded, vec!["Roads_Dirty", "Net_Topology"]);
    }

    #[test]
    fn test_select_layers_errors_are_distinct() {
        let reader = MemoryReader::new()
            .with_gdb("/x/empty.gdb", MemoryGdb::new())
            .with_gdb(
                "/x/topo.gdb",
                MemoryGdb::new()
                    .layer(MemoryLayer::new("Topology"))
                    .layer(MemoryLayer::new("Roads_Err")),
            )
            .with_gdb("/x/broken.gdb", MemoryGdb::new().unreadable());
        let filter = ExclusionFilter::with_defaults();

        let err = select_layers(&reader, Path::new("/x/empty.gdb"), &filter).unwrap_err();
        assert!(matches!(err, ExportError::NoLayers { .. }));

        let err = select_layers(&reader, Path::new("/x/topo.gdb"), &filter).unwrap_err();
        assert!(matches!(err, ExportError::AllLayersExcluded { excluded: 2, .. }));

        let err = select_layers(&reader, Path::new("/x/broken.gdb"), &filter).unwrap_err();
        assert!(matches!(err, ExportError::ListLayers { .. }));
    }
}
