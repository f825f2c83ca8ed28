//! Cache slot addressing
//!
//! A slot is addressed by a resource kind plus a string key. Composite
//! keys join their identifying fields with a fixed separator: an app id
//! alone selects app and calibration slots, `appId:serviceName` selects
//! profiling and interference slots, and the placement variant name
//! selects one of the two cluster snapshots.

use std::fmt;

/// Separator joining the fields of a composite key.
pub const KEY_SEPARATOR: char = ':';

/// Logical category of server data held in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    App,
    Calibration,
    Profiling,
    Interference,
    Placement,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::App => "app",
            ResourceKind::Calibration => "calibration",
            ResourceKind::Profiling => "profiling",
            ResourceKind::Interference => "interference",
            ResourceKind::Placement => "placement",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which cluster placement snapshot a slot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementVariant {
    Current,
    Recommended,
}

impl PlacementVariant {
    /// Cache key for this variant.
    pub fn key(&self) -> &'static str {
        match self {
            PlacementVariant::Current => "current",
            PlacementVariant::Recommended => "recommended",
        }
    }

    /// API path serving this variant.
    pub fn path(&self) -> &'static str {
        match self {
            PlacementVariant::Current => "/api/cluster",
            PlacementVariant::Recommended => "/api/cluster/recommended",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "current" => Some(PlacementVariant::Current),
            "recommended" => Some(PlacementVariant::Recommended),
            _ => None,
        }
    }
}

/// Fully qualified cache slot address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub kind: ResourceKind,
    pub key: String,
}

impl SlotKey {
    pub fn new(kind: ResourceKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    pub fn app(app_id: &str) -> Self {
        Self::new(ResourceKind::App, app_id)
    }

    pub fn calibration(app_id: &str) -> Self {
        Self::new(ResourceKind::Calibration, app_id)
    }

    pub fn profiling(app_id: &str, service: &str) -> Self {
        Self::new(ResourceKind::Profiling, composite(app_id, service))
    }

    pub fn interference(app_id: &str, service: &str) -> Self {
        Self::new(ResourceKind::Interference, composite(app_id, service))
    }

    pub fn placement(variant: PlacementVariant) -> Self {
        Self::new(ResourceKind::Placement, variant.key())
    }

    /// Split a composite `appId:serviceName` key back into its fields.
    pub fn split_composite(&self) -> Option<(&str, &str)> {
        self.key.split_once(KEY_SEPARATOR)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.key)
    }
}

fn composite(app_id: &str, service: &str) -> String {
    format!("{}{}{}", app_id, KEY_SEPARATOR, service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key_derivation() {
        let slot = SlotKey::profiling("app1", "serviceA");
        assert_eq!(slot.kind, ResourceKind::Profiling);
        assert_eq!(slot.key, "app1:serviceA");
        assert_eq!(slot.split_composite(), Some(("app1", "serviceA")));
    }

    #[test]
    fn test_single_field_keys_have_no_separator() {
        let slot = SlotKey::calibration("app1");
        assert_eq!(slot.key, "app1");
        assert!(slot.split_composite().is_none());
    }

    #[test]
    fn test_placement_variants_key_separately() {
        let current = SlotKey::placement(PlacementVariant::Current);
        let recommended = SlotKey::placement(PlacementVariant::Recommended);
        assert_ne!(current, recommended);
        assert_eq!(PlacementVariant::from_key(&current.key), Some(PlacementVariant::Current));
        assert_eq!(PlacementVariant::from_key("nonsense"), None);
    }

    #[test]
    fn test_display_for_logs() {
        let slot = SlotKey::interference("app1", "serviceB");
        assert_eq!(slot.to_string(), "interference/app1:serviceB");
    }
}
