//! Typed records for the analysis platform's REST resources
//!
//! Each record mirrors one wire shape from the platform API. Apps are the
//! only kind that supports partial payloads: a list fetch may carry a
//! subset of the fields a detail fetch carries, so the app record is
//! updated through an explicit merge patch instead of wholesale
//! replacement. Every other kind is immutable once fetched.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Application inventory entry.
///
/// Fields are optional because list payloads may omit what only the
/// detail endpoint provides. Merging a patch fills fields in without
/// erasing what an earlier fetch already established.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_names: Option<BTreeSet<String>>,
}

/// Partial app payload as returned by the list and detail endpoints.
///
/// Unknown fields in the response are ignored; absent fields stay `None`
/// and leave the corresponding record field untouched on merge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub app_type: Option<String>,
    #[serde(default)]
    pub service_names: Option<BTreeSet<String>>,
}

impl AppSummary {
    /// Field-wise shallow merge: fields the patch carries win, fields the
    /// patch omits survive unchanged. Returns a new record; the receiver
    /// is never mutated in place.
    pub fn merged(&self, patch: &AppPatch) -> AppSummary {
        AppSummary {
            name: patch.name.clone().or_else(|| self.name.clone()),
            app_type: patch.app_type.clone().or_else(|| self.app_type.clone()),
            service_names: patch
                .service_names
                .clone()
                .or_else(|| self.service_names.clone()),
        }
    }

    /// True once the record carries the detail fields, not just the
    /// subset a list payload may provide.
    pub fn has_detail(&self) -> bool {
        self.app_type.is_some()
    }
}

/// One calibration measurement at a fixed load intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationSample {
    pub load_intensity: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// Calibration curve for one app, plus the intensity the calibration
/// settled on. Replaced wholesale on refetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationResult {
    pub test_result: Vec<CalibrationSample>,
    pub final_intensity: f64,
}

/// One profiling measurement at a fixed intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilingSample {
    pub intensity: f64,
    pub mean: f64,
    pub percentile_10: f64,
    pub percentile_90: f64,
}

/// Profiling curves for one (app, service) pair, one sample series per
/// benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilingResult {
    pub slo_metric: String,
    pub test_result: BTreeMap<String, Vec<ProfilingSample>>,
}

/// Interference scores for one (app, service) pair.
///
/// `benchmark` and `score` are parallel sequences; scores range 0-100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterferenceResult {
    pub benchmark: Vec<String>,
    pub score: Vec<f64>,
}

/// A node in the cluster definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    pub id: u32,
    pub instance_type: String,
}

/// The set of nodes a placement snapshot covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDefinition {
    pub nodes: Vec<NodeDefinition>,
}

/// One service task assigned to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMapping {
    pub id: u32,
    pub task: String,
}

/// Snapshot of node-to-service assignments. Two variants exist on the
/// wire, the current placement and the recommended one; they occupy
/// separate cache slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterPlacement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub cluster_definition: ClusterDefinition,
    pub node_mapping: Vec<NodeMapping>,
}

impl ClusterPlacement {
    /// Service tasks mapped onto the given node, in mapping order.
    pub fn services_on(&self, node_id: u32) -> Vec<&str> {
        self.node_mapping
            .iter()
            .filter(|m| m.id == node_id)
            .map(|m| m.task.as_str())
            .collect()
    }

    /// Node ids covered by this snapshot, in definition order.
    pub fn node_ids(&self) -> Vec<u32> {
        self.cluster_definition.nodes.iter().map(|n| n.id).collect()
    }
}

/// Tagged value held in a cache slot, one variant per resource kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceValue {
    App(AppSummary),
    Calibration(CalibrationResult),
    Profiling(ProfilingResult),
    Interference(InterferenceResult),
    Placement(ClusterPlacement),
}

impl ResourceValue {
    pub fn as_app(&self) -> Option<&AppSummary> {
        match self {
            Self::App(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_calibration(&self) -> Option<&CalibrationResult> {
        match self {
            Self::Calibration(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_profiling(&self) -> Option<&ProfilingResult> {
        match self {
            Self::Profiling(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_interference(&self) -> Option<&InterferenceResult> {
        match self {
            Self::Interference(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_placement(&self) -> Option<&ClusterPlacement> {
        match self {
            Self::Placement(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_fills_missing_fields() {
        let cached = AppSummary {
            name: Some("Redis".to_string()),
            ..Default::default()
        };
        let patch = AppPatch {
            app_type: Some("workload".to_string()),
            ..Default::default()
        };

        let merged = cached.merged(&patch);
        assert_eq!(merged.name.as_deref(), Some("Redis"));
        assert_eq!(merged.app_type.as_deref(), Some("workload"));
        assert!(merged.service_names.is_none());
    }

    #[test]
    fn test_merge_patch_fields_win() {
        let cached = AppSummary {
            name: Some("old-name".to_string()),
            app_type: Some("workload".to_string()),
            service_names: None,
        };
        let patch = AppPatch {
            name: Some("new-name".to_string()),
            ..Default::default()
        };

        let merged = cached.merged(&patch);
        assert_eq!(merged.name.as_deref(), Some("new-name"));
        assert_eq!(merged.app_type.as_deref(), Some("workload"));
    }

    #[test]
    fn test_merge_does_not_mutate_receiver() {
        let cached = AppSummary {
            name: Some("Redis".to_string()),
            ..Default::default()
        };
        let patch = AppPatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };

        let _ = cached.merged(&patch);
        assert_eq!(cached.name.as_deref(), Some("Redis"));
    }

    #[test]
    fn test_has_detail() {
        let mut app = AppSummary {
            name: Some("Redis".to_string()),
            ..Default::default()
        };
        assert!(!app.has_detail());

        app.app_type = Some("workload".to_string());
        assert!(app.has_detail());
    }

    #[test]
    fn test_app_patch_wire_shape() {
        let patch: AppPatch = serde_json::from_str(
            r#"{"name":"Redis","type":"workload","serviceNames":["redis-server","redis-proxy"]}"#,
        )
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Redis"));
        assert_eq!(patch.app_type.as_deref(), Some("workload"));
        let services = patch.service_names.unwrap();
        assert!(services.contains("redis-server"));
        assert!(services.contains("redis-proxy"));
    }

    #[test]
    fn test_calibration_wire_shape() {
        let result: CalibrationResult = serde_json::from_str(
            r#"{"testResult":[{"loadIntensity":10,"mean":100,"min":90,"max":110}],"finalIntensity":15}"#,
        )
        .unwrap();

        assert_eq!(result.test_result.len(), 1);
        assert_eq!(result.test_result[0].load_intensity, 10.0);
        assert_eq!(result.final_intensity, 15.0);
    }

    #[test]
    fn test_profiling_wire_shape() {
        let result: ProfilingResult = serde_json::from_str(
            r#"{"sloMetric":"latency_p95","testResult":{"cpu-cache":[{"intensity":25,"mean":1.5,"percentile_10":1.1,"percentile_90":2.0}]}}"#,
        )
        .unwrap();

        assert_eq!(result.slo_metric, "latency_p95");
        let samples = &result.test_result["cpu-cache"];
        assert_eq!(samples[0].percentile_90, 2.0);
    }

    #[test]
    fn test_placement_services_on() {
        let placement: ClusterPlacement = serde_json::from_str(
            r#"{
                "clusterDefinition": {"nodes": [
                    {"id": 1, "instanceType": "m4.large"},
                    {"id": 2, "instanceType": "m4.xlarge"}
                ]},
                "nodeMapping": [
                    {"id": 1, "task": "redis-server"},
                    {"id": 1, "task": "redis-proxy"},
                    {"id": 2, "task": "spark-worker"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(placement.node_ids(), vec![1, 2]);
        assert_eq!(placement.services_on(1), vec!["redis-server", "redis-proxy"]);
        assert_eq!(placement.services_on(2), vec!["spark-worker"]);
        assert!(placement.services_on(3).is_empty());
    }
}
