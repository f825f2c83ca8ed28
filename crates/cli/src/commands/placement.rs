//! Cluster placement views and the recommendation preview

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use colored::Colorize;
use console_lib::{ClusterPlacement, DataSyncStore, PlacementVariant};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_info, print_table, OutputFormat};

/// Row for a single placement snapshot
#[derive(Tabled, Serialize)]
struct NodeRow {
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Instance type")]
    instance_type: String,
    #[tabled(rename = "Services")]
    services: String,
}

/// Row for the current-vs-recommended preview
#[derive(Tabled, Serialize)]
struct PreviewRow {
    #[tabled(rename = "Node")]
    node: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Recommended")]
    recommended: String,
    #[tabled(rename = "Change")]
    change: String,
}

/// Show one placement snapshot
pub async fn show_placement(
    store: &DataSyncStore,
    recommended: bool,
    format: OutputFormat,
) -> Result<()> {
    let variant = if recommended {
        PlacementVariant::Recommended
    } else {
        PlacementVariant::Current
    };

    let placement = store
        .placement(variant)
        .await
        .context("failed to load the cluster placement")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&placement)?);
        }
        OutputFormat::Table => {
            if let Some(name) = &placement.name {
                print_info(&format!("Deployment: {}", name.bold()));
            }
            let rows: Vec<NodeRow> = placement
                .cluster_definition
                .nodes
                .iter()
                .map(|node| NodeRow {
                    node: node.id.to_string(),
                    instance_type: node.instance_type.clone(),
                    services: join_or_dash(&placement.services_on(node.id)),
                })
                .collect();
            print_table(&rows, format);
        }
    }

    Ok(())
}

/// Preview the recommended placement against the current one
pub async fn preview(store: &DataSyncStore, format: OutputFormat) -> Result<()> {
    let current = store
        .placement(PlacementVariant::Current)
        .await
        .context("failed to load the current placement")?;
    let recommended = store
        .placement(PlacementVariant::Recommended)
        .await
        .context("failed to load the recommended placement")?;

    match format {
        OutputFormat::Json => {
            let both = serde_json::json!({
                "current": current,
                "recommended": recommended,
            });
            println!("{}", serde_json::to_string_pretty(&both)?);
        }
        OutputFormat::Table => {
            let rows = preview_rows(&current, &recommended);
            print_table(&rows, format);
        }
    }

    Ok(())
}

fn preview_rows(current: &ClusterPlacement, recommended: &ClusterPlacement) -> Vec<PreviewRow> {
    let node_ids: BTreeSet<u32> = current
        .node_ids()
        .into_iter()
        .chain(recommended.node_ids())
        .collect();

    node_ids
        .into_iter()
        .map(|id| {
            let before: BTreeSet<&str> = current.services_on(id).into_iter().collect();
            let after: BTreeSet<&str> = recommended.services_on(id).into_iter().collect();

            let mut changes = Vec::new();
            for added in after.difference(&before) {
                changes.push(format!("+{}", added).green().to_string());
            }
            for removed in before.difference(&after) {
                changes.push(format!("-{}", removed).red().to_string());
            }

            PreviewRow {
                node: id.to_string(),
                current: join_or_dash(&before.iter().copied().collect::<Vec<_>>()),
                recommended: join_or_dash(&after.iter().copied().collect::<Vec<_>>()),
                change: if changes.is_empty() {
                    "unchanged".dimmed().to_string()
                } else {
                    changes.join(" ")
                },
            }
        })
        .collect()
}

fn join_or_dash(services: &[&str]) -> String {
    if services.is_empty() {
        "-".to_string()
    } else {
        services.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use console_lib::{ClusterDefinition, NodeDefinition, NodeMapping};

    fn placement(mappings: &[(u32, &str)]) -> ClusterPlacement {
        let nodes = mappings
            .iter()
            .map(|(id, _)| *id)
            .collect::<BTreeSet<u32>>()
            .into_iter()
            .map(|id| NodeDefinition {
                id,
                instance_type: "m4.large".to_string(),
            })
            .collect();
        ClusterPlacement {
            name: None,
            cluster_definition: ClusterDefinition { nodes },
            node_mapping: mappings
                .iter()
                .map(|(id, task)| NodeMapping {
                    id: *id,
                    task: task.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_preview_covers_nodes_from_both_snapshots() {
        colored::control::set_override(false);
        let current = placement(&[(1, "redis-server")]);
        let recommended = placement(&[(2, "redis-server")]);

        let rows = preview_rows(&current, &recommended);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].node, "1");
        assert_eq!(rows[0].current, "redis-server");
        assert_eq!(rows[0].change, "-redis-server");
        assert_eq!(rows[1].node, "2");
        assert_eq!(rows[1].change, "+redis-server");
        colored::control::unset_override();
    }

    #[test]
    fn test_preview_marks_unchanged_nodes() {
        colored::control::set_override(false);
        let current = placement(&[(1, "redis-server")]);
        let rows = preview_rows(&current, &current);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].change, "unchanged");
        colored::control::unset_override();
    }
}
