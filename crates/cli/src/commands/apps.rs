//! Application inventory commands

use anyhow::{Context, Result};
use colored::Colorize;
use console_lib::DataSyncStore;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for the app inventory table
#[derive(Tabled, Serialize)]
struct AppRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    app_type: String,
    #[tabled(rename = "Services")]
    services: String,
}

/// List every application known to the platform
pub async fn list_apps(store: &DataSyncStore, format: OutputFormat) -> Result<()> {
    let inventory = store
        .list_apps()
        .await
        .context("failed to load the app inventory")?;

    match format {
        OutputFormat::Json => {
            let entries: serde_json::Map<String, serde_json::Value> = inventory
                .iter()
                .map(|(id, app)| (id.clone(), serde_json::to_value(app).unwrap_or_default()))
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Table => {
            let rows: Vec<AppRow> = inventory
                .iter()
                .map(|(id, app)| AppRow {
                    id: id.clone(),
                    name: app.name.clone().unwrap_or_else(|| "-".to_string()),
                    app_type: app.app_type.clone().unwrap_or_else(|| "-".to_string()),
                    services: app
                        .service_names
                        .as_ref()
                        .map(|s| s.len().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            print_table(&rows, format);
            println!("\nTotal: {} apps", inventory.len());
        }
    }

    Ok(())
}

/// Show one application in detail
pub async fn show_app(store: &DataSyncStore, app_id: &str, format: OutputFormat) -> Result<()> {
    let app = store
        .app(app_id)
        .await
        .with_context(|| format!("failed to load app {}", app_id))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&app)?);
        }
        OutputFormat::Table => {
            println!(
                "{} {}",
                app.name.as_deref().unwrap_or("(unnamed)").bold(),
                format!("[{}]", app_id).dimmed()
            );
            println!("Type: {}", app.app_type.as_deref().unwrap_or("-"));
            match &app.service_names {
                Some(services) if !services.is_empty() => {
                    println!("Services:");
                    for service in services {
                        println!("  - {}", service);
                    }
                }
                _ => println!("Services: none reported"),
            }
        }
    }

    Ok(())
}
