use anyhow::{Context, Result};

use wrapquote_app::{AppConfig, NewClient, NewLineItem, NewProject, ProjectView, QuoteService, TenantContext};
use wrapquote_catalog::EmployeeLevel;
use wrapquote_core::{Quantity, TenantId};
use wrapquote_pricing::LineItemInput;
use wrapquote_projects::ProjectStatus;

/// Walks one sample quote through the full workflow against the seed catalog
/// and prints the project and the portfolio statistics as JSON.
fn main() -> Result<()> {
    wrapquote_observability::init();

    let config = AppConfig::from_env()?;
    let service = QuoteService::in_memory(config)?;
    let ctx = TenantContext::new(TenantId::new());

    let material = service
        .catalog()
        .material_by_name("Alltak Premium")
        .context("seed catalog has no Alltak Premium")?
        .id_typed();
    let difficulty = service
        .catalog()
        .difficulty_by_level("2")
        .context("seed catalog has no level 2 difficulty")?
        .id_typed();

    let client = service.register_client(
        &ctx,
        NewClient {
            name: "Sample client".to_string(),
            ..NewClient::default()
        },
    )?;

    let project = service.create_project(
        &ctx,
        NewProject {
            client_id: client.id_typed(),
            name: "Kitchen cabinets".to_string(),
            margin_rate: None,
            items: vec![NewLineItem::new(LineItemInput {
                material_id: material,
                difficulty_id: difficulty,
                employee_level: EmployeeLevel::MidWrapper,
                quantity: Quantity::whole(12),
                estimated_days: Quantity::whole(2),
                crew_size: 2,
            })
            .with_notes("doors and side panels")],
        },
    )?;

    service.transition_status(&ctx, project.id_typed(), ProjectStatus::Sent)?;
    let project = service.transition_status(&ctx, project.id_typed(), ProjectStatus::Approved)?;

    println!("{}", serde_json::to_string_pretty(&ProjectView::from(&project))?);
    println!("{}", serde_json::to_string_pretty(&service.portfolio_stats(&ctx)?)?);
    Ok(())
}
