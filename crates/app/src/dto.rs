use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wrapquote_catalog::{DifficultyId, EmployeeLevel, MaterialId};
use wrapquote_clients::{ClientId, ContactInfo};
use wrapquote_core::{Money, Quantity, Rate};
use wrapquote_pricing::LineItemInput;
use wrapquote_projects::{LineItem, LineItemId, Project, ProjectId, ProjectStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
}

/// One line item as entered by the user; catalog values are resolved by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    #[serde(flatten)]
    pub input: LineItemInput,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewLineItem {
    pub fn new(input: LineItemInput) -> Self {
        Self { input, notes: None }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub client_id: ClientId,
    pub name: String,
    /// Overrides the tenant's configured margin for this project.
    #[serde(default)]
    pub margin_rate: Option<Rate>,
    #[serde(default)]
    pub items: Vec<NewLineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemView {
    pub id: LineItemId,
    pub material_id: MaterialId,
    pub difficulty_id: DifficultyId,
    pub employee_level: EmployeeLevel,
    pub quantity: Quantity,
    pub estimated_days: Quantity,
    pub crew_size: u32,
    pub notes: Option<String>,
    pub material_cost: Money,
    pub labor_cost: Money,
    pub subtotal: Money,
    pub total_cost: Money,
    pub selling_price: Money,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        let input = item.input();
        let costs = item.costs();
        Self {
            id: item.id_typed(),
            material_id: input.material_id,
            difficulty_id: input.difficulty_id,
            employee_level: input.employee_level,
            quantity: input.quantity,
            estimated_days: input.estimated_days,
            crew_size: input.crew_size,
            notes: item.notes().map(str::to_string),
            material_cost: costs.material_cost,
            labor_cost: costs.labor_cost,
            subtotal: costs.subtotal,
            total_cost: costs.total_cost,
            selling_price: costs.selling_price,
        }
    }
}

/// Read-side shape of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectView {
    pub id: ProjectId,
    pub client_id: Option<ClientId>,
    pub name: String,
    pub status: ProjectStatus,
    pub applied_margin: Rate,
    pub tax_rate: Rate,
    pub estimated_total_cost: Money,
    pub suggested_selling_price: Money,
    pub created_at: Option<DateTime<Utc>>,
    pub items: Vec<LineItemView>,
}

impl From<&Project> for ProjectView {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id_typed(),
            client_id: project.client_id(),
            name: project.name().to_string(),
            status: project.status(),
            applied_margin: project.applied_margin(),
            tax_rate: project.pricing().tax_rate,
            estimated_total_cost: project.estimated_total_cost(),
            suggested_selling_price: project.suggested_selling_price(),
            created_at: project.created_at(),
            items: project.items().iter().map(LineItemView::from).collect(),
        }
    }
}
