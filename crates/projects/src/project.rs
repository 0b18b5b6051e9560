use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wrapquote_clients::ClientId;
use wrapquote_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Entity, Money, Rate, TenantId};
use wrapquote_events::Event;
use wrapquote_pricing::{LineItemInput, PricingConfig, ResolvedRates};

use crate::aggregator::{fold_totals, recompute_project};
use crate::lifecycle::decide_transition;
use crate::line_item::{LineItem, LineItemId};
use crate::status::ProjectStatus;

/// Project identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub AggregateId);

impl ProjectId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Project.
///
/// `estimated_total_cost` and `suggested_selling_price` are re-folded from
/// `items` inside every `apply` that touches an item, so they are never stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: ProjectId,
    tenant_id: Option<TenantId>,
    client_id: Option<ClientId>,
    name: String,
    status: ProjectStatus,
    created_at: Option<DateTime<Utc>>,
    pricing: PricingConfig,
    items: Vec<LineItem>,
    estimated_total_cost: Money,
    suggested_selling_price: Money,
    version: u64,
    created: bool,
    deleted: bool,
}

impl Project {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProjectId) -> Self {
        Self {
            id,
            tenant_id: None,
            client_id: None,
            name: String::new(),
            status: ProjectStatus::Draft,
            created_at: None,
            pricing: PricingConfig::default(),
            items: Vec::new(),
            estimated_total_cost: Money::ZERO,
            suggested_selling_price: Money::ZERO,
            version: 0,
            created: false,
            deleted: false,
        }
    }

    pub fn id_typed(&self) -> ProjectId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Pricing context new items are priced with.
    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn applied_margin(&self) -> Rate {
        self.pricing.margin_rate
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn item(&self, item_id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|i| i.id_typed() == item_id)
    }

    pub fn estimated_total_cost(&self) -> Money {
        self.estimated_total_cost
    }

    pub fn suggested_selling_price(&self) -> Money {
        self.suggested_selling_price
    }

    /// Created and not deleted.
    pub fn exists(&self) -> bool {
        self.created && !self.deleted
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn is_modifiable(&self) -> bool {
        self.status == ProjectStatus::Draft
    }

    pub fn has_priced_items(&self) -> bool {
        self.items.iter().any(LineItem::is_priced)
    }

    /// Totals equal the fold over the current items.
    pub fn totals_are_consistent(&self) -> bool {
        matches!(
            fold_totals(&self.items),
            Ok(totals) if totals == (self.estimated_total_cost, self.suggested_selling_price)
        )
    }

    pub(crate) fn replace_items(&mut self, items: Vec<LineItem>) {
        self.items = items;
        self.refold();
    }

    pub(crate) fn set_status(&mut self, status: ProjectStatus) {
        self.status = status;
    }

    /// `handle` rejects item sets whose totals overflow, so replayed streams
    /// always fold; saturate rather than panic if one does not.
    fn refold(&mut self) {
        let (total, selling) = fold_totals(&self.items).unwrap_or((Money::MAX, Money::MAX));
        self.estimated_total_cost = total;
        self.suggested_selling_price = selling;
    }
}

impl AggregateRoot for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// A line item to price as part of project creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub item_id: LineItemId,
    pub input: LineItemInput,
    pub rates: ResolvedRates,
    pub notes: Option<String>,
}

/// Command: CreateProject.
///
/// `items` are priced together with the creation: if any fails, nothing is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProject {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub client_id: ClientId,
    pub name: String,
    /// Tenant pricing, with the project's margin override already applied.
    pub pricing: PricingConfig,
    pub items: Vec<NewItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddItem. `rates` are resolved from the catalog by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub item_id: LineItemId,
    pub input: LineItemInput,
    pub rates: ResolvedRates,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateItem (replace an item's inputs; same id, same position).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub item_id: LineItemId,
    pub input: LineItemInput,
    pub rates: ResolvedRates,
    pub notes: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecomputeTotals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecomputeTotals {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeStatus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeStatus {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub target: ProjectStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteProject (cascades to every line item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteProject {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectCommand {
    CreateProject(CreateProject),
    AddItem(AddItem),
    UpdateItem(UpdateItem),
    RemoveItem(RemoveItem),
    RecomputeTotals(RecomputeTotals),
    ChangeStatus(ChangeStatus),
    DeleteProject(DeleteProject),
}

/// Event: ProjectCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCreated {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub client_id: ClientId,
    pub name: String,
    pub pricing: PricingConfig,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemAdded (carries the priced item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub item: LineItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemUpdated (carries the repriced item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub item: LineItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub item_id: LineItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProjectRecomputed (the full repriced item set).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecomputed {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub items: Vec<LineItem>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: StatusChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChanged {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub from: ProjectStatus,
    pub to: ProjectStatus,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProjectDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDeleted {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectEvent {
    ProjectCreated(ProjectCreated),
    ItemAdded(ItemAdded),
    ItemUpdated(ItemUpdated),
    ItemRemoved(ItemRemoved),
    ProjectRecomputed(ProjectRecomputed),
    StatusChanged(StatusChanged),
    ProjectDeleted(ProjectDeleted),
}

impl Event for ProjectEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProjectEvent::ProjectCreated(_) => "projects.project.created",
            ProjectEvent::ItemAdded(_) => "projects.project.item_added",
            ProjectEvent::ItemUpdated(_) => "projects.project.item_updated",
            ProjectEvent::ItemRemoved(_) => "projects.project.item_removed",
            ProjectEvent::ProjectRecomputed(_) => "projects.project.recomputed",
            ProjectEvent::StatusChanged(_) => "projects.project.status_changed",
            ProjectEvent::ProjectDeleted(_) => "projects.project.deleted",
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProjectEvent::ProjectCreated(e) => e.occurred_at,
            ProjectEvent::ItemAdded(e) => e.occurred_at,
            ProjectEvent::ItemUpdated(e) => e.occurred_at,
            ProjectEvent::ItemRemoved(e) => e.occurred_at,
            ProjectEvent::ProjectRecomputed(e) => e.occurred_at,
            ProjectEvent::StatusChanged(e) => e.occurred_at,
            ProjectEvent::ProjectDeleted(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Project {
    type Command = ProjectCommand;
    type Event = ProjectEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProjectEvent::ProjectCreated(e) => {
                self.id = e.project_id;
                self.tenant_id = Some(e.tenant_id);
                self.client_id = Some(e.client_id);
                self.name = e.name.clone();
                self.pricing = e.pricing;
                self.status = ProjectStatus::Draft;
                self.created_at = Some(e.occurred_at);
                self.created = true;
                self.replace_items(Vec::new());
            }
            ProjectEvent::ItemAdded(e) => {
                self.items.push(e.item.clone());
                self.refold();
            }
            ProjectEvent::ItemUpdated(e) => {
                if let Some(slot) = self.items.iter_mut().find(|i| i.same_record(&e.item)) {
                    *slot = e.item.clone();
                }
                self.refold();
            }
            ProjectEvent::ItemRemoved(e) => {
                self.items.retain(|i| i.id_typed() != e.item_id);
                self.refold();
            }
            ProjectEvent::ProjectRecomputed(e) => {
                self.replace_items(e.items.clone());
            }
            ProjectEvent::StatusChanged(e) => {
                self.set_status(e.to);
            }
            ProjectEvent::ProjectDeleted(_) => {
                self.deleted = true;
                self.replace_items(Vec::new());
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProjectCommand::CreateProject(cmd) => self.handle_create(cmd),
            ProjectCommand::AddItem(cmd) => self.handle_add_item(cmd),
            ProjectCommand::UpdateItem(cmd) => self.handle_update_item(cmd),
            ProjectCommand::RemoveItem(cmd) => self.handle_remove_item(cmd),
            ProjectCommand::RecomputeTotals(cmd) => self.handle_recompute(cmd),
            ProjectCommand::ChangeStatus(cmd) => self.handle_change_status(cmd),
            ProjectCommand::DeleteProject(cmd) => self.handle_delete(cmd),
        }
    }
}

impl Project {
    fn ensure_exists(&self, tenant_id: TenantId, project_id: ProjectId) -> Result<(), DomainError> {
        if !self.exists() {
            return Err(DomainError::not_found("project", project_id));
        }
        if self.tenant_id != Some(tenant_id) {
            return Err(DomainError::invariant("tenant mismatch"));
        }
        if self.id != project_id {
            return Err(DomainError::invariant("project_id mismatch"));
        }
        Ok(())
    }

    fn ensure_modifiable(&self) -> Result<(), DomainError> {
        if !self.is_modifiable() {
            return Err(DomainError::invariant(format!(
                "line items can only change while the project is draft (status: {})",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateProject) -> Result<Vec<ProjectEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("project already exists"));
        }

        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("name", "must not be blank"));
        }
        cmd.pricing.validate()?;

        let mut items = Vec::with_capacity(cmd.items.len());
        for (idx, new_item) in cmd.items.iter().enumerate() {
            if cmd.items[..idx].iter().any(|i| i.item_id == new_item.item_id) {
                return Err(DomainError::conflict(format!(
                    "line item {} listed twice",
                    new_item.item_id
                )));
            }

            let item = LineItem::new(
                new_item.item_id,
                cmd.project_id,
                new_item.input.clone(),
                new_item.rates,
                cmd.pricing,
                new_item.notes.clone(),
            )
            .repriced()?;
            items.push(item);
        }
        fold_totals(&items)?;

        let mut events = vec![ProjectEvent::ProjectCreated(ProjectCreated {
            tenant_id: cmd.tenant_id,
            project_id: cmd.project_id,
            client_id: cmd.client_id,
            name: name.to_string(),
            pricing: cmd.pricing,
            occurred_at: cmd.occurred_at,
        })];
        events.extend(items.into_iter().map(|item| {
            ProjectEvent::ItemAdded(ItemAdded {
                tenant_id: cmd.tenant_id,
                project_id: cmd.project_id,
                item,
                occurred_at: cmd.occurred_at,
            })
        }));

        Ok(events)
    }

    fn handle_add_item(&self, cmd: &AddItem) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.project_id)?;
        self.ensure_modifiable()?;

        if self.item(cmd.item_id).is_some() {
            return Err(DomainError::conflict(format!(
                "line item {} already exists",
                cmd.item_id
            )));
        }

        let item = LineItem::new(
            cmd.item_id,
            cmd.project_id,
            cmd.input.clone(),
            cmd.rates,
            self.pricing,
            cmd.notes.clone(),
        )
        .repriced()?;

        let mut next = self.items.clone();
        next.push(item.clone());
        fold_totals(&next)?;

        Ok(vec![ProjectEvent::ItemAdded(ItemAdded {
            tenant_id: cmd.tenant_id,
            project_id: cmd.project_id,
            item,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_item(&self, cmd: &UpdateItem) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.project_id)?;
        self.ensure_modifiable()?;

        let existing = self
            .item(cmd.item_id)
            .ok_or_else(|| DomainError::not_found("line item", cmd.item_id))?;

        let item = LineItem::new(
            cmd.item_id,
            cmd.project_id,
            cmd.input.clone(),
            cmd.rates,
            *existing.pricing(),
            cmd.notes.clone(),
        )
        .repriced()?;

        let next: Vec<LineItem> = self
            .items
            .iter()
            .map(|i| if i.same_record(&item) { item.clone() } else { i.clone() })
            .collect();
        fold_totals(&next)?;

        Ok(vec![ProjectEvent::ItemUpdated(ItemUpdated {
            tenant_id: cmd.tenant_id,
            project_id: cmd.project_id,
            item,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove_item(&self, cmd: &RemoveItem) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.project_id)?;
        self.ensure_modifiable()?;

        if self.item(cmd.item_id).is_none() {
            return Err(DomainError::not_found("line item", cmd.item_id));
        }

        Ok(vec![ProjectEvent::ItemRemoved(ItemRemoved {
            tenant_id: cmd.tenant_id,
            project_id: cmd.project_id,
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_recompute(&self, cmd: &RecomputeTotals) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.project_id)?;

        let recomputed = recompute_project(self)?;
        if recomputed.items() == self.items() && recomputed.totals_are_consistent() && self.totals_are_consistent() {
            return Ok(vec![]);
        }

        Ok(vec![ProjectEvent::ProjectRecomputed(ProjectRecomputed {
            tenant_id: cmd.tenant_id,
            project_id: cmd.project_id,
            items: recomputed.items().to_vec(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_status(&self, cmd: &ChangeStatus) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.project_id)?;

        match decide_transition(self, cmd.target)? {
            None => Ok(vec![]),
            Some(to) => Ok(vec![ProjectEvent::StatusChanged(StatusChanged {
                tenant_id: cmd.tenant_id,
                project_id: cmd.project_id,
                from: self.status,
                to,
                occurred_at: cmd.occurred_at,
            })]),
        }
    }

    fn handle_delete(&self, cmd: &DeleteProject) -> Result<Vec<ProjectEvent>, DomainError> {
        self.ensure_exists(cmd.tenant_id, cmd.project_id)?;

        Ok(vec![ProjectEvent::ProjectDeleted(ProjectDeleted {
            tenant_id: cmd.tenant_id,
            project_id: cmd.project_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
