use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::Utc;
use tracing::{debug, info, warn};

use wrapquote_catalog::{default_catalog, CatalogLookup, DifficultyFactor, EmployeeLevel, InMemoryCatalog, Material};
use wrapquote_clients::{Client, ClientId, RegisterClient, UpdateClient};
use wrapquote_core::{AggregateId, DomainError, Money, Rate, TenantId};
use wrapquote_infra::command_dispatcher::CommandDispatcher;
use wrapquote_infra::event_store::{EventStore, InMemoryEventStore};
use wrapquote_infra::read_model::{InMemoryTenantStore, TenantStore};
use wrapquote_portfolio::{compute_portfolio_stats, PortfolioStats};
use wrapquote_pricing::{price_line_item, PricedLineItem, PricingConfig, ResolvedRates};
use wrapquote_projects::{
    AddItem, ChangeStatus, CreateProject, DeleteProject, LineItemId, NewItem, Project,
    ProjectCommand, ProjectId, ProjectStatus, RecomputeTotals, RemoveItem, UpdateItem,
};

use crate::config::AppConfig;
use crate::context::TenantContext;
use crate::dto::{NewClient, NewLineItem, NewProject};
use crate::errors::{ServiceError, ServiceResult};

/// Stream type of every project aggregate.
pub const PROJECT_AGGREGATE: &str = "projects.project";

pub type InMemoryQuoteService = QuoteService<
    InMemoryCatalog,
    Arc<InMemoryEventStore>,
    Arc<InMemoryTenantStore<ClientId, Client>>,
>;

/// Quote workflow over a catalog, a project event store and a client store.
#[derive(Debug)]
pub struct QuoteService<C, S, T> {
    config: AppConfig,
    catalog: C,
    dispatcher: CommandDispatcher<S>,
    clients: T,
    references: ReferenceGuards,
}

impl InMemoryQuoteService {
    /// In-memory stores and the default seed catalog priced with `config.hourly_rates`.
    pub fn in_memory(config: AppConfig) -> ServiceResult<Self> {
        let catalog = default_catalog(config.hourly_rates)?;
        Ok(QuoteService::new(
            config,
            catalog,
            Arc::new(InMemoryEventStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        ))
    }
}

/// Per-tenant lock over the client/project reference check.
///
/// Project creation holds it shared across "client exists" and the append;
/// client deletion holds it exclusively across "no projects" and the removal.
#[derive(Debug, Default)]
struct ReferenceGuards {
    by_tenant: Mutex<HashMap<TenantId, Arc<RwLock<()>>>>,
}

impl ReferenceGuards {
    fn for_tenant(&self, tenant_id: TenantId) -> ServiceResult<Arc<RwLock<()>>> {
        let mut guards = self.by_tenant.lock().map_err(|_| guard_poisoned())?;
        Ok(Arc::clone(guards.entry(tenant_id).or_default()))
    }
}

fn guard_poisoned() -> ServiceError {
    ServiceError::Storage("reference guard poisoned".to_string())
}

fn make_project(_: TenantId, id: AggregateId) -> Project {
    Project::empty(ProjectId::new(id))
}

impl<C, S, T> QuoteService<C, S, T>
where
    C: CatalogLookup,
    S: EventStore,
    T: TenantStore<ClientId, Client>,
{
    pub fn new(config: AppConfig, catalog: C, store: S, clients: T) -> Self {
        Self {
            config,
            catalog,
            dispatcher: CommandDispatcher::new(store),
            clients,
            references: ReferenceGuards::default(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Effective pricing for the tenant, with an optional margin override.
    pub fn pricing_for(&self, ctx: &TenantContext, margin_rate: Option<Rate>) -> PricingConfig {
        let pricing = self.config.pricing_for(ctx.tenant_id());
        match margin_rate {
            Some(margin) => pricing.with_margin(margin),
            None => pricing,
        }
    }

    // ---- catalog ---------------------------------------------------------

    pub fn list_materials(&self, ctx: &TenantContext) -> Vec<Material> {
        self.catalog.list_materials(ctx.tenant_id())
    }

    pub fn list_difficulty_factors(&self, ctx: &TenantContext) -> Vec<DifficultyFactor> {
        self.catalog.list_difficulty_factors(ctx.tenant_id())
    }

    pub fn hourly_rates(&self, ctx: &TenantContext) -> Vec<(EmployeeLevel, Money)> {
        EmployeeLevel::ALL
            .iter()
            .map(|level| (*level, self.catalog.hourly_rate(ctx.tenant_id(), *level)))
            .collect()
    }

    // ---- pricing ---------------------------------------------------------

    /// Price one line item without storing anything.
    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id()), err)]
    pub fn price_line_item(
        &self,
        ctx: &TenantContext,
        item: &NewLineItem,
        margin_rate: Option<Rate>,
    ) -> ServiceResult<PricedLineItem> {
        let pricing = self.pricing_for(ctx, margin_rate);
        let priced = price_line_item(&self.catalog, ctx.tenant_id(), &item.input, &pricing)?;
        debug!(
            material_cost = %priced.costs.material_cost,
            labor_cost = %priced.costs.labor_cost,
            total_cost = %priced.costs.total_cost,
            selling_price = %priced.costs.selling_price,
            "line item priced"
        );
        Ok(priced)
    }

    fn resolve(&self, ctx: &TenantContext, item: &NewLineItem) -> ServiceResult<ResolvedRates> {
        item.input.validate()?;
        Ok(ResolvedRates::resolve(&self.catalog, ctx.tenant_id(), &item.input)?)
    }

    // ---- clients ---------------------------------------------------------

    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id()), err)]
    pub fn register_client(&self, ctx: &TenantContext, new_client: NewClient) -> ServiceResult<Client> {
        let client = Client::register(RegisterClient {
            tenant_id: ctx.tenant_id(),
            client_id: ClientId::new(AggregateId::new()),
            name: new_client.name,
            contact: new_client.contact,
            occurred_at: Utc::now(),
        })?;

        self.clients.upsert(ctx.tenant_id(), client.id_typed(), client.clone());
        info!(client_id = %client.id_typed(), "client registered");
        Ok(client)
    }

    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), client_id = %client_id), err)]
    pub fn update_client(
        &self,
        ctx: &TenantContext,
        client_id: ClientId,
        changes: UpdateClient,
    ) -> ServiceResult<Client> {
        let client = self.get_client(ctx, client_id)?.updated(changes)?;
        self.clients.upsert(ctx.tenant_id(), client_id, client.clone());
        info!("client updated");
        Ok(client)
    }

    pub fn get_client(&self, ctx: &TenantContext, client_id: ClientId) -> ServiceResult<Client> {
        self.clients
            .get(ctx.tenant_id(), &client_id)
            .ok_or_else(|| DomainError::not_found("client", client_id).into())
    }

    pub fn list_clients(&self, ctx: &TenantContext) -> Vec<Client> {
        self.clients.list(ctx.tenant_id())
    }

    /// Delete a client that no live project references.
    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), client_id = %client_id), err)]
    pub fn delete_client(&self, ctx: &TenantContext, client_id: ClientId) -> ServiceResult<()> {
        let guard = self.references.for_tenant(ctx.tenant_id())?;
        let _exclusive = guard.write().map_err(|_| guard_poisoned())?;

        self.get_client(ctx, client_id)?;

        let referencing = self.list_projects(ctx, Some(client_id))?.len();
        if referencing > 0 {
            warn!(projects = referencing, "client deletion refused");
            return Err(DomainError::referential_integrity(format!(
                "client {client_id} is referenced by {referencing} project(s)"
            ))
            .into());
        }

        self.clients.remove(ctx.tenant_id(), &client_id);
        info!("client deleted");
        Ok(())
    }

    // ---- projects --------------------------------------------------------

    fn dispatch(
        &self,
        ctx: &TenantContext,
        project_id: ProjectId,
        command: ProjectCommand,
    ) -> ServiceResult<Project> {
        let outcome = self.dispatcher.dispatch(
            ctx.tenant_id(),
            project_id.0,
            PROJECT_AGGREGATE,
            command,
            make_project,
        )?;
        Ok(outcome.aggregate)
    }

    /// Create a draft project, pricing any initial items in the same step.
    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id()), err)]
    pub fn create_project(&self, ctx: &TenantContext, new_project: NewProject) -> ServiceResult<Project> {
        let guard = self.references.for_tenant(ctx.tenant_id())?;
        let _shared = guard.read().map_err(|_| guard_poisoned())?;

        self.get_client(ctx, new_project.client_id)?;

        let items = new_project
            .items
            .iter()
            .map(|item| {
                Ok(NewItem {
                    item_id: LineItemId::new(AggregateId::new()),
                    input: item.input.clone(),
                    rates: self.resolve(ctx, item)?,
                    notes: item.notes.clone(),
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        let project_id = ProjectId::new(AggregateId::new());
        let project = self.dispatch(
            ctx,
            project_id,
            ProjectCommand::CreateProject(CreateProject {
                tenant_id: ctx.tenant_id(),
                project_id,
                client_id: new_project.client_id,
                name: new_project.name,
                pricing: self.pricing_for(ctx, new_project.margin_rate),
                items,
                occurred_at: Utc::now(),
            }),
        )?;

        info!(
            project_id = %project_id,
            items = project.items().len(),
            estimated_total_cost = %project.estimated_total_cost(),
            "project created"
        );
        Ok(project)
    }

    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), project_id = %project_id), err)]
    pub fn add_item(
        &self,
        ctx: &TenantContext,
        project_id: ProjectId,
        item: NewLineItem,
    ) -> ServiceResult<Project> {
        let rates = self.resolve(ctx, &item)?;
        let item_id = LineItemId::new(AggregateId::new());
        let project = self.dispatch(
            ctx,
            project_id,
            ProjectCommand::AddItem(AddItem {
                tenant_id: ctx.tenant_id(),
                project_id,
                item_id,
                input: item.input,
                rates,
                notes: item.notes,
                occurred_at: Utc::now(),
            }),
        )?;

        info!(item_id = %item_id, estimated_total_cost = %project.estimated_total_cost(), "item added");
        Ok(project)
    }

    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), project_id = %project_id, item_id = %item_id), err)]
    pub fn update_item(
        &self,
        ctx: &TenantContext,
        project_id: ProjectId,
        item_id: LineItemId,
        item: NewLineItem,
    ) -> ServiceResult<Project> {
        let rates = self.resolve(ctx, &item)?;
        let project = self.dispatch(
            ctx,
            project_id,
            ProjectCommand::UpdateItem(UpdateItem {
                tenant_id: ctx.tenant_id(),
                project_id,
                item_id,
                input: item.input,
                rates,
                notes: item.notes,
                occurred_at: Utc::now(),
            }),
        )?;

        info!(estimated_total_cost = %project.estimated_total_cost(), "item updated");
        Ok(project)
    }

    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), project_id = %project_id, item_id = %item_id), err)]
    pub fn remove_item(
        &self,
        ctx: &TenantContext,
        project_id: ProjectId,
        item_id: LineItemId,
    ) -> ServiceResult<Project> {
        let project = self.dispatch(
            ctx,
            project_id,
            ProjectCommand::RemoveItem(RemoveItem {
                tenant_id: ctx.tenant_id(),
                project_id,
                item_id,
                occurred_at: Utc::now(),
            }),
        )?;

        info!(estimated_total_cost = %project.estimated_total_cost(), "item removed");
        Ok(project)
    }

    /// Reprice every item from its stored inputs and re-fold the totals.
    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), project_id = %project_id), err)]
    pub fn recompute_project(&self, ctx: &TenantContext, project_id: ProjectId) -> ServiceResult<Project> {
        self.dispatch(
            ctx,
            project_id,
            ProjectCommand::RecomputeTotals(RecomputeTotals {
                tenant_id: ctx.tenant_id(),
                project_id,
                occurred_at: Utc::now(),
            }),
        )
    }

    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), project_id = %project_id, target = %target), err)]
    pub fn transition_status(
        &self,
        ctx: &TenantContext,
        project_id: ProjectId,
        target: ProjectStatus,
    ) -> ServiceResult<Project> {
        let result = self.dispatch(
            ctx,
            project_id,
            ProjectCommand::ChangeStatus(ChangeStatus {
                tenant_id: ctx.tenant_id(),
                project_id,
                target,
                occurred_at: Utc::now(),
            }),
        );

        match &result {
            Ok(project) => info!(status = %project.status(), "status transitioned"),
            Err(ServiceError::Domain(DomainError::InvalidTransition { from, to })) => {
                warn!(%from, %to, "transition refused")
            }
            Err(_) => {}
        }
        result
    }

    /// Delete a project and every line item in it.
    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id(), project_id = %project_id), err)]
    pub fn delete_project(&self, ctx: &TenantContext, project_id: ProjectId) -> ServiceResult<()> {
        self.dispatch(
            ctx,
            project_id,
            ProjectCommand::DeleteProject(DeleteProject {
                tenant_id: ctx.tenant_id(),
                project_id,
                occurred_at: Utc::now(),
            }),
        )?;
        info!("project deleted");
        Ok(())
    }

    pub fn get_project(&self, ctx: &TenantContext, project_id: ProjectId) -> ServiceResult<Project> {
        let project: Project = self.dispatcher.load(ctx.tenant_id(), project_id.0, make_project)?;
        if !project.exists() {
            return Err(DomainError::not_found("project", project_id).into());
        }
        Ok(project)
    }

    /// Live projects of the tenant, oldest first, optionally for one client only.
    pub fn list_projects(
        &self,
        ctx: &TenantContext,
        client_id: Option<ClientId>,
    ) -> ServiceResult<Vec<Project>> {
        let ids = self
            .dispatcher
            .store()
            .list_aggregate_ids(ctx.tenant_id(), PROJECT_AGGREGATE)?;

        let mut projects = Vec::with_capacity(ids.len());
        for id in ids {
            let project: Project = self.dispatcher.load(ctx.tenant_id(), id, make_project)?;
            if !project.exists() {
                continue;
            }
            if client_id.is_some_and(|c| project.client_id() != Some(c)) {
                continue;
            }
            projects.push(project);
        }
        Ok(projects)
    }

    // ---- statistics ------------------------------------------------------

    #[tracing::instrument(skip_all, fields(tenant_id = %ctx.tenant_id()), err)]
    pub fn portfolio_stats(&self, ctx: &TenantContext) -> ServiceResult<PortfolioStats> {
        let clients = self.list_clients(ctx);
        let projects = self.list_projects(ctx, None)?;
        Ok(compute_portfolio_stats(&clients, &projects)?)
    }
}
