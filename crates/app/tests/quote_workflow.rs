//! End-to-end quote workflow through `QuoteService`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use proptest::prelude::*;

use wrapquote_app::{
    AppConfig, NewClient, NewLineItem, NewProject, ProjectView, QuoteService, ServiceError,
    TenantContext,
};
use wrapquote_catalog::{
    DifficultyFactor, DifficultyId, EmployeeLevel, HourlyRates, InMemoryCatalog, Material,
    MaterialId,
};
use wrapquote_clients::{Client, ClientId, ContactInfo, UpdateClient};
use wrapquote_core::{AggregateId, DomainError, Money, Quantity, Rate, TenantId};
use wrapquote_infra::event_store::InMemoryEventStore;
use wrapquote_infra::read_model::{InMemoryTenantStore, TenantStore};
use wrapquote_pricing::LineItemInput;
use wrapquote_projects::{ProjectId, ProjectStatus};

type TestService =
    QuoteService<InMemoryCatalog, Arc<InMemoryEventStore>, Arc<InMemoryTenantStore<ClientId, Client>>>;

struct Fixture {
    service: TestService,
    ctx: TenantContext,
    vinyl: MaterialId,
    high: DifficultyId,
}

/// R$10.00/unit material, 1.5 difficulty, default hourly rates.
fn scenario_catalog(vinyl: MaterialId, high: DifficultyId) -> InMemoryCatalog {
    InMemoryCatalog::new(HourlyRates::default())
        .with_material(Material::new(vinyl, "Test vinyl", "m²", Money::from_major(10), None).unwrap())
        .with_difficulty(DifficultyFactor::new(high, "3", Rate::from_ten_thousandths(15_000), None).unwrap())
}

fn fixture_with(config: AppConfig) -> Fixture {
    let vinyl = MaterialId::new(AggregateId::new());
    let high = DifficultyId::new(AggregateId::new());

    Fixture {
        service: QuoteService::new(
            config,
            scenario_catalog(vinyl, high),
            Arc::new(InMemoryEventStore::new()),
            Arc::new(InMemoryTenantStore::new()),
        ),
        ctx: TenantContext::new(TenantId::new()),
        vinyl,
        high,
    }
}

fn fixture() -> Fixture {
    fixture_with(AppConfig::default())
}

impl Fixture {
    fn scenario_item(&self) -> NewLineItem {
        NewLineItem::new(LineItemInput {
            material_id: self.vinyl,
            difficulty_id: self.high,
            employee_level: EmployeeLevel::AssistantWrapper,
            quantity: Quantity::whole(10),
            estimated_days: Quantity::whole(2),
            crew_size: 2,
        })
    }

    fn client(&self, name: &str) -> Client {
        self.service
            .register_client(
                &self.ctx,
                NewClient {
                    name: name.to_string(),
                    contact: ContactInfo::default(),
                },
            )
            .unwrap()
    }

    fn project_with_two_items(&self, client: &Client) -> ProjectId {
        self.service
            .create_project(
                &self.ctx,
                NewProject {
                    client_id: client.id_typed(),
                    name: "Cozinha".to_string(),
                    margin_rate: None,
                    items: vec![self.scenario_item(), self.scenario_item()],
                },
            )
            .unwrap()
            .id_typed()
    }
}

fn domain(err: ServiceError) -> DomainError {
    match err {
        ServiceError::Domain(e) => e,
        other => panic!("Expected a domain error, got {other:?}"),
    }
}

#[test]
fn reference_line_item_prices_to_1378() {
    let f = fixture();
    let priced = f.service.price_line_item(&f.ctx, &f.scenario_item(), None).unwrap();

    assert_eq!(priced.costs.material_cost, Money::from_major(100));
    assert_eq!(priced.costs.labor_cost, Money::from_major(960));
    assert_eq!(priced.costs.subtotal, Money::from_major(1_060));
    assert_eq!(priced.costs.total_cost, Money::from_major(1_060));
    assert_eq!(priced.costs.selling_price, Money::from_major(1_378));
}

#[test]
fn tenant_configuration_and_margin_override_apply() {
    let ctx = TenantContext::new(TenantId::new());
    let config = AppConfig::from_toml_str(&format!(
        "[tenants.\"{}\"]\ntax_rate = \"0.10\"\n",
        ctx.tenant_id()
    ))
    .unwrap();
    let f = Fixture { ctx, ..fixture_with(config) };

    let priced = f.service.price_line_item(&f.ctx, &f.scenario_item(), None).unwrap();
    assert_eq!(priced.costs.total_cost, Money::from_major(1_166));
    assert_eq!(priced.costs.selling_price, Money::from_minor(151_580));

    let priced = f
        .service
        .price_line_item(&f.ctx, &f.scenario_item(), Some(Rate::ZERO))
        .unwrap();
    assert_eq!(priced.costs.selling_price, Money::from_major(1_166));
}

#[test]
fn invalid_input_is_reported_before_catalog_lookup() {
    let f = fixture();
    let mut item = f.scenario_item();
    item.input.material_id = MaterialId::new(AggregateId::new());
    item.input.crew_size = 0;

    let err = domain(f.service.price_line_item(&f.ctx, &item, None).unwrap_err());
    assert!(matches!(err, DomainError::InvalidInput { field, .. } if field == "crew_size"));

    item.input.crew_size = 1;
    let err = domain(f.service.price_line_item(&f.ctx, &item, None).unwrap_err());
    assert!(matches!(err, DomainError::NotFound { entity: "material", .. }));
}

#[test]
fn approved_project_counts_toward_revenue() {
    let f = fixture();
    let client = f.client("Ana");
    let project_id = f.project_with_two_items(&client);

    let project = f.service.get_project(&f.ctx, project_id).unwrap();
    assert_eq!(project.status(), ProjectStatus::Draft);
    assert_eq!(project.estimated_total_cost(), Money::from_major(2_120));
    assert_eq!(project.suggested_selling_price(), Money::from_major(2_756));

    f.service.transition_status(&f.ctx, project_id, ProjectStatus::Sent).unwrap();
    let stats = f.service.portfolio_stats(&f.ctx).unwrap();
    assert_eq!(stats.total_revenue, Money::ZERO);

    f.service.transition_status(&f.ctx, project_id, ProjectStatus::Approved).unwrap();
    let stats = f.service.portfolio_stats(&f.ctx).unwrap();
    assert_eq!(stats.total_clients, 1);
    assert_eq!(stats.total_projects, 1);
    assert_eq!(stats.approved_projects_count, 1);
    assert_eq!(stats.total_revenue, Money::from_major(2_756));
    assert_eq!(stats.average_ticket, Money::from_major(2_756));
    assert_eq!(stats.approval_rate, 1.0);
    assert_eq!(stats.projects_by_status[&ProjectStatus::Approved], 1);
}

#[test]
fn rejected_project_leaves_revenue_untouched() {
    let f = fixture();
    let client = f.client("Bruno");
    let project_id = f.project_with_two_items(&client);

    f.service.transition_status(&f.ctx, project_id, ProjectStatus::Sent).unwrap();
    f.service.transition_status(&f.ctx, project_id, ProjectStatus::Rejected).unwrap();

    let stats = f.service.portfolio_stats(&f.ctx).unwrap();
    assert_eq!(stats.total_revenue, Money::ZERO);
    assert_eq!(stats.approval_rate, 0.0);
    assert_eq!(stats.projects_by_status[&ProjectStatus::Rejected], 1);

    let err = domain(
        f.service
            .transition_status(&f.ctx, project_id, ProjectStatus::Approved)
            .unwrap_err(),
    );
    assert_eq!(err, DomainError::invalid_transition("rejected", "approved"));
    assert_eq!(
        f.service.get_project(&f.ctx, project_id).unwrap().status(),
        ProjectStatus::Rejected
    );
}

#[test]
fn client_with_projects_cannot_be_deleted_until_they_are_gone() {
    let f = fixture();
    let client = f.client("Carla");
    let project_id = f.project_with_two_items(&client);

    let err = domain(f.service.delete_client(&f.ctx, client.id_typed()).unwrap_err());
    assert!(matches!(err, DomainError::ReferentialIntegrity(_)));
    assert!(f.service.get_client(&f.ctx, client.id_typed()).is_ok());

    f.service.delete_project(&f.ctx, project_id).unwrap();
    f.service.delete_client(&f.ctx, client.id_typed()).unwrap();

    let err = domain(f.service.get_client(&f.ctx, client.id_typed()).unwrap_err());
    assert!(matches!(err, DomainError::NotFound { entity: "client", .. }));
    let err = domain(f.service.get_project(&f.ctx, project_id).unwrap_err());
    assert!(matches!(err, DomainError::NotFound { entity: "project", .. }));
}

/// Client store whose first `get` after arming waits for a second thread,
/// then stalls long enough for that thread to race the caller.
struct StallingClients {
    inner: InMemoryTenantStore<ClientId, Client>,
    armed: AtomicBool,
    rendezvous: Barrier,
}

impl TenantStore<ClientId, Client> for StallingClients {
    fn get(&self, tenant_id: TenantId, key: &ClientId) -> Option<Client> {
        let found = self.inner.get(tenant_id, key);
        if self.armed.swap(false, Ordering::SeqCst) {
            self.rendezvous.wait();
            thread::sleep(Duration::from_millis(50));
        }
        found
    }

    fn upsert(&self, tenant_id: TenantId, key: ClientId, value: Client) {
        self.inner.upsert(tenant_id, key, value)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<Client> {
        self.inner.list(tenant_id)
    }

    fn remove(&self, tenant_id: TenantId, key: &ClientId) -> Option<Client> {
        self.inner.remove(tenant_id, key)
    }
}

#[test]
fn client_deletion_cannot_slip_between_project_check_and_create() {
    let f = fixture();
    let clients = Arc::new(StallingClients {
        inner: InMemoryTenantStore::new(),
        armed: AtomicBool::new(false),
        rendezvous: Barrier::new(2),
    });
    let service = QuoteService::new(
        AppConfig::default(),
        scenario_catalog(f.vinyl, f.high),
        Arc::new(InMemoryEventStore::new()),
        Arc::clone(&clients),
    );
    let client_id = service
        .register_client(&f.ctx, NewClient { name: "Lia".to_string(), ..NewClient::default() })
        .unwrap()
        .id_typed();
    clients.armed.store(true, Ordering::SeqCst);

    let (created, deleted) = thread::scope(|s| {
        let creator = s.spawn(|| {
            service.create_project(
                &f.ctx,
                NewProject {
                    client_id,
                    name: "Loja".to_string(),
                    margin_rate: None,
                    items: vec![f.scenario_item()],
                },
            )
        });
        let deleter = s.spawn(|| {
            clients.rendezvous.wait();
            service.delete_client(&f.ctx, client_id)
        });
        (creator.join().unwrap(), deleter.join().unwrap())
    });

    assert!(created.is_ok());
    let err = domain(deleted.unwrap_err());
    assert!(matches!(err, DomainError::ReferentialIntegrity(_)));

    for project in service.list_projects(&f.ctx, None).unwrap() {
        let owner = project.client_id().unwrap();
        assert!(service.get_client(&f.ctx, owner).is_ok());
    }
}

#[test]
fn project_for_unknown_client_is_not_found() {
    let f = fixture();
    let err = domain(
        f.service
            .create_project(
                &f.ctx,
                NewProject {
                    client_id: ClientId::new(AggregateId::new()),
                    name: "Orphan".to_string(),
                    margin_rate: None,
                    items: vec![],
                },
            )
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::NotFound { entity: "client", .. }));
}

#[test]
fn one_bad_initial_item_creates_nothing() {
    let f = fixture();
    let client = f.client("Davi");
    let mut bad = f.scenario_item();
    bad.input.difficulty_id = DifficultyId::new(AggregateId::new());

    let err = domain(
        f.service
            .create_project(
                &f.ctx,
                NewProject {
                    client_id: client.id_typed(),
                    name: "Sala".to_string(),
                    margin_rate: None,
                    items: vec![f.scenario_item(), bad],
                },
            )
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::NotFound { entity: "difficulty factor", .. }));
    assert!(f.service.list_projects(&f.ctx, None).unwrap().is_empty());
}

#[test]
fn editing_items_keeps_totals_in_step() {
    let f = fixture();
    let client = f.client("Eva");
    let project = f
        .service
        .create_project(
            &f.ctx,
            NewProject {
                client_id: client.id_typed(),
                name: "Quarto".to_string(),
                margin_rate: Some(Rate::from_percent(50)),
                items: vec![],
            },
        )
        .unwrap();
    assert_eq!(project.estimated_total_cost(), Money::ZERO);
    assert_eq!(project.applied_margin(), Rate::from_percent(50));

    let project = f
        .service
        .add_item(&f.ctx, project.id_typed(), f.scenario_item().with_notes("porta"))
        .unwrap();
    let item_id = project.items()[0].id_typed();
    assert_eq!(project.suggested_selling_price(), Money::from_major(1_590));
    assert_eq!(project.items()[0].notes(), Some("porta"));

    let mut bigger = f.scenario_item();
    bigger.input.quantity = Quantity::whole(20);
    let project = f.service.update_item(&f.ctx, project.id_typed(), item_id, bigger).unwrap();
    assert_eq!(project.estimated_total_cost(), Money::from_major(1_160));
    assert_eq!(project.items()[0].notes(), None);

    let project = f.service.remove_item(&f.ctx, project.id_typed(), item_id).unwrap();
    assert!(project.items().is_empty());
    assert_eq!(project.estimated_total_cost(), Money::ZERO);

    let recomputed = f.service.recompute_project(&f.ctx, project.id_typed()).unwrap();
    assert_eq!(recomputed, project);
}

#[test]
fn overflowing_project_totals_are_refused_and_the_project_stays_readable() {
    let f = fixture();
    let huge = MaterialId::new(AggregateId::new());
    let service: TestService = QuoteService::new(
        AppConfig::default(),
        InMemoryCatalog::new(HourlyRates::default())
            .with_material(
                Material::new(huge, "Huge", "m²", Money::from_minor(i64::MAX / 2), None).unwrap(),
            )
            .with_difficulty(
                DifficultyFactor::new(f.high, "3", Rate::from_ten_thousandths(15_000), None).unwrap(),
            ),
        Arc::new(InMemoryEventStore::new()),
        Arc::new(InMemoryTenantStore::new()),
    );
    let mut item = f.scenario_item();
    item.input.material_id = huge;
    item.input.quantity = Quantity::whole(1);

    let client = service
        .register_client(&f.ctx, NewClient { name: "Jade".to_string(), ..NewClient::default() })
        .unwrap();
    let project = service
        .create_project(
            &f.ctx,
            NewProject {
                client_id: client.id_typed(),
                name: "Galpão".to_string(),
                margin_rate: None,
                items: vec![item.clone()],
            },
        )
        .unwrap();

    let err = domain(service.add_item(&f.ctx, project.id_typed(), item).unwrap_err());
    assert!(matches!(err, DomainError::InvalidInput { field, .. } if field == "amount"));

    let reloaded = service.get_project(&f.ctx, project.id_typed()).unwrap();
    assert_eq!(reloaded, project);
    assert_eq!(service.list_projects(&f.ctx, None).unwrap().len(), 1);
    assert_eq!(service.portfolio_stats(&f.ctx).unwrap().total_projects, 1);
}

#[test]
fn sent_projects_are_frozen_and_empty_drafts_cannot_be_sent() {
    let f = fixture();
    let client = f.client("Fabio");
    let empty = f
        .service
        .create_project(
            &f.ctx,
            NewProject {
                client_id: client.id_typed(),
                name: "Vazio".to_string(),
                margin_rate: None,
                items: vec![],
            },
        )
        .unwrap();

    let err = domain(
        f.service
            .transition_status(&f.ctx, empty.id_typed(), ProjectStatus::Sent)
            .unwrap_err(),
    );
    assert_eq!(err, DomainError::invalid_transition("draft", "sent"));

    let project_id = f.project_with_two_items(&client);
    f.service.transition_status(&f.ctx, project_id, ProjectStatus::Sent).unwrap();
    let err = domain(f.service.add_item(&f.ctx, project_id, f.scenario_item()).unwrap_err());
    assert!(matches!(err, DomainError::InvariantViolation(_)));

    // Same-state request is a no-op.
    let project = f.service.transition_status(&f.ctx, project_id, ProjectStatus::Sent).unwrap();
    assert_eq!(project.status(), ProjectStatus::Sent);
}

#[test]
fn projects_can_be_listed_per_client() {
    let f = fixture();
    let ana = f.client("Ana");
    let bia = f.client("Bia");
    let first = f.project_with_two_items(&ana);
    let second = f.project_with_two_items(&ana);
    f.project_with_two_items(&bia);

    let mut for_ana: Vec<ProjectId> = f
        .service
        .list_projects(&f.ctx, Some(ana.id_typed()))
        .unwrap()
        .iter()
        .map(|p| p.id_typed())
        .collect();
    for_ana.sort();
    let mut expected = vec![first, second];
    expected.sort();
    assert_eq!(for_ana, expected);
    assert_eq!(f.service.list_projects(&f.ctx, None).unwrap().len(), 3);

    let stats = f.service.portfolio_stats(&f.ctx).unwrap();
    assert_eq!(stats.projects_per_client, 1.5);
}

#[test]
fn tenants_do_not_see_each_other() {
    let f = fixture();
    let client = f.client("Gil");
    let project_id = f.project_with_two_items(&client);

    let other = TenantContext::new(TenantId::new());
    assert!(f.service.list_clients(&other).is_empty());
    assert!(f.service.list_projects(&other, None).unwrap().is_empty());
    assert!(matches!(
        domain(f.service.get_project(&other, project_id).unwrap_err()),
        DomainError::NotFound { .. }
    ));
    assert!(matches!(
        domain(f.service.delete_client(&other, client.id_typed()).unwrap_err()),
        DomainError::NotFound { .. }
    ));

    let stats = f.service.portfolio_stats(&other).unwrap();
    assert_eq!(stats.total_clients, 0);
    assert_eq!(stats.total_projects, 0);
}

#[test]
fn client_updates_are_partial() {
    let f = fixture();
    let client = f
        .service
        .register_client(
            &f.ctx,
            NewClient {
                name: "Hugo".to_string(),
                contact: ContactInfo {
                    email: Some("hugo@example.com".to_string()),
                    phone: Some("11 99999-0000".to_string()),
                    address: None,
                },
            },
        )
        .unwrap();

    let updated = f
        .service
        .update_client(
            &f.ctx,
            client.id_typed(),
            UpdateClient {
                phone: Some("11 98888-0000".to_string()),
                ..UpdateClient::default()
            },
        )
        .unwrap();

    assert_eq!(updated.name(), "Hugo");
    assert_eq!(updated.contact().email.as_deref(), Some("hugo@example.com"));
    assert_eq!(updated.contact().phone.as_deref(), Some("11 98888-0000"));
    assert_eq!(f.service.get_client(&f.ctx, client.id_typed()).unwrap(), updated);

    let err = domain(
        f.service
            .update_client(
                &f.ctx,
                client.id_typed(),
                UpdateClient {
                    email: Some("not-an-email".to_string()),
                    ..UpdateClient::default()
                },
            )
            .unwrap_err(),
    );
    assert!(matches!(err, DomainError::InvalidInput { field, .. } if field == "email"));
}

#[test]
fn seeded_service_lists_catalog_and_serializes_views() {
    let service = QuoteService::in_memory(AppConfig::default()).unwrap();
    let ctx = TenantContext::new(TenantId::new());

    assert_eq!(service.list_materials(&ctx).len(), 8);
    assert_eq!(service.list_difficulty_factors(&ctx).len(), 3);
    assert_eq!(
        service.hourly_rates(&ctx),
        vec![
            (EmployeeLevel::AssistantWrapper, Money::from_major(20)),
            (EmployeeLevel::MidWrapper, Money::from_major(30)),
            (EmployeeLevel::SeniorWrapper, Money::from_major(45)),
        ]
    );

    let ppf = service.catalog().material_by_name("PPF SH").unwrap().id_typed();
    let low = service.catalog().difficulty_by_level("1").unwrap().id_typed();
    let client = service
        .register_client(&ctx, NewClient { name: "Iris".to_string(), ..NewClient::default() })
        .unwrap();
    let project = service
        .create_project(
            &ctx,
            NewProject {
                client_id: client.id_typed(),
                name: "Capô".to_string(),
                margin_rate: None,
                items: vec![NewLineItem::new(LineItemInput {
                    material_id: ppf,
                    difficulty_id: low,
                    employee_level: EmployeeLevel::SeniorWrapper,
                    quantity: Quantity::from_hundredths(250),
                    estimated_days: Quantity::whole(1),
                    crew_size: 1,
                })],
            },
        )
        .unwrap();

    // 2.5 * 180.00 + 45.00 * 8 * 1 * 1 * 1.0 = 450.00 + 360.00
    assert_eq!(project.estimated_total_cost(), Money::from_major(810));
    assert_eq!(project.suggested_selling_price(), Money::from_major(1_053));

    let json = serde_json::to_value(ProjectView::from(&project)).unwrap();
    assert_eq!(json["status"], "draft");
    assert_eq!(json["items"][0]["total_cost"], 81_000);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

    /// Stored totals always equal the sum over the items left in the project.
    #[test]
    fn stored_totals_follow_item_edits(
        ops in prop::collection::vec((any::<bool>(), 1u64..5_000, 1u64..500, 1u32..5), 1..12)
    ) {
        let f = fixture();
        let client = f.client("Prop");
        let mut project = f
            .service
            .create_project(
                &f.ctx,
                NewProject {
                    client_id: client.id_typed(),
                    name: "Prop".to_string(),
                    margin_rate: None,
                    items: vec![],
                },
            )
            .unwrap();

        for (remove, qty, days, crew) in ops {
            project = match project.items().first() {
                Some(first) if remove => f
                    .service
                    .remove_item(&f.ctx, project.id_typed(), first.id_typed())
                    .unwrap(),
                _ => {
                    let mut item = f.scenario_item();
                    item.input.quantity = Quantity::from_hundredths(qty);
                    item.input.estimated_days = Quantity::from_hundredths(days);
                    item.input.crew_size = crew;
                    f.service.add_item(&f.ctx, project.id_typed(), item).unwrap()
                }
            };

            let total: Money = project.items().iter().map(|i| i.costs().total_cost).sum();
            let selling: Money = project.items().iter().map(|i| i.costs().selling_price).sum();
            prop_assert_eq!(project.estimated_total_cost(), total);
            prop_assert_eq!(project.suggested_selling_price(), selling);
        }

        let reloaded = f.service.get_project(&f.ctx, project.id_typed()).unwrap();
        prop_assert_eq!(reloaded, project);
    }
}
