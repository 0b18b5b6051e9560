//! Project lifecycle: `draft -> sent -> approved | rejected`.

use wrapquote_core::{DomainError, DomainResult};

use crate::project::Project;
use crate::status::ProjectStatus;

/// Decide whether `project` may move to `target`.
///
/// `Ok(None)` means the project is already there and nothing should change.
/// Leaving draft requires at least one priced line item.
pub(crate) fn decide_transition(
    project: &Project,
    target: ProjectStatus,
) -> DomainResult<Option<ProjectStatus>> {
    let current = project.status();
    if current == target {
        return Ok(None);
    }
    if !current.can_transition_to(target) {
        return Err(DomainError::invalid_transition(current, target));
    }
    if target == ProjectStatus::Sent && !project.has_priced_items() {
        return Err(DomainError::invalid_transition(current, target));
    }
    Ok(Some(target))
}

/// Move `project` to `target`, returning the updated project.
///
/// Only the status changes; items and totals are carried over as-is.
pub fn transition_status(project: &Project, target: ProjectStatus) -> DomainResult<Project> {
    if !project.exists() {
        return Err(DomainError::not_found("project", project.id_typed()));
    }

    let mut next = project.clone();
    if let Some(status) = decide_transition(project, target)? {
        next.set_status(status);
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wrapquote_catalog::{DifficultyId, EmployeeLevel, MaterialId};
    use wrapquote_clients::ClientId;
    use wrapquote_core::{Aggregate, AggregateId, Money, Quantity, Rate, TenantId};
    use wrapquote_pricing::{LineItemInput, PricingConfig, ResolvedRates};

    use crate::line_item::LineItemId;
    use crate::project::{AddItem, CreateProject, ProjectCommand, ProjectId};

    fn apply_all(project: &mut Project, command: ProjectCommand) {
        let events = project.handle(&command).unwrap();
        for e in &events {
            project.apply(e);
        }
    }

    fn draft(with_item: bool) -> Project {
        let tenant_id = TenantId::new();
        let project_id = ProjectId::new(AggregateId::new());
        let mut project = Project::empty(project_id);
        apply_all(
            &mut project,
            ProjectCommand::CreateProject(CreateProject {
                tenant_id,
                project_id,
                client_id: ClientId::new(AggregateId::new()),
                name: "Quarto".to_string(),
                pricing: PricingConfig::default(),
                items: vec![],
                occurred_at: Utc::now(),
            }),
        );
        if with_item {
            apply_all(
                &mut project,
                ProjectCommand::AddItem(AddItem {
                    tenant_id,
                    project_id,
                    item_id: LineItemId::new(AggregateId::new()),
                    input: LineItemInput {
                        material_id: MaterialId::new(AggregateId::new()),
                        difficulty_id: DifficultyId::new(AggregateId::new()),
                        employee_level: EmployeeLevel::SeniorWrapper,
                        quantity: Quantity::whole(4),
                        estimated_days: Quantity::whole(1),
                        crew_size: 1,
                    },
                    rates: ResolvedRates {
                        unit_cost: Money::from_major(25),
                        labor_multiplier: Rate::ONE,
                        hourly_rate: Money::from_major(45),
                    },
                    notes: None,
                    occurred_at: Utc::now(),
                }),
            );
        }
        project
    }

    #[test]
    fn draft_with_items_can_be_sent() {
        let project = draft(true);
        let sent = transition_status(&project, ProjectStatus::Sent).unwrap();
        assert_eq!(sent.status(), ProjectStatus::Sent);
        assert_eq!(sent.items(), project.items());
        assert_eq!(sent.estimated_total_cost(), project.estimated_total_cost());
        assert_eq!(project.status(), ProjectStatus::Draft);
    }

    #[test]
    fn empty_draft_cannot_be_sent() {
        let err = transition_status(&draft(false), ProjectStatus::Sent).unwrap_err();
        assert_eq!(err, DomainError::invalid_transition("draft", "sent"));
    }

    #[test]
    fn draft_cannot_jump_to_approved() {
        let err = transition_status(&draft(true), ProjectStatus::Approved).unwrap_err();
        assert_eq!(err, DomainError::invalid_transition("draft", "approved"));
    }

    #[test]
    fn sent_can_be_rejected_and_rejected_is_final() {
        let sent = transition_status(&draft(true), ProjectStatus::Sent).unwrap();
        let rejected = transition_status(&sent, ProjectStatus::Rejected).unwrap();
        assert_eq!(rejected.status(), ProjectStatus::Rejected);

        for target in [ProjectStatus::Draft, ProjectStatus::Sent, ProjectStatus::Approved] {
            assert!(matches!(
                transition_status(&rejected, target),
                Err(DomainError::InvalidTransition { .. })
            ));
        }
    }

    #[test]
    fn same_status_is_a_no_op() {
        let project = draft(false);
        assert_eq!(transition_status(&project, ProjectStatus::Draft).unwrap(), project);
    }

    #[test]
    fn uncreated_project_is_not_found() {
        let project = Project::empty(ProjectId::new(AggregateId::new()));
        assert!(matches!(
            transition_status(&project, ProjectStatus::Sent),
            Err(DomainError::NotFound { entity: "project", .. })
        ));
    }
}
