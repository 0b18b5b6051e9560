use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wrapquote_clients::Client;
use wrapquote_core::{DomainError, DomainResult, Money};
use wrapquote_projects::{Project, ProjectStatus};

/// Read model: dashboard metrics over one tenant's clients and projects.
///
/// Tracks:
/// - `total_revenue`: sum of `suggested_selling_price` over approved projects
/// - `projects_by_status`: a count for every status, zero included
/// - `approval_rate`: approved / total projects
/// - `average_ticket`: total revenue / approved projects
/// - `projects_per_client`: total projects / total clients
///
/// Every ratio is zero when its denominator is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub total_clients: u64,
    pub total_projects: u64,
    pub approved_projects_count: u64,
    pub total_revenue: Money,
    pub projects_by_status: BTreeMap<ProjectStatus, u64>,
    pub approval_rate: f64,
    pub average_ticket: Money,
    pub projects_per_client: f64,
}

impl Default for PortfolioStats {
    fn default() -> Self {
        Self {
            total_clients: 0,
            total_projects: 0,
            approved_projects_count: 0,
            total_revenue: Money::ZERO,
            projects_by_status: ProjectStatus::ALL.iter().map(|s| (*s, 0)).collect(),
            approval_rate: 0.0,
            average_ticket: Money::ZERO,
            projects_per_client: 0.0,
        }
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Fold `clients` and `projects` into a [`PortfolioStats`] snapshot.
///
/// Deleted projects are skipped. The result does not depend on input order.
/// Approved revenue that does not fit in `Money` is `InvalidInput` on `amount`.
pub fn compute_portfolio_stats(clients: &[Client], projects: &[Project]) -> DomainResult<PortfolioStats> {
    let mut stats = PortfolioStats {
        total_clients: clients.len() as u64,
        ..PortfolioStats::default()
    };

    for project in projects.iter().filter(|p| p.exists()) {
        stats.total_projects += 1;
        *stats.projects_by_status.entry(project.status()).or_insert(0) += 1;

        if project.status() == ProjectStatus::Approved {
            stats.approved_projects_count += 1;
            stats.total_revenue = stats
                .total_revenue
                .checked_add(project.suggested_selling_price())
                .ok_or_else(|| DomainError::invalid_input("amount", "approved revenue overflows"))?;
        }
    }

    stats.approval_rate = ratio(stats.approved_projects_count, stats.total_projects);
    stats.average_ticket = stats.total_revenue.split_even(stats.approved_projects_count);
    stats.projects_per_client = ratio(stats.total_projects, stats.total_clients);
    Ok(stats)
}
