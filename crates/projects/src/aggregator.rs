//! Project totals.
//!
//! A project's `estimated_total_cost` and `suggested_selling_price` are the
//! sums of its items' `total_cost` and `selling_price`. Item values are
//! already rounded, so the sums are exact. A sum that does not fit in `Money`
//! is `InvalidInput` on `amount`, the same as an overflowing line item.

use wrapquote_core::{DomainError, DomainResult, Money};

use crate::line_item::LineItem;
use crate::project::Project;

/// Sum `(total_cost, selling_price)` over `items`. Empty input folds to zero.
pub fn fold_totals(items: &[LineItem]) -> DomainResult<(Money, Money)> {
    items
        .iter()
        .try_fold((Money::ZERO, Money::ZERO), |(total, selling), item| {
            Some((
                total.checked_add(item.total_cost())?,
                selling.checked_add(item.selling_price())?,
            ))
        })
        .ok_or_else(|| DomainError::invalid_input("amount", "project totals overflow"))
}

/// Reprice every item of `project` from its own inputs, then re-fold totals.
///
/// Pure: returns a new project value and leaves `project` untouched. If any
/// item fails to price, nothing is returned but the error.
pub fn recompute_project(project: &Project) -> DomainResult<Project> {
    let items = project
        .items()
        .iter()
        .map(LineItem::repriced)
        .collect::<DomainResult<Vec<_>>>()?;
    fold_totals(&items)?;

    let mut next = project.clone();
    next.replace_items(items);
    Ok(next)
}
