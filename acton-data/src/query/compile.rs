//! Translation of a [`CommonCondition`] onto statement builders

use crate::condition::{CommonCondition, Condition, Paging, Sorting};
use crate::error::CompileError;

use super::predicate::Predicate;
use super::select::SelectBuilder;
use super::update::UpdateBuilder;

/// Add one WHERE predicate per condition
///
/// Fails on the first condition whose operator token is not recognised.
pub fn build_conditions(
    mut select: SelectBuilder,
    conditions: &[Condition],
) -> Result<SelectBuilder, CompileError> {
    for condition in conditions {
        select = select.and_where(Predicate::from_condition(condition)?);
    }
    Ok(select)
}

/// Add one ORDER BY term per sort key, in order
pub fn build_sorting(mut select: SelectBuilder, sorting: &[Sorting]) -> SelectBuilder {
    for sort in sorting {
        select = select.order_by(sort.field.clone(), sort.order);
    }
    select
}

/// Add LIMIT/OFFSET when both page and limit are non-zero
pub fn build_paging(select: SelectBuilder, paging: Option<&mut Paging>) -> SelectBuilder {
    match paging {
        Some(paging) if paging.is_requested() => {
            let (limit, offset) = paging.limit_offset();
            select.limit(limit).offset(offset)
        }
        _ => select,
    }
}

/// Apply conditions, sorting and paging in that order
pub fn build_query(
    select: SelectBuilder,
    mut condition: CommonCondition,
) -> Result<SelectBuilder, CompileError> {
    let select = build_conditions(select, &condition.conditions)?;
    let select = build_sorting(select, &condition.sorting);
    Ok(build_paging(select, condition.paging.as_mut()))
}

/// Add one WHERE predicate per condition to an UPDATE
pub fn build_update_conditions(
    mut update: UpdateBuilder,
    conditions: &[Condition],
) -> Result<UpdateBuilder, CompileError> {
    for condition in conditions {
        update = update.and_where(Predicate::from_condition(condition)?);
    }
    Ok(update)
}

/// `SELECT count(*)` over the condition's predicates; sorting and paging are ignored
pub fn build_count(table: &str, condition: &CommonCondition) -> Result<SelectBuilder, CompileError> {
    build_query(SelectBuilder::count(table), condition.filters_only())
}
