//! CRUD operations on the plan pattern aggregate.
//!
//! Every operation is fetch, validate, merge, persist, map back, run to
//! completion against whatever store the caller holds.

use crate::db::store::{CatalogStore, PlanPatternStore};
use crate::mapper;
use crate::models::dto::PlanPatternDto;
use crate::services::error::ServiceError;
use crate::services::plans::PLAN_NOT_FOUND;
use crate::services::validation::{OperationKind, validate, validate_plan_parameters_limits};
use log::{debug, info, warn};

pub const NOT_FOUND: &str = "Plan pattern not found";

fn not_found(id: i32) -> ServiceError {
    debug!("Plan pattern {} does not exist", id);
    ServiceError::NotFound(NOT_FOUND.to_string())
}

/// Store a new pattern in its template phase.
///
/// Any id sent by the client is dropped, so the create rules always apply.
pub fn create<S: PlanPatternStore + ?Sized>(store: &mut S, dto: PlanPatternDto) -> Result<PlanPatternDto, ServiceError> {
    let dto = PlanPatternDto { id: None, ..dto };
    validate(&dto, OperationKind::Create)
        .and_then(|()| dto.plan_parameters.as_ref().map_or(Ok(()), validate_plan_parameters_limits))
        .inspect_err(|v| warn!("Rejected plan pattern create: {}", v))?;

    let saved = store.save_plan_pattern(&mapper::to_plan_pattern(&dto))?;
    info!("Created plan pattern {:?}", saved.id);
    Ok(mapper::to_plan_pattern_dto(&saved))
}

/// Apply an update to an existing pattern.
///
/// Only device, plan parameters and (when listed) plan links are taken from
/// `dto`; the stored microclimate association is kept as is. Every listed
/// microclimate plan must exist.
pub fn update<S: PlanPatternStore + CatalogStore + ?Sized>(
    store: &mut S,
    id: i32,
    dto: PlanPatternDto,
) -> Result<PlanPatternDto, ServiceError> {
    let mut existing = store.find_plan_pattern(id)?.ok_or_else(|| not_found(id))?;

    let dto = PlanPatternDto { id: Some(id), ..dto };
    validate(&dto, OperationKind::Update).inspect_err(|v| warn!("Rejected plan pattern {} update: {}", id, v))?;

    for plan_id in dto.microclimate_plan_ids.iter().flatten() {
        if store.find_microclimate_plan(*plan_id)?.is_none() {
            warn!("Rejected plan pattern {} update: no microclimate plan {}", id, plan_id);
            return Err(ServiceError::NotFound(PLAN_NOT_FOUND.to_string()));
        }
    }

    let incoming = mapper::to_plan_pattern(&dto);
    // None leaves the stored links untouched on save.
    existing.microclimate_plan_ids = incoming.microclimate_plan_ids;
    existing.device = incoming.device;
    existing.plan_parameters = incoming.plan_parameters;

    let saved = store.save_plan_pattern(&existing)?;
    info!("Updated plan pattern {}", id);
    Ok(mapper::to_plan_pattern_dto(&saved))
}

pub fn delete<S: PlanPatternStore + ?Sized>(store: &mut S, id: i32) -> Result<(), ServiceError> {
    if store.find_plan_pattern(id)?.is_none() {
        return Err(not_found(id));
    }
    store.delete_plan_pattern(id)?;
    info!("Deleted plan pattern {}", id);
    Ok(())
}

pub fn get_by_id<S: PlanPatternStore + ?Sized>(store: &mut S, id: i32) -> Result<PlanPatternDto, ServiceError> {
    let pattern = store.find_plan_pattern(id)?.ok_or_else(|| not_found(id))?;
    debug!("Loaded plan pattern {}", id);
    Ok(mapper::to_plan_pattern_dto(&pattern))
}

pub fn get_all<S: PlanPatternStore + ?Sized>(store: &mut S) -> Result<Vec<PlanPatternDto>, ServiceError> {
    let patterns = store.list_plan_patterns()?;
    debug!("Loaded {} plan patterns", patterns.len());
    Ok(mapper::to_plan_pattern_dtos(&patterns))
}
