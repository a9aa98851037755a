//! Users and the microclimate plans they run.

use crate::db::store::{CatalogStore, PlanPatternStore};
use crate::mapper;
use crate::models::dto::{MicroclimatePlanDto, UserDto};
use crate::services::error::ServiceError;
use crate::services::plan_pattern;
use crate::services::topics::TOPIC_NOT_FOUND;
use crate::services::validation::validate_microclimate_limits;
use log::{debug, info, warn};

pub const MAX_USERNAME_LEN: usize = 50;
pub const USER_NOT_FOUND: &str = "User not found";
pub const PLAN_NOT_FOUND: &str = "Microclimate plan not found";

pub fn create_user<S: CatalogStore + ?Sized>(store: &mut S, dto: UserDto) -> Result<UserDto, ServiceError> {
    let user = mapper::to_user(&UserDto { id: None, ..dto });
    let reason = if user.username.trim().is_empty() {
        Some("Username must be not null and not empty")
    } else if user.username.chars().count() > MAX_USERNAME_LEN {
        Some("Max size of username is 50 characters")
    } else {
        None
    };
    if let Some(reason) = reason {
        warn!("Rejected user create: {}", reason);
        return Err(ServiceError::InvalidInput(reason.to_string()));
    }

    let saved = store.insert_user(&user)?;
    info!("Created user {:?}", saved.id);
    Ok(mapper::to_user_dto(&saved))
}

/// Store a plan. Referenced pattern, user and topic must exist when given, and
/// the initial microclimate snapshot must fit its columns.
pub fn create_microclimate_plan<S: PlanPatternStore + CatalogStore + ?Sized>(
    store: &mut S,
    dto: MicroclimatePlanDto,
) -> Result<MicroclimatePlanDto, ServiceError> {
    if let Some(m) = &dto.initial_microclimate {
        validate_microclimate_limits(m).inspect_err(|v| warn!("Rejected microclimate plan create: {}", v))?;
    }
    let plan = mapper::to_microclimate_plan(&MicroclimatePlanDto { id: None, ..dto });

    if let Some(id) = plan.plan_pattern_id
        && store.find_plan_pattern(id)?.is_none()
    {
        return Err(ServiceError::NotFound(plan_pattern::NOT_FOUND.to_string()));
    }
    if let Some(id) = plan.user_id
        && store.find_user(id)?.is_none()
    {
        return Err(ServiceError::NotFound(USER_NOT_FOUND.to_string()));
    }
    if let Some(id) = plan.topic_id
        && store.find_topic(id)?.is_none()
    {
        return Err(ServiceError::NotFound(TOPIC_NOT_FOUND.to_string()));
    }

    let saved = store.insert_microclimate_plan(&plan)?;
    info!(
        "Created microclimate plan {:?} (plan pattern {:?}, user {:?})",
        saved.id, saved.plan_pattern_id, saved.user_id
    );
    Ok(mapper::to_microclimate_plan_dto(&saved))
}

pub fn get_microclimate_plan<S: CatalogStore + ?Sized>(store: &mut S, id: i32) -> Result<MicroclimatePlanDto, ServiceError> {
    let plan = store
        .find_microclimate_plan(id)?
        .ok_or_else(|| ServiceError::NotFound(PLAN_NOT_FOUND.to_string()))?;
    debug!("Loaded microclimate plan {}", id);
    Ok(mapper::to_microclimate_plan_dto(&plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::dto::{HumidityDto, MicroclimateDto, PlanParametersDto, PlanPatternDto};
    use chrono::NaiveTime;

    fn user(name: &str) -> UserDto {
        UserDto {
            id: None,
            username: Some(name.into()),
            email: Some(format!("{name}@example.org")),
        }
    }

    #[test]
    fn username_is_required_and_bounded() {
        let mut store = MemoryStore::new();
        assert!(matches!(
            create_user(&mut store, UserDto::default()),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            create_user(&mut store, user(&"u".repeat(51))),
            Err(ServiceError::InvalidInput(_))
        ));
        let created = create_user(&mut store, user(&"u".repeat(50))).unwrap();
        assert_eq!(created.id, Some(1));
    }

    #[test]
    fn plan_links_back_to_its_pattern() {
        let mut store = MemoryStore::new();
        let pattern = plan_pattern::create(
            &mut store,
            PlanPatternDto {
                plan_parameters: Some(PlanParametersDto {
                    temperature_sked: Some("Every 3 hours".into()),
                    lights_off_time: NaiveTime::from_hms_opt(22, 0, 0),
                }),
                ..PlanPatternDto::default()
            },
        )
        .unwrap();
        let owner = create_user(&mut store, user("grower")).unwrap();

        let plan = create_microclimate_plan(
            &mut store,
            MicroclimatePlanDto {
                plan_pattern_id: pattern.id,
                user_id: owner.id,
                initial_microclimate: Some(MicroclimateDto {
                    temperature: Some("20".into()),
                    humidity: Some(HumidityDto {
                        relative_humidity: Some(55.0),
                        absolute_humidity: None,
                    }),
                    ..MicroclimateDto::default()
                }),
                ..MicroclimatePlanDto::default()
            },
        )
        .unwrap();
        assert_eq!(get_microclimate_plan(&mut store, plan.id.unwrap()).unwrap(), plan);

        let reloaded = plan_pattern::get_by_id(&mut store, pattern.id.unwrap()).unwrap();
        assert_eq!(reloaded.microclimate_plan_ids, Some(vec![plan.id.unwrap()]));
    }

    #[test]
    fn dangling_references_name_the_missing_entity() {
        let mut store = MemoryStore::new();
        let with = |dto: MicroclimatePlanDto, store: &mut MemoryStore| create_microclimate_plan(store, dto).unwrap_err();

        let err = with(
            MicroclimatePlanDto {
                plan_pattern_id: Some(9),
                ..MicroclimatePlanDto::default()
            },
            &mut store,
        );
        assert_eq!(err, ServiceError::NotFound(plan_pattern::NOT_FOUND.into()));
        let err = with(
            MicroclimatePlanDto {
                user_id: Some(9),
                ..MicroclimatePlanDto::default()
            },
            &mut store,
        );
        assert_eq!(err, ServiceError::NotFound(USER_NOT_FOUND.into()));
        let err = with(
            MicroclimatePlanDto {
                topic_id: Some(9),
                ..MicroclimatePlanDto::default()
            },
            &mut store,
        );
        assert_eq!(err, ServiceError::NotFound(TOPIC_NOT_FOUND.into()));
        assert_eq!(
            get_microclimate_plan(&mut store, 9).unwrap_err(),
            ServiceError::NotFound(PLAN_NOT_FOUND.into())
        );
    }

    #[test]
    fn initial_microclimate_must_fit_its_columns() {
        let mut store = MemoryStore::new();
        let with = |temperature: String| MicroclimatePlanDto {
            initial_microclimate: Some(MicroclimateDto {
                temperature: Some(temperature),
                ..MicroclimateDto::default()
            }),
            ..MicroclimatePlanDto::default()
        };

        let err = create_microclimate_plan(&mut store, with("t".repeat(30))).unwrap_err();
        assert_eq!(err, ServiceError::InvalidInput("Max size of temperature is 20 characters".into()));
        assert_eq!(
            get_microclimate_plan(&mut store, 1).unwrap_err(),
            ServiceError::NotFound(PLAN_NOT_FOUND.into())
        );

        let plan = create_microclimate_plan(&mut store, with("t".repeat(20))).unwrap();
        assert_eq!(plan.id, Some(1));
    }
}
