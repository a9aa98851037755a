//! Pure field-by-field transforms between entities and transfer objects.

use crate::models::dto::{
    HumidityDto, MicroclimateDto, MicroclimatePlanDto, PlanParametersDto, PlanPatternDto, ThemeDto, TopicInfoDto,
    UserDto,
};
use crate::models::entity::{Humidity, Microclimate, MicroclimatePlan, PlanParameters, PlanPattern, Theme, TopicInfo, User};

pub fn to_humidity_dto(h: &Humidity) -> HumidityDto {
    HumidityDto {
        relative_humidity: h.relative_humidity,
        absolute_humidity: h.absolute_humidity,
    }
}

pub fn to_humidity(dto: &HumidityDto) -> Humidity {
    Humidity {
        id: None,
        relative_humidity: dto.relative_humidity,
        absolute_humidity: dto.absolute_humidity,
    }
}

pub fn to_microclimate_dto(m: &Microclimate) -> MicroclimateDto {
    MicroclimateDto {
        temperature: m.temperature.clone(),
        ventilation: m.ventilation.clone(),
        light_level: m.light_level,
        humidity: m.humidity.as_ref().map(to_humidity_dto),
    }
}

pub fn to_microclimate(dto: &MicroclimateDto) -> Microclimate {
    Microclimate {
        id: None,
        temperature: dto.temperature.clone(),
        ventilation: dto.ventilation.clone(),
        light_level: dto.light_level,
        humidity: dto.humidity.as_ref().map(to_humidity),
    }
}

pub fn to_plan_parameters_dto(p: &PlanParameters) -> PlanParametersDto {
    PlanParametersDto {
        temperature_sked: p.temperature_sked.clone(),
        lights_off_time: p.lights_off_time,
    }
}

pub fn to_plan_parameters(dto: &PlanParametersDto) -> PlanParameters {
    PlanParameters {
        id: None,
        temperature_sked: dto.temperature_sked.clone(),
        lights_off_time: dto.lights_off_time,
    }
}

pub fn to_plan_pattern_dto(p: &PlanPattern) -> PlanPatternDto {
    PlanPatternDto {
        id: p.id,
        device: p.device.clone(),
        microclimate: p.microclimate.as_ref().map(to_microclimate_dto),
        plan_parameters: p.plan_parameters.as_ref().map(to_plan_parameters_dto),
        microclimate_plan_ids: p.microclimate_plan_ids.clone(),
    }
}

pub fn to_plan_pattern(dto: &PlanPatternDto) -> PlanPattern {
    PlanPattern {
        id: dto.id,
        device: dto.device.clone(),
        microclimate: dto.microclimate.as_ref().map(to_microclimate),
        microclimate_plan_ids: dto.microclimate_plan_ids.clone(),
        plan_parameters: dto.plan_parameters.as_ref().map(to_plan_parameters),
    }
}

pub fn to_plan_pattern_dtos(patterns: &[PlanPattern]) -> Vec<PlanPatternDto> {
    patterns.iter().map(to_plan_pattern_dto).collect()
}

pub fn to_user_dto(u: &User) -> UserDto {
    UserDto {
        id: u.id,
        username: Some(u.username.clone()),
        email: u.email.clone(),
    }
}

/// Missing usernames map to an empty string; the user service rejects it.
pub fn to_user(dto: &UserDto) -> User {
    User {
        id: dto.id,
        username: dto.username.clone().unwrap_or_default(),
        email: dto.email.clone(),
    }
}

pub fn to_theme_dto(t: &Theme) -> ThemeDto {
    ThemeDto {
        id: t.id,
        title: t.title.clone(),
    }
}

pub fn to_theme(dto: &ThemeDto) -> Theme {
    Theme {
        id: dto.id,
        title: dto.title.clone(),
    }
}

pub fn to_topic_info_dto(t: &TopicInfo) -> TopicInfoDto {
    TopicInfoDto {
        id: t.id,
        description: t.description.clone(),
        topic_type: t.topic_type.clone(),
        info: t.info.clone(),
        theme_ids: t.theme_ids.clone(),
    }
}

pub fn to_topic_info(dto: &TopicInfoDto) -> TopicInfo {
    TopicInfo {
        id: dto.id,
        description: dto.description.clone(),
        topic_type: dto.topic_type.clone(),
        info: dto.info.clone(),
        theme_ids: dto.theme_ids.clone(),
    }
}

pub fn to_microclimate_plan_dto(p: &MicroclimatePlan) -> MicroclimatePlanDto {
    MicroclimatePlanDto {
        id: p.id,
        plan_pattern_id: p.plan_pattern_id,
        initial_microclimate: p.initial_microclimate.as_ref().map(to_microclimate_dto),
        user_id: p.user_id,
        topic_id: p.topic_id,
    }
}

pub fn to_microclimate_plan(dto: &MicroclimatePlanDto) -> MicroclimatePlan {
    MicroclimatePlan {
        id: dto.id,
        plan_pattern_id: dto.plan_pattern_id,
        initial_microclimate: dto.initial_microclimate.as_ref().map(to_microclimate),
        user_id: dto.user_id,
        topic_id: dto.topic_id,
    }
}
