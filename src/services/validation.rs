//! Create/update shape rules for plan pattern transfer objects.
//!
//! Rules inside a group run in a fixed order and the first violation is the
//! only one reported. A missing nested object counts as "all fields null".

use crate::models::dto::{HumidityDto, MicroclimateDto, PlanParametersDto, PlanPatternDto};
use chrono::Timelike;
use core::fmt;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const MAX_TEMPERATURE_LEN: usize = 20;
pub const MAX_VENTILATION_LEN: usize = 100;
pub const MAX_TEMPERATURE_SKED_LEN: usize = 100;

/// Which rule group applies to a transfer object.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Violation {
    // Create
    DevicePresent,
    MicroclimatePresent,
    PlanParametersMissing,
    RelativeHumidityPresent,
    AbsoluteHumidityPresent,
    // Update
    TemperatureTooLong,
    VentilationTooLong,
    LightLevelNotPositive,
    RelativeHumidityNotPositive,
    AbsoluteHumidityNotPositive,
    TemperatureSkedMissing,
    TemperatureSkedTooLong,
    LightsOffTimeMissing,
    // Stored values
    TemperatureSkedEmpty,
}

impl Violation {
    pub fn message(&self) -> &'static str {
        match self {
            Violation::DevicePresent => "Device must be null at fulling the form",
            Violation::MicroclimatePresent => "Microclimate should be null while 1st time creating",
            Violation::PlanParametersMissing => "Plan parameters cannot be null",
            Violation::RelativeHumidityPresent => "Relative humidity must be null on creating plan parameters",
            Violation::AbsoluteHumidityPresent => "Absolute humidity must be null on creating plan parameters",
            Violation::TemperatureTooLong => "Max size of temperature is 20 characters",
            Violation::VentilationTooLong => "Max size of ventilation is 100 characters",
            Violation::LightLevelNotPositive => "Light level must be greater than 0",
            Violation::RelativeHumidityNotPositive => {
                "Relative humidity must be not null and greater than 0 on updating parameters"
            }
            Violation::AbsoluteHumidityNotPositive => {
                "Absolute humidity must be not null and greater than 0 on updating parameters"
            }
            Violation::TemperatureSkedMissing => {
                "Temperature schedule must be not null and not empty on updating parameters"
            }
            Violation::TemperatureSkedTooLong => "Max size of temperature schedule is 100 characters",
            Violation::LightsOffTimeMissing => "Time when lights go off must be not null on updating parameters",
            Violation::TemperatureSkedEmpty => "Temperature schedule must be not empty",
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for Violation {}

/// Validate `dto` for `kind`.
///
/// The create group only applies to objects without an id and the update group
/// only to objects with one; anything else passes untouched. Callers that need
/// a guaranteed check must set or clear the id first.
pub fn validate(dto: &PlanPatternDto, kind: OperationKind) -> Result<(), Violation> {
    match (kind, dto.id) {
        (OperationKind::Create, None) => validate_create(dto),
        (OperationKind::Update, Some(_)) => validate_update(dto),
        _ => Ok(()),
    }
}

fn humidity(dto: &PlanPatternDto) -> Option<&HumidityDto> {
    dto.microclimate.as_ref().and_then(|m| m.humidity.as_ref())
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn is_positive(v: Option<f32>) -> bool {
    v.is_some_and(|v| v > 0.0)
}

pub fn validate_create(dto: &PlanPatternDto) -> Result<(), Violation> {
    if dto.device.is_some() {
        return Err(Violation::DevicePresent);
    }
    if dto.microclimate.is_some() {
        return Err(Violation::MicroclimatePresent);
    }
    if dto.plan_parameters.is_none() {
        return Err(Violation::PlanParametersMissing);
    }
    // Humidity hangs off the microclimate, so these cannot fire after the check above.
    if humidity(dto).is_some_and(|h| h.relative_humidity.is_some()) {
        return Err(Violation::RelativeHumidityPresent);
    }
    if humidity(dto).is_some_and(|h| h.absolute_humidity.is_some()) {
        return Err(Violation::AbsoluteHumidityPresent);
    }
    Ok(())
}

/// Column limits on a microclimate that is about to be stored.
pub fn validate_microclimate_limits(m: &MicroclimateDto) -> Result<(), Violation> {
    if m.temperature.as_deref().is_some_and(|t| char_len(t) > MAX_TEMPERATURE_LEN) {
        return Err(Violation::TemperatureTooLong);
    }
    if m.ventilation.as_deref().is_some_and(|v| char_len(v) > MAX_VENTILATION_LEN) {
        return Err(Violation::VentilationTooLong);
    }
    Ok(())
}

/// Column limits on plan parameters that are about to be stored. A schedule
/// may be absent, but a present one holds 1 to 100 characters.
pub fn validate_plan_parameters_limits(p: &PlanParametersDto) -> Result<(), Violation> {
    match p.temperature_sked.as_deref() {
        Some("") => Err(Violation::TemperatureSkedEmpty),
        Some(s) if char_len(s) > MAX_TEMPERATURE_SKED_LEN => Err(Violation::TemperatureSkedTooLong),
        _ => Ok(()),
    }
}

pub fn validate_update(dto: &PlanPatternDto) -> Result<(), Violation> {
    let microclimate = dto.microclimate.as_ref();
    let humidity = humidity(dto);
    let params = dto.plan_parameters.as_ref();

    if let Some(m) = microclimate {
        validate_microclimate_limits(m)?;
    }
    if !is_positive(microclimate.and_then(|m| m.light_level)) {
        return Err(Violation::LightLevelNotPositive);
    }
    if !is_positive(humidity.and_then(|h| h.relative_humidity)) {
        return Err(Violation::RelativeHumidityNotPositive);
    }
    if !is_positive(humidity.and_then(|h| h.absolute_humidity)) {
        return Err(Violation::AbsoluteHumidityNotPositive);
    }
    let sked = match params.and_then(|p| p.temperature_sked.as_deref()) {
        Some(s) if !s.is_empty() => s,
        _ => return Err(Violation::TemperatureSkedMissing),
    };
    if char_len(sked) > MAX_TEMPERATURE_SKED_LEN {
        return Err(Violation::TemperatureSkedTooLong);
    }
    match params.and_then(|p| p.lights_off_time) {
        Some(t) if t.hour() <= 23 => Ok(()),
        _ => Err(Violation::LightsOffTimeMissing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn valid_update() -> PlanPatternDto {
        PlanPatternDto {
            id: Some(1),
            device: Some("DeviceTypeA".into()),
            microclimate: Some(MicroclimateDto {
                temperature: Some("25".into()),
                ventilation: Some("TypeB".into()),
                light_level: Some(0.7),
                humidity: Some(HumidityDto {
                    relative_humidity: Some(50.0),
                    absolute_humidity: Some(10.0),
                }),
            }),
            plan_parameters: Some(PlanParametersDto {
                temperature_sked: Some("Every 2 hours".into()),
                lights_off_time: NaiveTime::from_hms_opt(23, 0, 0),
            }),
            microclimate_plan_ids: None,
        }
    }

    fn valid_create() -> PlanPatternDto {
        PlanPatternDto {
            plan_parameters: Some(PlanParametersDto {
                temperature_sked: Some("Every 4 hours".into()),
                lights_off_time: NaiveTime::from_hms_opt(20, 0, 0),
            }),
            ..PlanPatternDto::default()
        }
    }

    fn micro(dto: &mut PlanPatternDto) -> &mut MicroclimateDto {
        dto.microclimate.as_mut().unwrap()
    }

    fn params(dto: &mut PlanPatternDto) -> &mut PlanParametersDto {
        dto.plan_parameters.as_mut().unwrap()
    }

    #[test]
    fn accepts_fully_specified_update() {
        assert_eq!(validate(&valid_update(), OperationKind::Update), Ok(()));
    }

    #[test]
    fn accepts_template_create() {
        assert_eq!(validate(&valid_create(), OperationKind::Create), Ok(()));
    }

    #[test]
    fn create_rejects_preset_fields_in_order() {
        let mut dto = valid_create();
        dto.device = Some("early".into());
        dto.microclimate = Some(MicroclimateDto::default());
        assert_eq!(validate(&dto, OperationKind::Create), Err(Violation::DevicePresent));

        dto.device = None;
        assert_eq!(validate(&dto, OperationKind::Create), Err(Violation::MicroclimatePresent));

        dto.microclimate = None;
        dto.plan_parameters = None;
        assert_eq!(validate(&dto, OperationKind::Create), Err(Violation::PlanParametersMissing));
    }

    #[test]
    fn overlong_temperature_wins_over_everything_else() {
        let mut dto = PlanPatternDto {
            id: Some(1),
            microclimate: Some(MicroclimateDto {
                temperature: Some("100912345678901234567890".into()),
                ventilation: Some("x".repeat(500)),
                light_level: Some(-3.0),
                humidity: None,
            }),
            ..PlanPatternDto::default()
        };
        assert_eq!(validate(&dto, OperationKind::Update), Err(Violation::TemperatureTooLong));

        micro(&mut dto).temperature = Some("x".repeat(MAX_TEMPERATURE_LEN));
        assert_eq!(validate(&dto, OperationKind::Update), Err(Violation::VentilationTooLong));
    }

    #[test]
    fn temperature_length_counts_characters_not_bytes() {
        let mut dto = valid_update();
        // 20 characters, 21 bytes
        micro(&mut dto).temperature = Some(format!("{}°", "1".repeat(19)));
        assert_eq!(validate(&dto, OperationKind::Update), Ok(()));
    }

    #[test]
    fn update_rules_fire_in_declared_order() {
        let mut dto = valid_update();
        let p = params(&mut dto);
        p.temperature_sked = None;
        p.lights_off_time = None;
        let m = micro(&mut dto);
        m.light_level = Some(0.0);
        m.humidity = None;

        let expected = [
            Violation::LightLevelNotPositive,
            Violation::RelativeHumidityNotPositive,
            Violation::AbsoluteHumidityNotPositive,
            Violation::TemperatureSkedMissing,
            Violation::TemperatureSkedTooLong,
            Violation::LightsOffTimeMissing,
        ];
        for violation in expected {
            assert_eq!(validate(&dto, OperationKind::Update), Err(violation));
            match violation {
                Violation::LightLevelNotPositive => micro(&mut dto).light_level = Some(0.8),
                Violation::RelativeHumidityNotPositive => {
                    micro(&mut dto).humidity = Some(HumidityDto {
                        relative_humidity: Some(40.0),
                        absolute_humidity: Some(-22.1),
                    })
                }
                Violation::AbsoluteHumidityNotPositive => {
                    micro(&mut dto).humidity.as_mut().unwrap().absolute_humidity = Some(9.0)
                }
                Violation::TemperatureSkedMissing => params(&mut dto).temperature_sked = Some("s".repeat(101)),
                Violation::TemperatureSkedTooLong => params(&mut dto).temperature_sked = Some("Hourly".into()),
                _ => params(&mut dto).lights_off_time = NaiveTime::from_hms_opt(6, 15, 0),
            }
        }
        assert_eq!(validate(&dto, OperationKind::Update), Ok(()));
    }

    #[test]
    fn missing_relative_humidity_reports_its_message() {
        let mut dto = valid_update();
        let m = micro(&mut dto);
        m.temperature = Some("22°C".into());
        m.light_level = Some(0.8);
        m.humidity = None;
        let err = validate(&dto, OperationKind::Update).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Relative humidity must be not null and greater than 0 on updating parameters"
        );
    }

    #[test]
    fn empty_schedule_is_treated_as_missing() {
        let mut dto = valid_update();
        params(&mut dto).temperature_sked = Some(String::new());
        assert_eq!(validate(&dto, OperationKind::Update), Err(Violation::TemperatureSkedMissing));
    }

    #[test]
    fn update_without_microclimate_fails_on_light_level() {
        let mut dto = valid_update();
        dto.microclimate = None;
        assert_eq!(validate(&dto, OperationKind::Update), Err(Violation::LightLevelNotPositive));
    }

    #[test]
    fn stored_schedule_must_fit_its_column() {
        let mut dto = valid_create();
        params(&mut dto).temperature_sked = Some("s".repeat(150));
        assert_eq!(
            validate_plan_parameters_limits(params(&mut dto)),
            Err(Violation::TemperatureSkedTooLong)
        );
        params(&mut dto).temperature_sked = Some(String::new());
        assert_eq!(
            validate_plan_parameters_limits(params(&mut dto)),
            Err(Violation::TemperatureSkedEmpty)
        );
        params(&mut dto).temperature_sked = None;
        assert_eq!(validate_plan_parameters_limits(params(&mut dto)), Ok(()));
    }

    #[test]
    fn stored_microclimate_must_fit_its_columns() {
        let mut m = MicroclimateDto {
            temperature: Some("t".repeat(MAX_TEMPERATURE_LEN + 10)),
            ..MicroclimateDto::default()
        };
        assert_eq!(validate_microclimate_limits(&m), Err(Violation::TemperatureTooLong));
        m.temperature = None;
        m.ventilation = Some("v".repeat(MAX_VENTILATION_LEN + 1));
        assert_eq!(validate_microclimate_limits(&m), Err(Violation::VentilationTooLong));
        m.ventilation = Some("v".repeat(MAX_VENTILATION_LEN));
        assert_eq!(validate_microclimate_limits(&m), Ok(()));
    }

    #[test]
    fn mismatched_id_and_kind_skip_validation() {
        let mut update_without_id = valid_update();
        update_without_id.id = None;
        micro(&mut update_without_id).light_level = Some(-1.0);
        assert_eq!(validate(&update_without_id, OperationKind::Update), Ok(()));

        let mut create_with_id = valid_create();
        create_with_id.id = Some(4);
        create_with_id.device = Some("set".into());
        assert_eq!(validate(&create_with_id, OperationKind::Create), Ok(()));
    }
}
