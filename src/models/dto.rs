//! Transfer objects exchanged over HTTP.
//!
//! Every field is optional on the wire; shape rules live in
//! `services::validation`, not in the types.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HumidityDto {
    pub relative_humidity: Option<f32>,
    pub absolute_humidity: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MicroclimateDto {
    pub temperature: Option<String>,
    pub ventilation: Option<String>,
    pub light_level: Option<f32>,
    pub humidity: Option<HumidityDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanParametersDto {
    pub temperature_sked: Option<String>,
    /// Serialized as `HH:MM:SS`.
    pub lights_off_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanPatternDto {
    pub id: Option<i32>,
    pub device: Option<String>,
    #[serde(alias = "microclimateDTO")]
    pub microclimate: Option<MicroclimateDto>,
    #[serde(alias = "planParametersDTO")]
    pub plan_parameters: Option<PlanParametersDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microclimate_plan_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDto {
    pub id: Option<i32>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeDto {
    pub id: Option<i32>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopicInfoDto {
    pub id: Option<i32>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub topic_type: Option<String>,
    pub info: Option<Vec<u8>>,
    pub theme_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MicroclimatePlanDto {
    pub id: Option<i32>,
    pub plan_pattern_id: Option<i32>,
    pub initial_microclimate: Option<MicroclimateDto>,
    pub user_id: Option<i32>,
    pub topic_id: Option<i32>,
}

/// Machine-readable outcome carried in every response envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseCode {
    Ok,
    EntityNotFound,
    InvalidData,
    InternalError,
}

/// Response envelope: `{success, statusCode, statusMessage, results}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteResponse<T> {
    pub success: bool,
    pub status_code: ResponseCode,
    pub status_message: String,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

impl<T> RemoteResponse<T> {
    pub fn ok(message: impl Into<String>, results: Vec<T>) -> Self {
        RemoteResponse {
            success: true,
            status_code: ResponseCode::Ok,
            status_message: message.into(),
            results,
        }
    }

    pub fn failure(code: ResponseCode, message: impl Into<String>) -> Self {
        RemoteResponse {
            success: false,
            status_code: code,
            status_message: message.into(),
            results: Vec::new(),
        }
    }
}
