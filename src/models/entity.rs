//! Domain records as the services see them.
//!
//! Ids are `None` until the store assigns them on insert. Owned records
//! (humidity inside a microclimate, plan parameters inside a plan pattern) are
//! embedded; everything else is referenced by id and looked up explicitly.

use chrono::NaiveTime;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Humidity {
    pub id: Option<i32>,
    pub relative_humidity: Option<f32>,
    pub absolute_humidity: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Microclimate {
    pub id: Option<i32>,
    pub temperature: Option<String>,
    pub ventilation: Option<String>,
    pub light_level: Option<f32>,
    pub humidity: Option<Humidity>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanParameters {
    pub id: Option<i32>,
    pub temperature_sked: Option<String>,
    pub lights_off_time: Option<NaiveTime>,
}

/// The PlanPattern aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanPattern {
    pub id: Option<i32>,
    pub device: Option<String>,
    /// Referenced, not owned: saving a pattern only stores the association.
    pub microclimate: Option<Microclimate>,
    /// Ids of the microclimate plans pointing at this pattern.
    /// `None` means "leave the existing links alone" when saving.
    pub microclimate_plan_ids: Option<Vec<i32>>,
    pub plan_parameters: Option<PlanParameters>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: Option<i32>,
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Theme {
    pub id: Option<i32>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopicInfo {
    pub id: Option<i32>,
    pub description: Option<String>,
    pub topic_type: Option<String>,
    pub info: Option<Vec<u8>>,
    pub theme_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MicroclimatePlan {
    pub id: Option<i32>,
    pub plan_pattern_id: Option<i32>,
    /// Snapshot stored as a fresh microclimate row on insert.
    pub initial_microclimate: Option<Microclimate>,
    pub user_id: Option<i32>,
    pub topic_id: Option<i32>,
}
