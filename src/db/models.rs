//! Diesel row structs for the relational schema.
//!
//! Owned children (`humidities`, `plan_parameters`) carry their owner's key and
//! are removed by `ON DELETE CASCADE`. Every other association is a nullable
//! foreign key resolved by the store when an aggregate is loaded.

use chrono::NaiveTime;
use diesel::prelude::*;

use crate::schema;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::users)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::microclimates)]
pub struct Microclimate {
    pub id: i32,
    pub temperature: Option<String>,
    pub ventilation: Option<String>,
    pub light_level: Option<f32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::microclimates)]
pub struct NewMicroclimate {
    pub temperature: Option<String>,
    pub ventilation: Option<String>,
    pub light_level: Option<f32>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = schema::humidities)]
#[diesel(belongs_to(Microclimate))]
pub struct Humidity {
    pub id: i32,
    pub microclimate_id: i32,
    pub relative_humidity: Option<f32>,
    pub absolute_humidity: Option<f32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::humidities)]
pub struct NewHumidity {
    pub microclimate_id: i32,
    pub relative_humidity: Option<f32>,
    pub absolute_humidity: Option<f32>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::plan_patterns)]
pub struct PlanPattern {
    pub id: i32,
    pub device: Option<String>,
    pub microclimate_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::plan_patterns)]
pub struct NewPlanPattern {
    pub device: Option<String>,
    pub microclimate_id: Option<i32>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::plan_patterns)]
#[diesel(treat_none_as_null = true)]
pub struct PlanPatternChanges {
    pub device: Option<String>,
    pub microclimate_id: Option<i32>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = schema::plan_parameters)]
#[diesel(belongs_to(PlanPattern))]
pub struct PlanParameters {
    pub id: i32,
    pub plan_pattern_id: i32,
    pub temperature_sked: Option<String>,
    pub lights_off_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::plan_parameters)]
pub struct NewPlanParameters {
    pub plan_pattern_id: i32,
    pub temperature_sked: Option<String>,
    pub lights_off_time: Option<NaiveTime>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::themes)]
pub struct Theme {
    pub id: i32,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::themes)]
pub struct NewTheme {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::topics_info)]
pub struct TopicInfo {
    pub id: i32,
    pub description: Option<String>,
    pub topic_type: Option<String>,
    pub info: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::topics_info)]
pub struct NewTopicInfo {
    pub description: Option<String>,
    pub topic_type: Option<String>,
    pub info: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Insertable)]
#[diesel(table_name = schema::theme_topics_info)]
#[diesel(primary_key(theme_id, topics_info_id))]
#[diesel(belongs_to(Theme))]
#[diesel(belongs_to(TopicInfo, foreign_key = topics_info_id))]
pub struct ThemeTopicInfo {
    pub theme_id: i32,
    pub topics_info_id: i32,
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::microclimate_plans)]
pub struct MicroclimatePlan {
    pub id: i32,
    pub plan_pattern_id: Option<i32>,
    pub initial_microclimate_id: Option<i32>,
    pub user_id: Option<i32>,
    pub topic_id: Option<i32>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::microclimate_plans)]
pub struct NewMicroclimatePlan {
    pub plan_pattern_id: Option<i32>,
    pub initial_microclimate_id: Option<i32>,
    pub user_id: Option<i32>,
    pub topic_id: Option<i32>,
}
