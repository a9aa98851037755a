//! Storage seams used by the services.
//!
//! Two implementations exist: `db::pg::PgStore` (diesel + PostgreSQL) and
//! `db::memory::MemoryStore`. Both assign ids on insert, cascade owned
//! children on delete, and list rows in id order unless the backend says
//! otherwise.

use crate::models::entity::{MicroclimatePlan, PlanPattern, Theme, TopicInfo, User};
use core::fmt;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A storage fault, carrying what was being attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub context: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(context: &'static str, err: impl Display) -> Self {
        StoreError {
            context,
            message: err.to_string(),
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.context, self.message)
    }
}

impl Error for StoreError {}

pub trait PlanPatternStore {
    /// Load the aggregate with its microclimate, plan parameters and plan links.
    fn find_plan_pattern(&mut self, id: i32) -> Result<Option<PlanPattern>, StoreError>;

    fn list_plan_patterns(&mut self) -> Result<Vec<PlanPattern>, StoreError>;

    /// Insert when `pattern.id` is `None`, otherwise overwrite the row.
    ///
    /// Stores device, the microclimate association and plan parameters. The
    /// microclimate itself is only written when it has no id yet. Plan links are
    /// replaced only when `microclimate_plan_ids` is `Some`.
    fn save_plan_pattern(&mut self, pattern: &PlanPattern) -> Result<PlanPattern, StoreError>;

    fn delete_plan_pattern(&mut self, id: i32) -> Result<(), StoreError>;
}

pub trait CatalogStore {
    fn insert_user(&mut self, user: &User) -> Result<User, StoreError>;
    fn find_user(&mut self, id: i32) -> Result<Option<User>, StoreError>;

    fn insert_theme(&mut self, theme: &Theme) -> Result<Theme, StoreError>;
    fn find_theme(&mut self, id: i32) -> Result<Option<Theme>, StoreError>;
    fn list_themes(&mut self) -> Result<Vec<Theme>, StoreError>;

    /// Inserts the topic and one link row per entry in `theme_ids`.
    fn insert_topic(&mut self, topic: &TopicInfo) -> Result<TopicInfo, StoreError>;
    fn find_topic(&mut self, id: i32) -> Result<Option<TopicInfo>, StoreError>;
    fn list_topics_for_theme(&mut self, theme_id: i32) -> Result<Vec<TopicInfo>, StoreError>;

    /// Inserts the plan, storing `initial_microclimate` as a new microclimate.
    fn insert_microclimate_plan(&mut self, plan: &MicroclimatePlan) -> Result<MicroclimatePlan, StoreError>;
    fn find_microclimate_plan(&mut self, id: i32) -> Result<Option<MicroclimatePlan>, StoreError>;
}

/// Everything the HTTP layer needs behind one handle.
pub trait Store: PlanPatternStore + CatalogStore + Send {}

impl<T: PlanPatternStore + CatalogStore + Send> Store for T {}
