//! In-process store with the same observable behaviour as the PostgreSQL one.
//!
//! Tables are `BTreeMap`s keyed by id, so listings come back in id order. Ids
//! come from per-table sequences and are never reused after a delete.

use crate::db::store::{CatalogStore, PlanPatternStore, StoreError};
use crate::models::entity::{
    Humidity, Microclimate, MicroclimatePlan, PlanParameters, PlanPattern, Theme, TopicInfo, User,
};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone)]
struct PlanPatternRow {
    device: Option<String>,
    microclimate_id: Option<i32>,
}

#[derive(Debug, Clone)]
struct TopicRow {
    description: Option<String>,
    topic_type: Option<String>,
    info: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
struct PlanRow {
    plan_pattern_id: Option<i32>,
    initial_microclimate_id: Option<i32>,
    user_id: Option<i32>,
    topic_id: Option<i32>,
}

#[derive(Debug, Default)]
struct Sequences {
    users: i32,
    microclimates: i32,
    humidities: i32,
    plan_patterns: i32,
    plan_parameters: i32,
    themes: i32,
    topics: i32,
    plans: i32,
}

fn next(seq: &mut i32) -> i32 {
    *seq += 1;
    *seq
}

fn missing(context: &'static str, table: &str, id: i32) -> StoreError {
    StoreError::new(context, format!("no row with id {id} in {table}"))
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    seq: Sequences,
    users: BTreeMap<i32, User>,
    /// Stored with their ids (and the humidity's id) filled in.
    microclimates: BTreeMap<i32, Microclimate>,
    plan_patterns: BTreeMap<i32, PlanPatternRow>,
    /// Keyed by owning plan pattern id.
    plan_parameters: BTreeMap<i32, PlanParameters>,
    themes: BTreeMap<i32, Theme>,
    topics: BTreeMap<i32, TopicRow>,
    /// (theme_id, topic_id)
    theme_topics: BTreeSet<(i32, i32)>,
    plans: BTreeMap<i32, PlanRow>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_microclimate(&mut self, m: &Microclimate) -> i32 {
        let id = next(&mut self.seq.microclimates);
        let humidity = m.humidity.as_ref().map(|h| Humidity {
            id: Some(next(&mut self.seq.humidities)),
            relative_humidity: h.relative_humidity,
            absolute_humidity: h.absolute_humidity,
        });
        self.microclimates.insert(
            id,
            Microclimate {
                id: Some(id),
                temperature: m.temperature.clone(),
                ventilation: m.ventilation.clone(),
                light_level: m.light_level,
                humidity,
            },
        );
        id
    }

    fn assemble_plan_pattern(&self, id: i32, row: &PlanPatternRow) -> PlanPattern {
        let plan_ids = self
            .plans
            .iter()
            .filter(|(_, plan)| plan.plan_pattern_id == Some(id))
            .map(|(plan_id, _)| *plan_id)
            .collect();
        PlanPattern {
            id: Some(id),
            device: row.device.clone(),
            microclimate: row.microclimate_id.and_then(|mid| self.microclimates.get(&mid).cloned()),
            microclimate_plan_ids: Some(plan_ids),
            plan_parameters: self.plan_parameters.get(&id).cloned(),
        }
    }

    fn assemble_topic(&self, id: i32, row: &TopicRow) -> TopicInfo {
        TopicInfo {
            id: Some(id),
            description: row.description.clone(),
            topic_type: row.topic_type.clone(),
            info: row.info.clone(),
            theme_ids: self
                .theme_topics
                .iter()
                .filter(|(_, topic_id)| *topic_id == id)
                .map(|(theme_id, _)| *theme_id)
                .collect(),
        }
    }

    fn assemble_plan(&self, id: i32, row: &PlanRow) -> MicroclimatePlan {
        MicroclimatePlan {
            id: Some(id),
            plan_pattern_id: row.plan_pattern_id,
            initial_microclimate: row
                .initial_microclimate_id
                .and_then(|mid| self.microclimates.get(&mid).cloned()),
            user_id: row.user_id,
            topic_id: row.topic_id,
        }
    }
}

impl PlanPatternStore for MemoryStore {
    fn find_plan_pattern(&mut self, id: i32) -> Result<Option<PlanPattern>, StoreError> {
        Ok(self.plan_patterns.get(&id).map(|row| self.assemble_plan_pattern(id, row)))
    }

    fn list_plan_patterns(&mut self) -> Result<Vec<PlanPattern>, StoreError> {
        Ok(self
            .plan_patterns
            .iter()
            .map(|(id, row)| self.assemble_plan_pattern(*id, row))
            .collect())
    }

    fn save_plan_pattern(&mut self, pattern: &PlanPattern) -> Result<PlanPattern, StoreError> {
        const CONTEXT: &str = "save plan pattern";

        // A failed save leaves no partial writes behind.
        if let Some(id) = pattern.id
            && !self.plan_patterns.contains_key(&id)
        {
            return Err(missing(CONTEXT, "plan_patterns", id));
        }
        if let Some(mid) = pattern.microclimate.as_ref().and_then(|m| m.id)
            && !self.microclimates.contains_key(&mid)
        {
            return Err(missing(CONTEXT, "microclimates", mid));
        }

        let microclimate_id = match &pattern.microclimate {
            Some(m) => Some(match m.id {
                Some(id) => id,
                None => self.insert_microclimate(m),
            }),
            None => None,
        };
        let id = match pattern.id {
            Some(id) => id,
            None => next(&mut self.seq.plan_patterns),
        };
        self.plan_patterns.insert(
            id,
            PlanPatternRow {
                device: pattern.device.clone(),
                microclimate_id,
            },
        );

        match &pattern.plan_parameters {
            Some(p) => {
                let params_id = match self.plan_parameters.get(&id).and_then(|existing| existing.id) {
                    Some(existing) => existing,
                    None => next(&mut self.seq.plan_parameters),
                };
                self.plan_parameters.insert(
                    id,
                    PlanParameters {
                        id: Some(params_id),
                        temperature_sked: p.temperature_sked.clone(),
                        lights_off_time: p.lights_off_time,
                    },
                );
            }
            None => {
                self.plan_parameters.remove(&id);
            }
        }

        if let Some(ids) = &pattern.microclimate_plan_ids {
            for (plan_id, plan) in self.plans.iter_mut() {
                if ids.contains(plan_id) {
                    plan.plan_pattern_id = Some(id);
                } else if plan.plan_pattern_id == Some(id) {
                    plan.plan_pattern_id = None;
                }
            }
        }

        debug!("Store: saved plan pattern {id}");
        let row = self.plan_patterns.get(&id).ok_or_else(|| missing(CONTEXT, "plan_patterns", id))?;
        Ok(self.assemble_plan_pattern(id, row))
    }

    fn delete_plan_pattern(&mut self, id: i32) -> Result<(), StoreError> {
        if self.plan_patterns.remove(&id).is_some() {
            self.plan_parameters.remove(&id);
            self.plans
                .values_mut()
                .filter(|plan| plan.plan_pattern_id == Some(id))
                .for_each(|plan| plan.plan_pattern_id = None);
        }
        Ok(())
    }
}

impl CatalogStore for MemoryStore {
    fn insert_user(&mut self, user: &User) -> Result<User, StoreError> {
        let id = next(&mut self.seq.users);
        let stored = User {
            id: Some(id),
            ..user.clone()
        };
        self.users.insert(id, stored.clone());
        Ok(stored)
    }

    fn find_user(&mut self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(&id).cloned())
    }

    fn insert_theme(&mut self, theme: &Theme) -> Result<Theme, StoreError> {
        let id = next(&mut self.seq.themes);
        let stored = Theme {
            id: Some(id),
            title: theme.title.clone(),
        };
        self.themes.insert(id, stored.clone());
        Ok(stored)
    }

    fn find_theme(&mut self, id: i32) -> Result<Option<Theme>, StoreError> {
        Ok(self.themes.get(&id).cloned())
    }

    fn list_themes(&mut self) -> Result<Vec<Theme>, StoreError> {
        Ok(self.themes.values().cloned().collect())
    }

    fn insert_topic(&mut self, topic: &TopicInfo) -> Result<TopicInfo, StoreError> {
        if let Some(theme_id) = topic.theme_ids.iter().find(|t| !self.themes.contains_key(*t)) {
            return Err(missing("insert topic", "themes", *theme_id));
        }
        let id = next(&mut self.seq.topics);
        let row = TopicRow {
            description: topic.description.clone(),
            topic_type: topic.topic_type.clone(),
            info: topic.info.clone(),
        };
        for theme_id in &topic.theme_ids {
            self.theme_topics.insert((*theme_id, id));
        }
        let stored = self.assemble_topic(id, &row);
        self.topics.insert(id, row);
        Ok(stored)
    }

    fn find_topic(&mut self, id: i32) -> Result<Option<TopicInfo>, StoreError> {
        Ok(self.topics.get(&id).map(|row| self.assemble_topic(id, row)))
    }

    fn list_topics_for_theme(&mut self, theme_id: i32) -> Result<Vec<TopicInfo>, StoreError> {
        Ok(self
            .topics
            .iter()
            .filter(|(id, _)| self.theme_topics.contains(&(theme_id, **id)))
            .map(|(id, row)| self.assemble_topic(*id, row))
            .collect())
    }

    fn insert_microclimate_plan(&mut self, plan: &MicroclimatePlan) -> Result<MicroclimatePlan, StoreError> {
        const CONTEXT: &str = "insert microclimate plan";

        if let Some(pid) = plan.plan_pattern_id.filter(|pid| !self.plan_patterns.contains_key(pid)) {
            return Err(missing(CONTEXT, "plan_patterns", pid));
        }
        if let Some(uid) = plan.user_id.filter(|uid| !self.users.contains_key(uid)) {
            return Err(missing(CONTEXT, "users", uid));
        }
        if let Some(tid) = plan.topic_id.filter(|tid| !self.topics.contains_key(tid)) {
            return Err(missing(CONTEXT, "topics_info", tid));
        }

        let initial_microclimate_id = plan.initial_microclimate.as_ref().map(|m| self.insert_microclimate(m));
        let id = next(&mut self.seq.plans);
        let row = PlanRow {
            plan_pattern_id: plan.plan_pattern_id,
            initial_microclimate_id,
            user_id: plan.user_id,
            topic_id: plan.topic_id,
        };
        let stored = self.assemble_plan(id, &row);
        self.plans.insert(id, row);
        Ok(stored)
    }

    fn find_microclimate_plan(&mut self, id: i32) -> Result<Option<MicroclimatePlan>, StoreError> {
        Ok(self.plans.get(&id).map(|row| self.assemble_plan(id, row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn template() -> PlanPattern {
        PlanPattern {
            plan_parameters: Some(PlanParameters {
                id: None,
                temperature_sked: Some("Every 4 hours".into()),
                lights_off_time: NaiveTime::from_hms_opt(21, 0, 0),
            }),
            ..PlanPattern::default()
        }
    }

    fn plan_for(store: &mut MemoryStore, pattern_id: i32) -> i32 {
        store
            .insert_microclimate_plan(&MicroclimatePlan {
                plan_pattern_id: Some(pattern_id),
                ..MicroclimatePlan::default()
            })
            .unwrap()
            .id
            .unwrap()
    }

    #[test]
    fn insert_assigns_sequential_ids_and_lists_in_order() {
        let mut store = MemoryStore::new();
        let first = store.save_plan_pattern(&template()).unwrap();
        let second = store.save_plan_pattern(&template()).unwrap();
        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
        assert_eq!(first.plan_parameters.as_ref().and_then(|p| p.id), Some(1));
        assert_eq!(first.microclimate_plan_ids, Some(vec![]));

        let ids: Vec<_> = store.list_plan_patterns().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
    }

    #[test]
    fn overwrite_keeps_plan_parameters_row() {
        let mut store = MemoryStore::new();
        let mut saved = store.save_plan_pattern(&template()).unwrap();
        saved.device = Some("Humidifier".into());
        saved.plan_parameters = Some(PlanParameters {
            id: None,
            temperature_sked: Some("Hourly".into()),
            lights_off_time: NaiveTime::from_hms_opt(22, 30, 0),
        });
        let updated = store.save_plan_pattern(&saved).unwrap();
        assert_eq!(updated.device.as_deref(), Some("Humidifier"));
        let params = updated.plan_parameters.unwrap();
        assert_eq!(params.id, Some(1));
        assert_eq!(params.temperature_sked.as_deref(), Some("Hourly"));
    }

    #[test]
    fn new_microclimate_is_inserted_with_its_humidity() {
        let mut store = MemoryStore::new();
        let pattern = PlanPattern {
            device: Some("Fan".into()),
            microclimate: Some(Microclimate {
                temperature: Some("21".into()),
                light_level: Some(0.4),
                humidity: Some(Humidity {
                    id: None,
                    relative_humidity: Some(40.0),
                    absolute_humidity: Some(7.5),
                }),
                ..Microclimate::default()
            }),
            ..template()
        };
        let saved = store.save_plan_pattern(&pattern).unwrap();
        let micro = saved.microclimate.unwrap();
        assert_eq!(micro.id, Some(1));
        assert_eq!(micro.humidity.and_then(|h| h.id), Some(1));
    }

    #[test]
    fn saving_unknown_id_fails_without_side_effects() {
        let mut store = MemoryStore::new();
        let ghost = PlanPattern {
            id: Some(2131),
            microclimate: Some(Microclimate::default()),
            ..template()
        };
        let err = store.save_plan_pattern(&ghost).unwrap_err();
        assert_eq!(err.context, "save plan pattern");
        assert!(store.microclimates.is_empty());
        assert!(store.plan_patterns.is_empty());
    }

    #[test]
    fn plan_links_are_replaced_only_when_listed() {
        let mut store = MemoryStore::new();
        let pattern = store.save_plan_pattern(&template()).unwrap();
        let pid = pattern.id.unwrap();
        let a = plan_for(&mut store, pid);
        let b = plan_for(&mut store, pid);

        let mut untouched = store.find_plan_pattern(pid).unwrap().unwrap();
        assert_eq!(untouched.microclimate_plan_ids, Some(vec![a, b]));
        untouched.microclimate_plan_ids = None;
        let saved = store.save_plan_pattern(&untouched).unwrap();
        assert_eq!(saved.microclimate_plan_ids, Some(vec![a, b]));

        let relinked = PlanPattern {
            microclimate_plan_ids: Some(vec![b]),
            ..saved
        };
        let saved = store.save_plan_pattern(&relinked).unwrap();
        assert_eq!(saved.microclimate_plan_ids, Some(vec![b]));
        assert_eq!(store.find_microclimate_plan(a).unwrap().unwrap().plan_pattern_id, None);
    }

    #[test]
    fn delete_cascades_parameters_and_detaches_plans() {
        let mut store = MemoryStore::new();
        let pid = store.save_plan_pattern(&template()).unwrap().id.unwrap();
        let plan = plan_for(&mut store, pid);

        store.delete_plan_pattern(pid).unwrap();
        assert!(store.find_plan_pattern(pid).unwrap().is_none());
        assert!(store.plan_parameters.is_empty());
        let plan = store.find_microclimate_plan(plan).unwrap().unwrap();
        assert_eq!(plan.plan_pattern_id, None);

        // Ids are not reused.
        assert_eq!(store.save_plan_pattern(&template()).unwrap().id, Some(pid + 1));
    }

    #[test]
    fn topics_are_listed_per_theme() {
        let mut store = MemoryStore::new();
        let air = store.insert_theme(&Theme { id: None, title: Some("Air".into()) }).unwrap().id.unwrap();
        let light = store.insert_theme(&Theme { id: None, title: Some("Light".into()) }).unwrap().id.unwrap();
        let both = store
            .insert_topic(&TopicInfo {
                description: Some("Stale air".into()),
                theme_ids: vec![air, light],
                ..TopicInfo::default()
            })
            .unwrap();
        store
            .insert_topic(&TopicInfo {
                description: Some("Lamps".into()),
                theme_ids: vec![light],
                ..TopicInfo::default()
            })
            .unwrap();

        assert_eq!(both.theme_ids, vec![air, light]);
        assert_eq!(store.list_topics_for_theme(air).unwrap(), vec![both]);
        assert_eq!(store.list_topics_for_theme(light).unwrap().len(), 2);
        assert!(store.insert_topic(&TopicInfo { theme_ids: vec![99], ..TopicInfo::default() }).is_err());
    }

    #[test]
    fn plan_snapshot_gets_its_own_microclimate() {
        let mut store = MemoryStore::new();
        let user = store
            .insert_user(&User {
                id: None,
                username: "greenhouse".into(),
                email: None,
            })
            .unwrap();
        let plan = store
            .insert_microclimate_plan(&MicroclimatePlan {
                user_id: user.id,
                initial_microclimate: Some(Microclimate {
                    temperature: Some("18".into()),
                    ..Microclimate::default()
                }),
                ..MicroclimatePlan::default()
            })
            .unwrap();
        assert_eq!(plan.initial_microclimate.and_then(|m| m.id), Some(1));
        assert!(
            store
                .insert_microclimate_plan(&MicroclimatePlan {
                    user_id: Some(42),
                    ..MicroclimatePlan::default()
                })
                .is_err()
        );
    }
}
