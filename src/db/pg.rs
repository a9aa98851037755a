//! PostgreSQL store on a single diesel connection.

use crate::db::models as dbm;
use crate::db::store::{CatalogStore, PlanPatternStore, StoreError};
use crate::models::entity::{
    Humidity, Microclimate, MicroclimatePlan, PlanParameters, PlanPattern, Theme, TopicInfo, User,
};
use crate::schema;
use diesel::PgConnection;
use diesel::prelude::*;
use log::debug;

pub struct PgStore {
    conn: PgConnection,
}

impl PgStore {
    pub fn new(conn: PgConnection) -> Self {
        PgStore { conn }
    }
}

fn microclimate_from_rows(row: dbm::Microclimate, humidity: Option<dbm::Humidity>) -> Microclimate {
    Microclimate {
        id: Some(row.id),
        temperature: row.temperature,
        ventilation: row.ventilation,
        light_level: row.light_level,
        humidity: humidity.map(|h| Humidity {
            id: Some(h.id),
            relative_humidity: h.relative_humidity,
            absolute_humidity: h.absolute_humidity,
        }),
    }
}

fn topic_from_row(row: dbm::TopicInfo, theme_ids: Vec<i32>) -> TopicInfo {
    TopicInfo {
        id: Some(row.id),
        description: row.description,
        topic_type: row.topic_type,
        info: row.info,
        theme_ids,
    }
}

fn load_microclimate(conn: &mut PgConnection, id: i32) -> QueryResult<Option<Microclimate>> {
    use schema::humidities::dsl as H;
    use schema::microclimates::dsl as M;

    let row: Option<dbm::Microclimate> = M::microclimates
        .find(id)
        .select(dbm::Microclimate::as_select())
        .first(conn)
        .optional()?;
    let Some(row) = row else {
        return Ok(None);
    };
    let humidity: Option<dbm::Humidity> = H::humidities
        .filter(H::microclimate_id.eq(row.id))
        .select(dbm::Humidity::as_select())
        .first(conn)
        .optional()?;
    Ok(Some(microclimate_from_rows(row, humidity)))
}

/// Insert a microclimate and its owned humidity; returns the new microclimate id.
fn insert_microclimate(conn: &mut PgConnection, m: &Microclimate) -> QueryResult<i32> {
    use schema::humidities::dsl as H;
    use schema::microclimates::dsl as M;

    let id: i32 = diesel::insert_into(M::microclimates)
        .values(&dbm::NewMicroclimate {
            temperature: m.temperature.clone(),
            ventilation: m.ventilation.clone(),
            light_level: m.light_level,
        })
        .returning(M::id)
        .get_result(conn)?;
    if let Some(h) = &m.humidity {
        diesel::insert_into(H::humidities)
            .values(&dbm::NewHumidity {
                microclimate_id: id,
                relative_humidity: h.relative_humidity,
                absolute_humidity: h.absolute_humidity,
            })
            .execute(conn)?;
    }
    Ok(id)
}

fn assemble_plan_pattern(conn: &mut PgConnection, row: dbm::PlanPattern) -> QueryResult<PlanPattern> {
    use schema::microclimate_plans::dsl as MP;
    use schema::plan_parameters::dsl as P;

    let microclimate = match row.microclimate_id {
        Some(mid) => load_microclimate(conn, mid)?,
        None => None,
    };
    let params: Option<dbm::PlanParameters> = P::plan_parameters
        .filter(P::plan_pattern_id.eq(row.id))
        .select(dbm::PlanParameters::as_select())
        .first(conn)
        .optional()?;
    let plan_ids: Vec<i32> = MP::microclimate_plans
        .filter(MP::plan_pattern_id.eq(row.id))
        .select(MP::id)
        .order(MP::id.asc())
        .load(conn)?;

    Ok(PlanPattern {
        id: Some(row.id),
        device: row.device,
        microclimate,
        microclimate_plan_ids: Some(plan_ids),
        plan_parameters: params.map(|p| PlanParameters {
            id: Some(p.id),
            temperature_sked: p.temperature_sked,
            lights_off_time: p.lights_off_time,
        }),
    })
}

fn load_theme_ids(conn: &mut PgConnection, topic_id: i32) -> QueryResult<Vec<i32>> {
    use schema::theme_topics_info::dsl as L;

    L::theme_topics_info
        .filter(L::topics_info_id.eq(topic_id))
        .select(L::theme_id)
        .order(L::theme_id.asc())
        .load(conn)
}

impl PlanPatternStore for PgStore {
    fn find_plan_pattern(&mut self, id: i32) -> Result<Option<PlanPattern>, StoreError> {
        use schema::plan_patterns::dsl as PP;

        let conn = &mut self.conn;
        let row: Option<dbm::PlanPattern> = PP::plan_patterns
            .find(id)
            .select(dbm::PlanPattern::as_select())
            .first(conn)
            .optional()
            .map_err(|e| StoreError::new("fetch plan pattern", e))?;
        row.map(|r| assemble_plan_pattern(conn, r))
            .transpose()
            .map_err(|e| StoreError::new("load plan pattern associations", e))
    }

    fn list_plan_patterns(&mut self) -> Result<Vec<PlanPattern>, StoreError> {
        use schema::plan_patterns::dsl as PP;

        let conn = &mut self.conn;
        // Repeatable read so every statement sees the same snapshot.
        conn.build_transaction().repeatable_read().read_only().run(|conn| {
            let rows: Vec<dbm::PlanPattern> = PP::plan_patterns
                .select(dbm::PlanPattern::as_select())
                .order(PP::id.asc())
                .load(conn)?;
            rows.into_iter().map(|r| assemble_plan_pattern(conn, r)).collect()
        })
        .map_err(|e: diesel::result::Error| StoreError::new("list plan patterns", e))
    }

    fn save_plan_pattern(&mut self, pattern: &PlanPattern) -> Result<PlanPattern, StoreError> {
        use schema::microclimate_plans::dsl as MP;
        use schema::plan_parameters::dsl as P;
        use schema::plan_patterns::dsl as PP;

        self.conn
            .transaction(|conn| {
                let microclimate_id = match &pattern.microclimate {
                    Some(m) => Some(match m.id {
                        Some(id) => id,
                        None => insert_microclimate(conn, m)?,
                    }),
                    None => None,
                };
                let row: dbm::PlanPattern = match pattern.id {
                    None => diesel::insert_into(PP::plan_patterns)
                        .values(&dbm::NewPlanPattern {
                            device: pattern.device.clone(),
                            microclimate_id,
                        })
                        .returning(dbm::PlanPattern::as_returning())
                        .get_result(conn)?,
                    Some(id) => diesel::update(PP::plan_patterns.find(id))
                        .set(&dbm::PlanPatternChanges {
                            device: pattern.device.clone(),
                            microclimate_id,
                        })
                        .returning(dbm::PlanPattern::as_returning())
                        .get_result(conn)?,
                };

                match &pattern.plan_parameters {
                    Some(p) => {
                        diesel::insert_into(P::plan_parameters)
                            .values(&dbm::NewPlanParameters {
                                plan_pattern_id: row.id,
                                temperature_sked: p.temperature_sked.clone(),
                                lights_off_time: p.lights_off_time,
                            })
                            .on_conflict(P::plan_pattern_id)
                            .do_update()
                            .set((
                                P::temperature_sked.eq(p.temperature_sked.clone()),
                                P::lights_off_time.eq(p.lights_off_time),
                            ))
                            .execute(conn)?;
                    }
                    None => {
                        diesel::delete(P::plan_parameters.filter(P::plan_pattern_id.eq(row.id))).execute(conn)?;
                    }
                }

                if let Some(ids) = &pattern.microclimate_plan_ids {
                    diesel::update(
                        MP::microclimate_plans
                            .filter(MP::plan_pattern_id.eq(row.id))
                            .filter(MP::id.ne_all(ids.clone())),
                    )
                    .set(MP::plan_pattern_id.eq(None::<i32>))
                    .execute(conn)?;
                    diesel::update(MP::microclimate_plans.filter(MP::id.eq_any(ids.clone())))
                        .set(MP::plan_pattern_id.eq(row.id))
                        .execute(conn)?;
                }

                debug!("Store: saved plan pattern {}", row.id);
                assemble_plan_pattern(conn, row)
            })
            .map_err(|e: diesel::result::Error| StoreError::new("save plan pattern", e))
    }

    fn delete_plan_pattern(&mut self, id: i32) -> Result<(), StoreError> {
        use schema::plan_patterns::dsl as PP;

        diesel::delete(PP::plan_patterns.find(id))
            .execute(&mut self.conn)
            .map(|_| ())
            .map_err(|e| StoreError::new("delete plan pattern", e))
    }
}

impl CatalogStore for PgStore {
    fn insert_user(&mut self, user: &User) -> Result<User, StoreError> {
        use schema::users::dsl as U;

        let row: dbm::User = diesel::insert_into(U::users)
            .values(&dbm::NewUser {
                username: user.username.clone(),
                email: user.email.clone(),
            })
            .returning(dbm::User::as_returning())
            .get_result(&mut self.conn)
            .map_err(|e| StoreError::new("insert user", e))?;
        Ok(User {
            id: Some(row.id),
            username: row.username,
            email: row.email,
        })
    }

    fn find_user(&mut self, id: i32) -> Result<Option<User>, StoreError> {
        use schema::users::dsl as U;

        let row: Option<dbm::User> = U::users
            .find(id)
            .select(dbm::User::as_select())
            .first(&mut self.conn)
            .optional()
            .map_err(|e| StoreError::new("fetch user", e))?;
        Ok(row.map(|r| User {
            id: Some(r.id),
            username: r.username,
            email: r.email,
        }))
    }

    fn insert_theme(&mut self, theme: &Theme) -> Result<Theme, StoreError> {
        use schema::themes::dsl as T;

        let row: dbm::Theme = diesel::insert_into(T::themes)
            .values(&dbm::NewTheme {
                title: theme.title.clone(),
            })
            .returning(dbm::Theme::as_returning())
            .get_result(&mut self.conn)
            .map_err(|e| StoreError::new("insert theme", e))?;
        Ok(Theme {
            id: Some(row.id),
            title: row.title,
        })
    }

    fn find_theme(&mut self, id: i32) -> Result<Option<Theme>, StoreError> {
        use schema::themes::dsl as T;

        let row: Option<dbm::Theme> = T::themes
            .find(id)
            .select(dbm::Theme::as_select())
            .first(&mut self.conn)
            .optional()
            .map_err(|e| StoreError::new("fetch theme", e))?;
        Ok(row.map(|r| Theme {
            id: Some(r.id),
            title: r.title,
        }))
    }

    fn list_themes(&mut self) -> Result<Vec<Theme>, StoreError> {
        use schema::themes::dsl as T;

        let rows: Vec<dbm::Theme> = T::themes
            .select(dbm::Theme::as_select())
            .order(T::id.asc())
            .load(&mut self.conn)
            .map_err(|e| StoreError::new("list themes", e))?;
        Ok(rows
            .into_iter()
            .map(|r| Theme {
                id: Some(r.id),
                title: r.title,
            })
            .collect())
    }

    fn insert_topic(&mut self, topic: &TopicInfo) -> Result<TopicInfo, StoreError> {
        use schema::theme_topics_info::dsl as L;
        use schema::topics_info::dsl as TI;

        self.conn
            .transaction(|conn| {
                let row: dbm::TopicInfo = diesel::insert_into(TI::topics_info)
                    .values(&dbm::NewTopicInfo {
                        description: topic.description.clone(),
                        topic_type: topic.topic_type.clone(),
                        info: topic.info.clone(),
                    })
                    .returning(dbm::TopicInfo::as_returning())
                    .get_result(conn)?;
                let links = topic
                    .theme_ids
                    .iter()
                    .map(|theme_id| dbm::ThemeTopicInfo {
                        theme_id: *theme_id,
                        topics_info_id: row.id,
                    })
                    .collect::<Vec<_>>();
                if !links.is_empty() {
                    diesel::insert_into(L::theme_topics_info)
                        .values(&links)
                        .on_conflict_do_nothing()
                        .execute(conn)?;
                }
                let theme_ids = load_theme_ids(conn, row.id)?;
                Ok(topic_from_row(row, theme_ids))
            })
            .map_err(|e: diesel::result::Error| StoreError::new("insert topic", e))
    }

    fn find_topic(&mut self, id: i32) -> Result<Option<TopicInfo>, StoreError> {
        use schema::topics_info::dsl as TI;

        let conn = &mut self.conn;
        let row: Option<dbm::TopicInfo> = TI::topics_info
            .find(id)
            .select(dbm::TopicInfo::as_select())
            .first(conn)
            .optional()
            .map_err(|e| StoreError::new("fetch topic", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let theme_ids = load_theme_ids(conn, row.id).map_err(|e| StoreError::new("fetch topic themes", e))?;
        Ok(Some(topic_from_row(row, theme_ids)))
    }

    fn list_topics_for_theme(&mut self, theme_id: i32) -> Result<Vec<TopicInfo>, StoreError> {
        use schema::theme_topics_info::dsl as L;
        use schema::topics_info::dsl as TI;

        let conn = &mut self.conn;
        let rows: Vec<dbm::TopicInfo> = TI::topics_info
            .inner_join(L::theme_topics_info)
            .filter(L::theme_id.eq(theme_id))
            .select(dbm::TopicInfo::as_select())
            .order(TI::id.asc())
            .load(conn)
            .map_err(|e| StoreError::new("list topics for theme", e))?;
        rows.into_iter()
            .map(|row| {
                let theme_ids = load_theme_ids(conn, row.id)?;
                Ok(topic_from_row(row, theme_ids))
            })
            .collect::<QueryResult<Vec<_>>>()
            .map_err(|e| StoreError::new("fetch topic themes", e))
    }

    fn insert_microclimate_plan(&mut self, plan: &MicroclimatePlan) -> Result<MicroclimatePlan, StoreError> {
        use schema::microclimate_plans::dsl as MP;

        self.conn
            .transaction(|conn| {
                let initial_microclimate_id = match &plan.initial_microclimate {
                    Some(m) => Some(insert_microclimate(conn, m)?),
                    None => None,
                };
                let row: dbm::MicroclimatePlan = diesel::insert_into(MP::microclimate_plans)
                    .values(&dbm::NewMicroclimatePlan {
                        plan_pattern_id: plan.plan_pattern_id,
                        initial_microclimate_id,
                        user_id: plan.user_id,
                        topic_id: plan.topic_id,
                    })
                    .returning(dbm::MicroclimatePlan::as_returning())
                    .get_result(conn)?;
                let initial_microclimate = match row.initial_microclimate_id {
                    Some(mid) => load_microclimate(conn, mid)?,
                    None => None,
                };
                Ok(MicroclimatePlan {
                    id: Some(row.id),
                    plan_pattern_id: row.plan_pattern_id,
                    initial_microclimate,
                    user_id: row.user_id,
                    topic_id: row.topic_id,
                })
            })
            .map_err(|e: diesel::result::Error| StoreError::new("insert microclimate plan", e))
    }

    fn find_microclimate_plan(&mut self, id: i32) -> Result<Option<MicroclimatePlan>, StoreError> {
        use schema::microclimate_plans::dsl as MP;

        let conn = &mut self.conn;
        let row: Option<dbm::MicroclimatePlan> = MP::microclimate_plans
            .find(id)
            .select(dbm::MicroclimatePlan::as_select())
            .first(conn)
            .optional()
            .map_err(|e| StoreError::new("fetch microclimate plan", e))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let initial_microclimate = match row.initial_microclimate_id {
            Some(mid) => load_microclimate(conn, mid).map_err(|e| StoreError::new("fetch initial microclimate", e))?,
            None => None,
        };
        Ok(Some(MicroclimatePlan {
            id: Some(row.id),
            plan_pattern_id: row.plan_pattern_id,
            initial_microclimate,
            user_id: row.user_id,
            topic_id: row.topic_id,
        }))
    }
}
