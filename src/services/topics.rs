//! Theme and topic catalog.

use crate::db::store::CatalogStore;
use crate::mapper;
use crate::models::dto::{ThemeDto, TopicInfoDto};
use crate::services::error::ServiceError;
use log::{debug, info};

pub const THEME_NOT_FOUND: &str = "Theme not found";
pub const TOPIC_NOT_FOUND: &str = "Topic not found";

pub fn create_theme<S: CatalogStore + ?Sized>(store: &mut S, dto: ThemeDto) -> Result<ThemeDto, ServiceError> {
    let theme = mapper::to_theme(&ThemeDto { id: None, ..dto });
    let saved = store.insert_theme(&theme)?;
    info!("Created theme {:?}", saved.id);
    Ok(mapper::to_theme_dto(&saved))
}

pub fn list_themes<S: CatalogStore + ?Sized>(store: &mut S) -> Result<Vec<ThemeDto>, ServiceError> {
    let themes = store.list_themes()?;
    debug!("Loaded {} themes", themes.len());
    Ok(themes.iter().map(mapper::to_theme_dto).collect())
}

/// Store a topic linked to every theme in `dto.theme_ids`; all of them must exist.
pub fn create_topic<S: CatalogStore + ?Sized>(store: &mut S, dto: TopicInfoDto) -> Result<TopicInfoDto, ServiceError> {
    let mut topic = mapper::to_topic_info(&TopicInfoDto { id: None, ..dto });
    topic.theme_ids.sort_unstable();
    topic.theme_ids.dedup();
    for theme_id in &topic.theme_ids {
        if store.find_theme(*theme_id)?.is_none() {
            debug!("Topic references missing theme {}", theme_id);
            return Err(ServiceError::NotFound(THEME_NOT_FOUND.to_string()));
        }
    }
    let saved = store.insert_topic(&topic)?;
    info!("Created topic {:?} under themes {:?}", saved.id, saved.theme_ids);
    Ok(mapper::to_topic_info_dto(&saved))
}

pub fn get_topic<S: CatalogStore + ?Sized>(store: &mut S, id: i32) -> Result<TopicInfoDto, ServiceError> {
    store
        .find_topic(id)?
        .map(|t| mapper::to_topic_info_dto(&t))
        .ok_or_else(|| ServiceError::NotFound(TOPIC_NOT_FOUND.to_string()))
}

pub fn list_topics_for_theme<S: CatalogStore + ?Sized>(
    store: &mut S,
    theme_id: i32,
) -> Result<Vec<TopicInfoDto>, ServiceError> {
    if store.find_theme(theme_id)?.is_none() {
        return Err(ServiceError::NotFound(THEME_NOT_FOUND.to_string()));
    }
    let topics = store.list_topics_for_theme(theme_id)?;
    debug!("Loaded {} topics for theme {}", topics.len(), theme_id);
    Ok(topics.iter().map(mapper::to_topic_info_dto).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn theme(store: &mut MemoryStore, title: &str) -> i32 {
        create_theme(
            store,
            ThemeDto {
                id: None,
                title: Some(title.into()),
            },
        )
        .unwrap()
        .id
        .unwrap()
    }

    #[test]
    fn topic_is_reachable_from_each_of_its_themes() {
        let mut store = MemoryStore::new();
        let air = theme(&mut store, "Air quality");
        let light = theme(&mut store, "Lighting");

        let topic = create_topic(
            &mut store,
            TopicInfoDto {
                description: Some("Why rooms get stuffy".into()),
                topic_type: Some("article".into()),
                info: Some(b"CO2 ppm".to_vec()),
                theme_ids: vec![light, air, air],
                ..TopicInfoDto::default()
            },
        )
        .unwrap();
        assert_eq!(topic.theme_ids, vec![air, light]);
        assert_eq!(get_topic(&mut store, topic.id.unwrap()).unwrap(), topic);
        assert_eq!(list_topics_for_theme(&mut store, light).unwrap(), vec![topic]);
        assert_eq!(list_themes(&mut store).unwrap().len(), 2);
    }

    #[test]
    fn unknown_theme_is_not_found() {
        let mut store = MemoryStore::new();
        let err = create_topic(
            &mut store,
            TopicInfoDto {
                theme_ids: vec![5],
                ..TopicInfoDto::default()
            },
        )
        .unwrap_err();
        assert_eq!(err, ServiceError::NotFound(THEME_NOT_FOUND.into()));
        assert_eq!(
            list_topics_for_theme(&mut store, 5).unwrap_err(),
            ServiceError::NotFound(THEME_NOT_FOUND.into())
        );
        assert_eq!(get_topic(&mut store, 1).unwrap_err(), ServiceError::NotFound(TOPIC_NOT_FOUND.into()));
    }
}
