use crate::db::store::Store;
use crate::models::dto::{MicroclimatePlanDto, PlanPatternDto, ThemeDto, TopicInfoDto, UserDto};
use crate::models::entity::{Humidity, Microclimate, PlanParameters, PlanPattern};
use crate::mapper;
use crate::services::{plan_pattern, plans, topics};
use chrono::NaiveTime;
use log::info;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::num::NonZeroU32;

pub const DEMO_SEED: u64 = 0x4859_4749_4D45_5445;

const DEMO_USERNAME: &str = "demo";
const THEMES: [(&str, [&str; 2]); 3] = [
    ("Air quality", ["Airing a stuffy room", "Condensation on windows"]),
    ("Lighting", ["Day length for seedlings", "Choosing grow lamps"]),
    ("Temperature", ["Night setback", "Radiator placement"]),
];
const DEVICES: [&str; 5] = ["Humidifier H2", "Dehumidifier D7", "Grow lamp L1", "Heater K3", "Fan F2"];
const VENTILATION: [&str; 4] = ["Natural", "Forced", "Cross draft", "Heat recovery"];
const SCHEDULES: [&str; 4] = ["Every hour", "Every 2 hours", "Every 4 hours", "Twice a day"];

/// Fill an empty store with demo data.
///
/// Even-numbered patterns stay templates; odd-numbered ones get a device, a
/// microclimate with humidity and one microclimate plan started from it.
pub fn run(store: &mut dyn Store, count: NonZeroU32, seed: u64) -> Result<(), String> {
    let mut rng = SmallRng::seed_from_u64(seed);

    let user = plans::create_user(
        store,
        UserDto {
            id: None,
            username: Some(DEMO_USERNAME.to_string()),
            email: Some("demo@hygimeter.local".to_string()),
        },
    )
    .map_err(|e| format!("seed user failed: {}", e))?;

    let mut topic_ids = Vec::new();
    for (title, topic_titles) in THEMES {
        let theme = topics::create_theme(
            store,
            ThemeDto {
                id: None,
                title: Some(title.to_string()),
            },
        )
        .map_err(|e| format!("seed theme failed: {}", e))?;
        for description in topic_titles {
            let info: Vec<u8> = (0..16).map(|_| rng.random()).collect();
            let topic = topics::create_topic(
                store,
                TopicInfoDto {
                    id: None,
                    description: Some(description.to_string()),
                    topic_type: Some("article".to_string()),
                    info: Some(info),
                    theme_ids: theme.id.into_iter().collect(),
                },
            )
            .map_err(|e| format!("seed topic failed: {}", e))?;
            topic_ids.extend(topic.id);
        }
    }

    let mut templates = 0;
    let mut configured = 0;
    for index in 0..count.get() {
        let params = random_parameters(&mut rng);
        if index % 2 == 0 {
            plan_pattern::create(
                store,
                PlanPatternDto {
                    plan_parameters: Some(mapper::to_plan_parameters_dto(&params)),
                    ..PlanPatternDto::default()
                },
            )
            .map_err(|e| format!("seed template plan pattern failed: {}", e))?;
            templates += 1;
            continue;
        }

        let microclimate = random_microclimate(&mut rng);
        let pattern = store
            .save_plan_pattern(&PlanPattern {
                device: Some(pick(&mut rng, &DEVICES).to_string()),
                microclimate: Some(microclimate.clone()),
                plan_parameters: Some(params),
                ..PlanPattern::default()
            })
            .map_err(|e| format!("seed plan pattern failed: {}", e))?;
        let topic_id = if topic_ids.is_empty() {
            None
        } else {
            Some(topic_ids[rng.random_range(0..topic_ids.len())])
        };
        plans::create_microclimate_plan(
            store,
            MicroclimatePlanDto {
                id: None,
                plan_pattern_id: pattern.id,
                initial_microclimate: Some(mapper::to_microclimate_dto(&microclimate)),
                user_id: user.id,
                topic_id,
            },
        )
        .map_err(|e| format!("seed microclimate plan failed: {}", e))?;
        configured += 1;
    }

    info!(
        "Demo data: seeded 1 user, {} themes, {} topics, {} plan patterns ({} templates, {} configured)",
        THEMES.len(),
        topic_ids.len(),
        templates + configured,
        templates,
        configured
    );
    Ok(())
}

fn pick<'a>(rng: &mut SmallRng, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn random_parameters(rng: &mut SmallRng) -> PlanParameters {
    let hour = rng.random_range(18..=23);
    let minute = [0, 15, 30, 45][rng.random_range(0..4)];
    PlanParameters {
        id: None,
        temperature_sked: Some(pick(rng, &SCHEDULES).to_string()),
        lights_off_time: NaiveTime::from_hms_opt(hour, minute, 0),
    }
}

fn random_microclimate(rng: &mut SmallRng) -> Microclimate {
    let temperature: f32 = rng.random_range(17.0..=26.0);
    let relative: f32 = rng.random_range(35.0..=65.0);
    // Absolute humidity in g/m³ roughly follows relative humidity at room temperature.
    let absolute = relative * rng.random_range(0.15f32..=0.2);
    Microclimate {
        id: None,
        temperature: Some(format!("{:.1}", temperature)),
        ventilation: Some(pick(rng, &VENTILATION).to_string()),
        light_level: Some(rng.random_range(0.2..=1.0)),
        humidity: Some(Humidity {
            id: None,
            relative_humidity: Some(relative),
            absolute_humidity: Some(absolute),
        }),
    }
}
