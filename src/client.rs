//! Blocking HTTP client for a running hygimeter server.
//!
//! Talks to the plan pattern routes and unwraps the response envelope. Backs
//! the `hygimeter client ...` subcommand.

use crate::models::dto::{PlanPatternDto, RemoteResponse, ResponseCode};
use core::fmt;
use http::Response;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;

#[derive(Debug)]
pub enum ClientError {
    Transport(String),
    /// The server answered with `success: false`.
    Api {
        status: u16,
        code: ResponseCode,
        message: String,
    },
    Decode(String),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(s) => write!(f, "transport error: {}", s),
            ClientError::Api { status, code, message } => write!(f, "http {} {:?}: {}", status, code, message),
            ClientError::Decode(s) => write!(f, "decode error: {}", s),
        }
    }
}

impl Error for ClientError {}

impl From<ureq::Error> for ClientError {
    fn from(value: ureq::Error) -> Self {
        ClientError::Transport(value.to_string())
    }
}

pub struct HygimeterClient {
    agent: ureq::Agent,
    base_url: String,
}

impl HygimeterClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        HygimeterClient {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn list(&self) -> Result<Vec<PlanPatternDto>, ClientError> {
        let resp = self.agent.get(&self.url("/plan-pattern")).call()?;
        unwrap_envelope(resp)
    }

    pub fn get(&self, id: i32) -> Result<PlanPatternDto, ClientError> {
        let resp = self.agent.get(&self.url(&format!("/plan-pattern/{}", id))).call()?;
        single(unwrap_envelope(resp)?)
    }

    pub fn create(&self, dto: &PlanPatternDto) -> Result<PlanPatternDto, ClientError> {
        let resp = self.agent.post(&self.url("/plan-pattern")).send_json(dto)?;
        single(unwrap_envelope(resp)?)
    }

    pub fn update(&self, id: i32, dto: &PlanPatternDto) -> Result<PlanPatternDto, ClientError> {
        let resp = self
            .agent
            .put(&self.url(&format!("/plan-pattern/{}", id)))
            .send_json(dto)?;
        single(unwrap_envelope(resp)?)
    }

    pub fn delete(&self, id: i32) -> Result<(), ClientError> {
        let resp = self.agent.delete(&self.url(&format!("/plan-pattern/{}", id))).call()?;
        unwrap_envelope::<PlanPatternDto>(resp).map(|_| ())
    }
}

fn unwrap_envelope<T: DeserializeOwned>(mut resp: Response<ureq::Body>) -> Result<Vec<T>, ClientError> {
    let status = resp.status();
    let text = resp.body_mut().read_to_string()?;
    debug!("Client: HTTP {} ({} bytes)", status, text.len());

    let de = &mut serde_json::Deserializer::from_str(&text);
    let envelope: RemoteResponse<T> = serde_path_to_error::deserialize(de).map_err(|e| {
        ClientError::Decode(format!("HTTP {} body at '{}': {}", status.as_u16(), e.path(), e.inner()))
    })?;
    if !envelope.success {
        return Err(ClientError::Api {
            status: status.as_u16(),
            code: envelope.status_code,
            message: envelope.status_message,
        });
    }
    Ok(envelope.results)
}

fn single<T>(results: Vec<T>) -> Result<T, ClientError> {
    results
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Decode("successful response carried no results".to_string()))
}

fn read_dto(path: &Path) -> Result<PlanPatternDto, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("Reading {} failed: {}", path.display(), e))?;
    let de = &mut serde_json::Deserializer::from_str(&text);
    serde_path_to_error::deserialize(de).map_err(|e| format!("{} at '{}': {}", path.display(), e.path(), e.inner()))
}

fn parse_id(raw: Option<&String>) -> Result<i32, String> {
    let raw = raw.ok_or_else(|| "missing plan pattern id".to_string())?;
    raw.parse::<i32>().map_err(|_| format!("invalid plan pattern id '{}'", raw))
}

fn pretty<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Encoding output failed: {}", e))
}

pub const USAGE: &str = "usage: hygimeter client <list | get ID | delete ID | create FILE | update ID FILE>";

/// Run one client subcommand and return what should be printed.
pub fn run_command(client: &HygimeterClient, args: &[String]) -> Result<String, String> {
    let (cmd, rest) = args.split_first().ok_or_else(|| USAGE.to_string())?;
    let out = match cmd.as_str() {
        "list" => pretty(&client.list().map_err(|e| e.to_string())?)?,
        "get" => pretty(&client.get(parse_id(rest.first())?).map_err(|e| e.to_string())?)?,
        "delete" => {
            let id = parse_id(rest.first())?;
            client.delete(id).map_err(|e| e.to_string())?;
            format!("Deleted plan pattern {}", id)
        }
        "create" => {
            let file = rest.first().ok_or_else(|| USAGE.to_string())?;
            let dto = read_dto(Path::new(file))?;
            pretty(&client.create(&dto).map_err(|e| e.to_string())?)?
        }
        "update" => {
            let id = parse_id(rest.first())?;
            let file = rest.get(1).ok_or_else(|| USAGE.to_string())?;
            let dto = read_dto(Path::new(file))?;
            pretty(&client.update(id, &dto).map_err(|e| e.to_string())?)?
        }
        other => return Err(format!("unknown client command '{}'\n{}", other, USAGE)),
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes;
    use crate::api::state::AppState;
    use crate::db::memory::MemoryStore;
    use crate::models::dto::{HumidityDto, MicroclimateDto, PlanParametersDto};
    use chrono::NaiveTime;

    /// Serve a fresh memory store on an ephemeral port for the rest of the test process.
    fn spawn_server() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::from_std(listener).unwrap();
                let app = routes::router(AppState::new(Box::new(MemoryStore::new())));
                axum::serve(listener, app).await.unwrap();
            });
        });
        format!("http://{}/", addr)
    }

    fn template() -> PlanPatternDto {
        PlanPatternDto {
            plan_parameters: Some(PlanParametersDto {
                temperature_sked: Some("Every 4 hours".into()),
                lights_off_time: NaiveTime::from_hms_opt(20, 0, 0),
            }),
            ..PlanPatternDto::default()
        }
    }

    #[test]
    fn crud_against_live_server() {
        let client = HygimeterClient::new(spawn_server(), Duration::from_secs(5));

        let created = client.create(&template()).unwrap();
        let id = created.id.unwrap();
        assert_eq!(client.get(id).unwrap(), created);

        let update = PlanPatternDto {
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
            ..template()
        };
        let updated = client.update(id, &update).unwrap();
        assert_eq!(updated.device.as_deref(), Some("DeviceTypeA"));
        assert_eq!(client.list().unwrap(), vec![updated]);

        client.delete(id).unwrap();
        match client.get(id) {
            Err(ClientError::Api { status, code, message }) => {
                assert_eq!(status, 404);
                assert_eq!(code, ResponseCode::EntityNotFound);
                assert_eq!(message, "Plan pattern not found");
            }
            other => panic!("expected not found, got {:?}", other),
        }
    }

    #[test]
    fn validation_failures_surface_as_api_errors() {
        let client = HygimeterClient::new(spawn_server(), Duration::from_secs(5));
        let err = client.create(&PlanPatternDto::default()).unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 400, code: ResponseCode::InvalidData, .. }));
        assert_eq!(err.to_string(), "http 400 InvalidData: Plan parameters cannot be null");
    }

    #[test]
    fn command_line_rejects_bad_input() {
        let client = HygimeterClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        assert_eq!(run_command(&client, &[]).unwrap_err(), USAGE);
        let args = ["get".to_string(), "seven".to_string()];
        assert_eq!(run_command(&client, &args).unwrap_err(), "invalid plan pattern id 'seven'");
        assert!(run_command(&client, &["frobnicate".to_string()]).unwrap_err().starts_with("unknown client command"));
    }
}
