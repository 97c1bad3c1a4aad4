use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::{info, warn, error};
use crate::config::LiftSettings;
use crate::errors::{DeviceError, DeviceResult, LiftAdapterError, LiftAdapterResult};
use crate::models::{DoorState, MotionState};
use crate::services::device::gateway::DeviceGateway;

const AVAILABLE_FLOOR_PATH: &str = "/lift/status/available_floor";
const CURRENT_LOCATION_PATH: &str = "/lift/status/current_location";
const DESTINATION_PATH: &str = "/lift/status/destination";
const DOOR_STATUS_PATH: &str = "/lift/status/door_status";
const MOTION_MODE_PATH: &str = "/lift/status/motion_mode";
const REQUEST_FLOOR_PATH: &str = "/lift/request_floorlevel";
const DOOR_OPEN_PATH: &str = "/lift/door/remoteopen";
const DOOR_CLOSE_PATH: &str = "/lift/door/remoteclose";

/// # LiftClientApi
///
/// [`DeviceGateway`] over the vendor's REST API. Every call is a `POST` to `{api_endpoint}{path}`
/// carrying the configured auth header and a `{"id": lift_id}` body; answers arrive wrapped in a
/// `{"statusCode": .., "body": {..}}` envelope.
pub struct LiftClientApi {
    client: Client,
    base_url: String,
    lift_id: String,
}

impl LiftClientApi {
    /// Builds the HTTP client without contacting the device.
    pub fn new(settings: &LiftSettings) -> LiftAdapterResult<Self> {
        let mut headers = HeaderMap::new();
        let name = HeaderName::from_bytes(settings.header_key.as_bytes())
            .map_err(|e| LiftAdapterError::ConfigError(format!("Invalid header key: {}", e)))?;
        let mut value = HeaderValue::from_str(settings.header_value.expose_secret())
            .map_err(|e| LiftAdapterError::ConfigError(format!("Invalid header value: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(name, value);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout())
            .build()
            .map_err(|e| LiftAdapterError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.api_endpoint.trim_end_matches('/').to_string(),
            lift_id: settings.lift_id.clone(),
        })
    }

    /// Builds the client and performs the startup handshake.
    ///
    /// `check_connection` is attempted up to `connect_attempts` times, `connect_retry_ms` apart. If the
    /// lift never answers, startup is abandoned with a `ConnectionError`.
    pub async fn connect(settings: &LiftSettings) -> LiftAdapterResult<Self> {
        let api = Self::new(settings)?;
        let attempts = settings.connect_attempts.max(1);

        for attempt in 1..=attempts {
            match api.check_connection().await {
                Ok(()) => {
                    info!("Connected to lift API at {}", api.base_url);
                    return Ok(api);
                }
                Err(e) if attempt < attempts => {
                    warn!("Unable to connect to lift API, attempt {}/{}: {}. Attempting to reconnect...",
                        attempt, attempts, e);
                    tokio::time::sleep(settings.connect_retry()).await;
                }
                Err(e) => {
                    error!("Unable to connect to lift API after {} attempts: {}", attempts, e);
                }
            }
        }

        Err(LiftAdapterError::ConnectionError(format!(
            "Unable to establish connection with lift {} at {}", settings.name, api.base_url
        )))
    }

    async fn post(&self, path: &str, body: Value) -> DeviceResult<Value> {
        let response = self.client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeviceError::Http(status.as_u16()));
        }

        let envelope: Value = response.json().await
            .map_err(|e| DeviceError::Malformed(e.to_string()))?;
        envelope.get("body")
            .cloned()
            .ok_or_else(|| DeviceError::Malformed(format!("{} response has no body", path)))
    }

    async fn query(&self, path: &str) -> DeviceResult<Value> {
        self.post(path, json!({ "id": self.lift_id })).await
    }

    async fn command(&self, path: &str, body: Value) -> DeviceResult<()> {
        let body = self.post(path, body).await?;
        command_accepted(path, &body)
    }
}

#[async_trait]
impl DeviceGateway for LiftClientApi {
    async fn check_connection(&self) -> DeviceResult<()> {
        self.query(MOTION_MODE_PATH).await.map(|_| ())
    }

    async fn available_floors(&self) -> DeviceResult<Vec<String>> {
        let body = self.query(AVAILABLE_FLOOR_PATH).await?;
        parse_floor_list(&body)
    }

    async fn current_floor(&self) -> DeviceResult<String> {
        let body = self.query(CURRENT_LOCATION_PATH).await?;
        string_field(&body, "current_location")
    }

    async fn destination_floor(&self) -> DeviceResult<String> {
        let body = self.query(DESTINATION_PATH).await?;
        string_field(&body, "destination")
    }

    async fn door_state(&self) -> DeviceResult<DoorState> {
        let body = self.query(DOOR_STATUS_PATH).await?;
        parse_door_state(&string_field(&body, "door_state")?)
    }

    async fn motion_state(&self) -> DeviceResult<MotionState> {
        let body = self.query(MOTION_MODE_PATH).await?;
        parse_motion_state(body.get("motion"))
    }

    async fn command_lift(&self, floor: &str) -> DeviceResult<()> {
        self.command(REQUEST_FLOOR_PATH, json!({ "id": self.lift_id, "floor": floor })).await
    }

    async fn open_door(&self) -> DeviceResult<()> {
        self.command(DOOR_OPEN_PATH, json!({ "id": self.lift_id })).await
    }

    async fn close_door(&self) -> DeviceResult<()> {
        self.command(DOOR_CLOSE_PATH, json!({ "id": self.lift_id })).await
    }
}

fn map_transport_error(e: reqwest::Error) -> DeviceError {
    if e.is_timeout() {
        DeviceError::Timeout
    } else if let Some(status) = e.status() {
        DeviceError::Http(status.as_u16())
    } else if e.is_decode() {
        DeviceError::Malformed(e.to_string())
    } else {
        DeviceError::Unreachable(e.to_string())
    }
}

fn string_field(body: &Value, field: &str) -> DeviceResult<String> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DeviceError::Malformed(format!("missing string field {}", field)))
}

fn parse_floor_list(body: &Value) -> DeviceResult<Vec<String>> {
    let floors = body.get("available_floor")
        .and_then(Value::as_array)
        .ok_or_else(|| DeviceError::Malformed("missing available_floor list".to_string()))?;

    floors.iter()
        .map(|f| f.as_str()
            .map(str::to_string)
            .ok_or_else(|| DeviceError::Malformed(format!("non-string floor {}", f))))
        .collect()
}

pub(crate) fn parse_door_state(raw: &str) -> DeviceResult<DoorState> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "open" | "opened" => Ok(DoorState::Open),
        "close" | "closed" => Ok(DoorState::Closed),
        "opening" | "closing" | "moving" => Ok(DoorState::Moving),
        other => Err(DeviceError::Malformed(format!("unknown door state {}", other))),
    }
}

pub(crate) fn parse_motion_state(raw: Option<&Value>) -> DeviceResult<MotionState> {
    let raw = match raw {
        None | Some(Value::Null) => return Ok(MotionState::Unknown),
        Some(value) => value.as_str()
            .ok_or_else(|| DeviceError::Malformed(format!("non-string motion {}", value)))?,
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "stopped" | "stop" => Ok(MotionState::Stopped),
        "up" => Ok(MotionState::Up),
        "down" => Ok(MotionState::Down),
        other => Err(DeviceError::Malformed(format!("unknown motion {}", other))),
    }
}

fn command_accepted(path: &str, body: &Value) -> DeviceResult<()> {
    match body.get("result") {
        Some(result) if !result.is_null() => Ok(()),
        _ => Err(DeviceError::Rejected(format!("{} returned no result", path))),
    }
}
