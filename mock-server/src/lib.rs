use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "acc_dummy";
pub const DEFAULT_API_SECRET: &str = "secret_dummy";

/// Categorizers the mock knows about.
pub const CATEGORIZERS: &[&str] = &["personal_photos", "nsfw_beta"];

/// Bytes served by `/images/{name}`, not valid UTF-8 on purpose.
pub const SAMPLE_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\n\xff\xfe sample";

const MAX_URLS: usize = 10;
const MAX_CONTENT_IDS: usize = 30;

/// Credentials the server accepts.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub api_secret: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: DEFAULT_API_KEY.to_string(),
            api_secret: DEFAULT_API_SECRET.to_string(),
        }
    }
}

impl Config {
    /// Read `IMAGGA_API_KEY` / `IMAGGA_API_SECRET`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: std::env::var("IMAGGA_API_KEY").unwrap_or(defaults.api_key),
            api_secret: std::env::var("IMAGGA_API_SECRET").unwrap_or(defaults.api_secret),
        }
    }
}

pub type Store = Arc<RwLock<HashMap<String, Vec<u8>>>>;

#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    store: Store,
    processed: Arc<AtomicU64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Uploaded {
    pub id: String,
    pub filename: String,
}

/// Error reply in the service's shape: `{"message": ..., "status": "error"}`.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = Json(json!({"status": "error", "message": self.message}));
        (self.status, body).into_response()
    }
}

type Reply = Result<Json<Value>, ApiFailure>;
type Params = Query<Vec<(String, String)>>;

pub fn app() -> Router {
    app_with(Config::default())
}

pub fn app_with(config: Config) -> Router {
    let state = AppState {
        config: Arc::new(config),
        store: Arc::new(RwLock::new(HashMap::new())),
        processed: Arc::new(AtomicU64::new(0)),
    };
    let api = Router::new()
        .route("/usage", get(usage))
        .route("/tagging", get(tagging))
        .route("/categorizers", get(categorizers))
        .route("/categorizations/{categorizer}", get(categorizations))
        .route("/croppings", get(croppings))
        .route("/colors", get(colors))
        .route("/content", post(upload))
        .route("/content/{id}", delete(delete_content))
        .with_state(state);
    Router::new()
        .nest("/v1", api)
        .route("/images/{name}", get(image))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Config::default()).await
}

pub async fn run_with(listener: TcpListener, config: Config) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(config)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiFailure> {
    let unauthorized = || ApiFailure::new(StatusCode::UNAUTHORIZED, "Invalid credentials");
    let encoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Basic "))
        .ok_or_else(unauthorized)?;
    let decoded = BASE64_STANDARD.decode(encoded).map_err(|_| unauthorized())?;
    let credentials = String::from_utf8(decoded).map_err(|_| unauthorized())?;
    match credentials.split_once(':') {
        Some((key, secret)) if key == state.config.api_key && secret == state.config.api_secret => {
            state.processed.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
        _ => Err(unauthorized()),
    }
}

/// Resolve `url=` and `content=` parameters, in order, into result entries.
async fn images(state: &AppState, params: &[(String, String)]) -> Result<Vec<Value>, ApiFailure> {
    let store = state.store.read().await;
    let mut images = Vec::new();
    let (mut urls, mut contents) = (0, 0);
    for (key, value) in params {
        match key.as_str() {
            "url" => {
                urls += 1;
                images.push(json!({"image": value}));
            }
            "content" => {
                if !store.contains_key(value) {
                    return Err(ApiFailure::bad_request(format!("Unknown content id: {value}")));
                }
                contents += 1;
                images.push(json!({"image": value}));
            }
            _ => {}
        }
    }
    if images.is_empty() {
        return Err(ApiFailure::bad_request("Missing image url or content id"));
    }
    if urls > MAX_URLS || contents > MAX_CONTENT_IDS {
        return Err(ApiFailure::bad_request("Too many images in one request"));
    }
    Ok(images)
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn flag(params: &[(String, String)], name: &str, default: bool) -> bool {
    param(params, name).map_or(default, |value| value == "1")
}

async fn usage(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    authorize(&state, &headers)?;
    Ok(Json(json!({
        "monthly_limit": 2000,
        "monthly_processed": state.processed.load(Ordering::Relaxed),
    })))
}

async fn tagging(State(state): State<AppState>, headers: HeaderMap, Query(params): Params) -> Reply {
    authorize(&state, &headers)?;
    let results: Vec<Value> = images(&state, &params)
        .await?
        .into_iter()
        .map(|mut entry| {
            entry["tags"] = json!([{"confidence": 100.0, "tag": "mock"}]);
            entry
        })
        .collect();
    Ok(Json(json!({ "results": results })))
}

async fn categorizers(State(state): State<AppState>, headers: HeaderMap) -> Reply {
    authorize(&state, &headers)?;
    let list: Vec<Value> = CATEGORIZERS
        .iter()
        .map(|id| json!({"id": id, "title": id.replace('_', " ")}))
        .collect();
    Ok(Json(Value::Array(list)))
}

async fn categorizations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(categorizer): Path<String>,
    Query(params): Params,
) -> Reply {
    authorize(&state, &headers)?;
    if !CATEGORIZERS.contains(&categorizer.as_str()) {
        return Err(ApiFailure::bad_request(format!("Unknown categorizer: {categorizer}")));
    }
    let results: Vec<Value> = images(&state, &params)
        .await?
        .into_iter()
        .map(|mut entry| {
            entry["categories"] = json!([{"confidence": 100.0, "name": categorizer}]);
            entry
        })
        .collect();
    Ok(Json(json!({ "results": results })))
}

async fn croppings(State(state): State<AppState>, headers: HeaderMap, Query(params): Params) -> Reply {
    authorize(&state, &headers)?;
    let resolutions = param(&params, "resolution")
        .ok_or_else(|| ApiFailure::bad_request("Missing resolution"))?
        .split(',')
        .map(|res| {
            res.split_once('x')
                .and_then(|(w, h)| Some((w.parse::<u32>().ok()?, h.parse::<u32>().ok()?)))
                .ok_or_else(|| ApiFailure::bad_request(format!("Invalid resolution: {res}")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let no_scaling = flag(&params, "no_scaling", false);

    let croppings: Vec<Value> = resolutions
        .iter()
        .map(|(w, h)| {
            json!({"target_width": w, "target_height": h, "x1": 0, "y1": 0, "x2": w, "y2": h})
        })
        .collect();
    let results: Vec<Value> = images(&state, &params)
        .await?
        .into_iter()
        .map(|mut entry| {
            entry["croppings"] = json!(croppings);
            entry["no_scaling"] = json!(no_scaling);
            entry
        })
        .collect();
    Ok(Json(json!({ "results": results })))
}

async fn colors(State(state): State<AppState>, headers: HeaderMap, Query(params): Params) -> Reply {
    authorize(&state, &headers)?;
    let overall = flag(&params, "extract_overall_colors", true);
    let object = flag(&params, "extract_object_colors", true);
    let swatch = json!([{"html_code": "#808080", "percentage": 100.0}]);

    let results: Vec<Value> = images(&state, &params)
        .await?
        .into_iter()
        .map(|mut entry| {
            let mut info = json!({});
            if overall {
                info["background_colors"] = swatch.clone();
                info["foreground_colors"] = swatch.clone();
            }
            if object {
                info["image_colors"] = swatch.clone();
            }
            entry["info"] = info;
            entry
        })
        .collect();
    Ok(Json(json!({ "results": results })))
}

async fn upload(State(state): State<AppState>, headers: HeaderMap, mut multipart: Multipart) -> Reply {
    authorize(&state, &headers)?;
    let mut uploaded = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiFailure::bad_request(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiFailure::bad_request(format!("Malformed upload: {e}")))?;
        if data.is_empty() {
            return Err(ApiFailure::bad_request("Empty image"));
        }
        let id = Uuid::new_v4().simple().to_string();
        state.store.write().await.insert(id.clone(), data.to_vec());
        uploaded.push(Uploaded { id, filename });
    }
    if uploaded.is_empty() {
        return Err(ApiFailure::bad_request("Missing image field"));
    }
    Ok(Json(json!({"status": "success", "uploaded": uploaded})))
}

async fn delete_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply {
    authorize(&state, &headers)?;
    match state.store.write().await.remove(&id) {
        Some(_) => Ok(Json(json!({"status": "success"}))),
        None => Err(ApiFailure::new(
            StatusCode::NOT_FOUND,
            format!("Unknown content id: {id}"),
        )),
    }
}

/// Public image host for upload-by-URL. Only `.png` and `.jpg` names exist.
async fn image(Path(name): Path<String>) -> Response {
    if name.ends_with(".png") || name.ends_with(".jpg") {
        ([(header::CONTENT_TYPE, "image/png")], SAMPLE_IMAGE).into_response()
    } else {
        (StatusCode::NOT_FOUND, "no such image").into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn param_returns_first_match() {
        let params = pairs(&[("url", "a"), ("resolution", "1x1"), ("url", "b")]);
        assert_eq!(param(&params, "url"), Some("a"));
        assert_eq!(param(&params, "resolution"), Some("1x1"));
        assert_eq!(param(&params, "content"), None);
    }

    #[test]
    fn flag_falls_back_to_default() {
        let params = pairs(&[("no_scaling", "1"), ("extract_object_colors", "0")]);
        assert!(flag(&params, "no_scaling", false));
        assert!(!flag(&params, "extract_object_colors", true));
        assert!(flag(&params, "extract_overall_colors", true));
    }

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.api_key, DEFAULT_API_KEY);
        assert_eq!(config.api_secret, DEFAULT_API_SECRET);
    }

    #[test]
    fn uploaded_serializes_to_json() {
        let uploaded = Uploaded {
            id: "0123456789abcdef0123456789abcdef".to_string(),
            filename: "a.png".to_string(),
        };
        let json = serde_json::to_value(&uploaded).unwrap();
        assert_eq!(json["id"], "0123456789abcdef0123456789abcdef");
        assert_eq!(json["filename"], "a.png");
    }
}
