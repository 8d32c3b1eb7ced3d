use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use log::*;
use serde_json::Value;

use crate::database::Database;
use crate::errors::{ApiError, DataError};
use crate::interface::app::AppState;
use crate::interface::views::{AppearanceView, EpisodeView, GuestView, MessageView};
use crate::store::{db, AppearanceFields};

const EPISODE_NOT_FOUND: &str = "Episode not found";
const MISSING_FIELDS: &str = "Missing required fields";
const DANGLING_REFERENCE: &str = "Episode or Guest not found";
const CREATE_FAILED: &str = "Failed to create appearance";

/// Parse a raw appearance body.
///
/// Only presence is checked here: values that are not integers are carried as
/// `None` so the store can report unknown records before a bad rating.
pub fn parse_appearance(body: &[u8]) -> Result<AppearanceFields, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|err| {
        warn!("Unreadable appearance body: {}", err);
        ApiError::InvalidArgument(CREATE_FAILED.to_string())
    })?;

    let Some(fields) = value.as_object() else {
        return Err(ApiError::InvalidArgument(MISSING_FIELDS.to_string()));
    };
    let (Some(rating), Some(episode_id), Some(guest_id)) = (
        fields.get("rating"),
        fields.get("episode_id"),
        fields.get("guest_id"),
    ) else {
        return Err(ApiError::InvalidArgument(MISSING_FIELDS.to_string()));
    };

    Ok(AppearanceFields {
        rating: integer(rating),
        episode_id: integer(episode_id),
        guest_id: integer(guest_id),
    })
}

// unsigned values past i64::MAX saturate; they are out of every valid range anyway
fn integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|_| i64::MAX))
}

/// Path ids that are not an `i32` can never name a row.
fn episode_id_from_path(raw: &str) -> Result<i32, ApiError> {
    raw.parse().map_err(|_| {
        debug!("Episode id {:?} is not a row id", raw);
        ApiError::NotFound(EPISODE_NOT_FOUND.to_string())
    })
}

/// Any failure while creating an appearance is reported as a bad request.
fn creation_failure(err: ApiError) -> ApiError {
    match err {
        ApiError::Internal => ApiError::InvalidArgument(CREATE_FAILED.to_string()),
        other => other,
    }
}

pub fn list_episodes(database: &Database) -> Result<Vec<EpisodeView>, ApiError> {
    let mut ctx = database.connection()?;
    Ok(db::list_episodes(&mut ctx)?
        .iter()
        .map(EpisodeView::from)
        .collect())
}

pub fn get_episode(database: &Database, episode_id: i32) -> Result<EpisodeView, ApiError> {
    let mut ctx = database.connection()?;
    db::episode_detail(&mut ctx, episode_id)?
        .map(|detail| EpisodeView::from(&detail))
        .ok_or_else(|| ApiError::NotFound(EPISODE_NOT_FOUND.to_string()))
}

pub fn list_guests(database: &Database) -> Result<Vec<GuestView>, ApiError> {
    let mut ctx = database.connection()?;
    Ok(db::list_guests(&mut ctx)?.iter().map(GuestView::from).collect())
}

/// Create an appearance from a raw JSON body.
///
/// Storage failures other than the expected ones collapse into a single
/// generic message; the underlying error only goes to the log.
pub fn create_appearance(database: &Database, body: &[u8]) -> Result<AppearanceView, ApiError> {
    let params = parse_appearance(body)?;

    let created = database
        .connection()
        .and_then(|mut ctx| db::create_appearance_from(&mut ctx, &params));

    match created {
        Ok(detail) => Ok(AppearanceView::from(&detail)),
        Err(DataError::NotFound) => Err(ApiError::InvalidArgument(DANGLING_REFERENCE.to_string())),
        Err(DataError::Validation(msg)) => Err(ApiError::InvalidArgument(msg)),
        Err(err) => {
            error!("Failed to create appearance {:?}: {}", params, err);
            Err(ApiError::InvalidArgument(CREATE_FAILED.to_string()))
        }
    }
}

pub fn delete_episode(database: &Database, episode_id: i32) -> Result<MessageView, ApiError> {
    let mut ctx = database.connection()?;
    match db::delete_episode(&mut ctx, episode_id) {
        Ok(_) => Ok(MessageView {
            message: "Episode deleted successfully".to_string(),
        }),
        Err(DataError::NotFound) => Err(ApiError::NotFound(EPISODE_NOT_FOUND.to_string())),
        Err(err) => Err(err.into()),
    }
}

pub async fn list_episodes_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<EpisodeView>>, ApiError> {
    debug!("GET /episodes");
    state.with_db(list_episodes).await.map(Json)
}

pub async fn get_episode_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<EpisodeView>, ApiError> {
    debug!("GET /episodes/{}", raw_id);
    let episode_id = episode_id_from_path(&raw_id)?;
    state
        .with_db(move |database| get_episode(database, episode_id))
        .await
        .map(Json)
}

pub async fn list_guests_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<GuestView>>, ApiError> {
    debug!("GET /guests");
    state.with_db(list_guests).await.map(Json)
}

pub async fn create_appearance_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<AppearanceView>), ApiError> {
    debug!("POST /appearances");
    let view = state
        .with_db(move |database| create_appearance(database, &body))
        .await
        .map_err(creation_failure)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn delete_episode_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageView>, ApiError> {
    debug!("DELETE /episodes/{}", raw_id);
    let episode_id = episode_id_from_path(&raw_id)?;
    state
        .with_db(move |database| delete_episode(database, episode_id))
        .await
        .map(Json)
}
