use crate::error::GameError;
use crate::game::{GameOptions, PublicState};
use crate::session::{lock, SessionManager, SessionSummary};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateGame {
    host_name: String,
    #[serde(default)]
    options: GameOptions,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GameCreated {
    game_id: String,
    player_id: String,
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Sessions {
    num_sessions: usize,
    games: Vec<SessionSummary>,
}

pub fn make_router(manager: &'static SessionManager) -> Router {
    Router::new()
        .route("/games", post(create_game))
        .route("/games/:id", get(get_game))
        .route("/sessions", get(get_sessions))
        .with_state(manager)
}

async fn create_game(
    State(manager): State<&'static SessionManager>,
    Json(req): Json<CreateGame>,
) -> Result<Json<GameCreated>, (StatusCode, String)> {
    let (session, host) = manager.create_game(&req.host_name, req.options).map_err(reject)?;
    let game_id = lock(&session).map_err(reject)?.id().to_string();
    Ok(Json(GameCreated {
        game_id,
        player_id: host.player.to_string(),
        token: host.token.to_string(),
    }))
}

async fn get_game(
    State(manager): State<&'static SessionManager>,
    Path(id): Path<String>,
) -> Result<Json<PublicState>, (StatusCode, String)> {
    let session = manager.find_game(&id).map_err(reject)?;
    let state = lock(&session).map_err(reject)?.public_state();
    Ok(Json(state))
}

async fn get_sessions(State(manager): State<&'static SessionManager>) -> Json<Sessions> {
    Json(Sessions {
        num_sessions: manager.num_games(),
        games: manager.list_games(),
    })
}

fn reject(err: GameError) -> (StatusCode, String) {
    let status = match err {
        GameError::GameNotFound => StatusCode::NOT_FOUND,
        GameError::RegistryUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::BAD_REQUEST,
    };
    (status, err.to_string())
}
