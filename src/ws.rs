use crate::{
    client::{Client, Joined, PlayerAction},
    error::GameError,
    game::{GameOptions, PlayerId},
    session::{Outbound, SessionManager, SessionToken},
};
use futures_util::{select, FutureExt, SinkExt, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;

pub async fn accept_connection(stream: TcpStream, manager: &SessionManager) {
    log::info!("Accepted new connection");

    let Ok(stream) = tokio_tungstenite::accept_async(stream).await else {
        log::error!("Error occured during websocket handshake");
        return;
    };
    let (mut write, read) = stream.split();
    let mut read = read.fuse();

    let mut client = Client::new(manager);

    loop {
        select! {
            msg = read.try_next() => {
                let Ok(Some(msg)) = msg else {
                    break;
                };
                let msg = match msg {
                    Message::Text(msg) => msg,
                    Message::Close(_) => break,
                    _ => continue,
                };
                let Ok(req) = serde_json::from_str::<Request>(&msg) else {
                    log::error!("Invalid message received: {}", &msg);
                    break;
                };
                client.heartbeat();
                let reply = match process_request(req, &mut client) {
                    Ok(Some(reply)) => reply,
                    Ok(None) => continue,
                    Err(err) => {
                        log::warn!("Rejected request in game {:?}: {}", client.game_id(), err);
                        Response::Error { error: err.to_string() }
                    }
                };
                let Ok(reply) = serde_json::to_string(&reply) else {
                    continue;
                };
                if write.send(Message::Text(reply)).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            },
            update = client.next_message().fuse() => {
                let Some(update) = update else {
                    client.detach();
                    continue;
                };
                let Ok(update) = serde_json::to_string::<Outbound>(&update) else {
                    continue;
                };
                if write.send(Message::Text(update)).await.is_err() {
                    log::error!("Could not send websockets message");
                    break;
                }
            }
        }
    }

    client.leave();
    log::info!("Connection closed");
}

/// A message sent by a game client to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Request {
    CreateGame {
        name: String,
        #[serde(default)]
        options: GameOptions,
    },
    JoinGame {
        #[serde(rename = "gameId")]
        game_id: String,
        name: String,
    },
    RejoinGame {
        #[serde(rename = "gameId")]
        game_id: String,
        token: SessionToken,
    },
    StartGame,
    LeaveGame,
    Heartbeat,
    Nominate {
        chancellor: PlayerId,
    },
    Vote {
        vote: crate::game::Vote,
    },
    PresidentDiscard {
        index: usize,
    },
    ChancellorDiscard {
        index: usize,
    },
    UsePower {
        power: crate::game::ExecutivePower,
        target: PlayerId,
    },
}

/// A message sent by the server to a game client in reply to a request.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Response {
    GameCreated(Joined),
    GameJoined(Joined),
    Error {
        error: String,
    },
}

/// Processes a request from the client.
fn process_request(req: Request, client: &mut Client) -> Result<Option<Response>, GameError> {
    let action = match req {
        Request::CreateGame { name, options } => {
            return Ok(Some(Response::GameCreated(client.create_game(&name, options)?)));
        }
        Request::JoinGame { game_id, name } => {
            return Ok(Some(Response::GameJoined(client.join_game(&game_id, &name)?)));
        }
        Request::RejoinGame { game_id, token } => {
            return Ok(Some(Response::GameJoined(client.rejoin_game(&game_id, token)?)));
        }
        Request::StartGame => {
            client.start_game()?;
            return Ok(None);
        }
        Request::LeaveGame => {
            client.leave();
            return Ok(None);
        }
        Request::Heartbeat => return Ok(None),
        Request::Nominate { chancellor } => PlayerAction::Nominate { chancellor },
        Request::Vote { vote } => PlayerAction::Vote { vote },
        Request::PresidentDiscard { index } => PlayerAction::PresidentDiscard { index },
        Request::ChancellorDiscard { index } => PlayerAction::ChancellorDiscard { index },
        Request::UsePower { power, target } => PlayerAction::UsePower { power, target },
    };
    client.player_action(action)?;
    Ok(None)
}
