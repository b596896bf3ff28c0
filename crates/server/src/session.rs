//! WebSocket transport adapter.
//!
//! A connection must identify itself in its first frame (`attach` with a
//! stable player id and display name; bearer token optional) or it is
//! closed. After attach, one task owns both directions: outbound messages
//! drain from the connection's outbox ahead of inbound frames, so each
//! socket has exactly one writer and ordered delivery.

use crate::AppState;
use crate::sit::SitRequest;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;
use actix_ws::Message;
use actix_ws::MessageStream;
use actix_ws::Session;
use futures::StreamExt;
use gf_auth::Claims;
use gf_core::DEFAULT_TOKEN;
use gf_core::DEFAULT_SEATS;
use gf_core::SessionId;
use gf_core::TURN_TIMEOUT_SECS;
use gf_engine::Action;
use gf_engine::TableConfig;
use gf_room::ClientMessage;
use gf_room::Outbox;
use gf_room::Profile;
use gf_room::RoomCmd;
use gf_room::ServerMessage;
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

const ATTACH_WINDOW: Duration = Duration::from_secs(10);

pub async fn enter(
    state: web::Data<AppState>,
    body: web::Payload,
    req: HttpRequest,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            actix_web::rt::spawn(bridge(state, session, stream));
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn bridge(state: web::Data<AppState>, mut ws: Session, mut stream: MessageStream) {
    let attach = tokio::time::timeout(ATTACH_WINDOW, first_text(&mut stream))
        .await
        .ok()
        .flatten()
        .and_then(parse_attach);
    let Some((profile, token)) = attach else {
        log::info!("connection failed attach handshake, closing");
        let _ = ws.close(None).await;
        return;
    };
    let claims = token.as_deref().and_then(|t| state.tokens.verify(t).ok());
    let session_id: SessionId = uuid::Uuid::now_v7().to_string();
    let (outbox, mut inbox) = unbounded_channel::<ServerMessage>();
    let connection = Connection {
        state: state.clone(),
        session_id: session_id.clone(),
        profile,
        claims,
        outbox: outbox.clone(),
    };
    connection.send(ServerMessage::Attached {
        player_id: connection.profile.id.clone(),
    });
    log::info!(
        "session {} attached as {}",
        session_id,
        connection.profile.id
    );
    // rooms holding this player swap in the fresh session
    state
        .registry
        .reconnect(&connection.profile.id, &session_id, outbox.clone())
        .await;
    'conn: loop {
        tokio::select! {
            biased;
            msg = inbox.recv() => match msg {
                Some(message) => if ws.text(message.to_json()).await.is_err() { break 'conn },
                None => break 'conn,
            },
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => connection.dispatch(&text).await,
                Some(Ok(Message::Ping(bytes))) => if ws.pong(&bytes).await.is_err() { break 'conn },
                Some(Ok(Message::Close(_))) => break 'conn,
                Some(Err(_)) => break 'conn,
                None => break 'conn,
                _ => continue 'conn,
            },
        }
    }
    log::info!("session {} dropped", session_id);
    state.registry.disconnect(&session_id).await;
}

async fn first_text(stream: &mut MessageStream) -> Option<String> {
    while let Some(msg) = stream.next().await {
        match msg {
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(Message::Close(_)) | Err(_) => return None,
            _ => continue,
        }
    }
    None
}

fn parse_attach(text: String) -> Option<(Profile, Option<String>)> {
    match serde_json::from_str::<ClientMessage>(&text) {
        Ok(ClientMessage::Attach {
            player_id,
            name,
            token,
        }) if !player_id.is_empty() && !name.is_empty() => Some((
            Profile {
                id: player_id,
                name,
                avatar_seed: String::new(),
            },
            token,
        )),
        _ => None,
    }
}

struct Connection {
    state: web::Data<AppState>,
    session_id: SessionId,
    profile: Profile,
    claims: Option<Claims>,
    outbox: Outbox,
}

impl Connection {
    fn send(&self, message: ServerMessage) {
        let _ = self.outbox.send(message);
    }

    async fn dispatch(&self, text: &str) {
        let message = match serde_json::from_str::<ClientMessage>(text) {
            Ok(message) => message,
            Err(e) => {
                self.send(ServerMessage::Error {
                    message: format!("malformed message: {}", e),
                });
                return;
            }
        };
        match message {
            // the handshake already happened; repeats are noise
            ClientMessage::Attach { .. } => {}
            ClientMessage::Ping { t } => self.send(ServerMessage::Pong { t }),
            ClientMessage::RequestTables => {
                let tables = self.state.registry.lobby().await;
                self.send(ServerMessage::TablesList { tables });
            }
            ClientMessage::CreateTable {
                name,
                small_blind,
                big_blind,
                min_buy_in,
                max_buy_in,
                max_players,
            } => {
                let config = TableConfig {
                    small_blind,
                    big_blind,
                    min_buy_in,
                    max_buy_in,
                    max_seats: max_players.unwrap_or(DEFAULT_SEATS),
                    turn_timeout_secs: TURN_TIMEOUT_SECS,
                    token: DEFAULT_TOKEN.to_string(),
                    premium: false,
                };
                match self
                    .state
                    .registry
                    .create(name, self.profile.id.clone(), config)
                    .await
                {
                    Ok(table_id) => self.send(ServerMessage::TableCreated { table_id }),
                    Err(message) => self.send(ServerMessage::Error { message }),
                }
            }
            ClientMessage::ReserveSeat { table_id, seat } => {
                let Some(handle) = self.state.registry.handle(&table_id).await else {
                    return self.reserve_ack(table_id, Some("table not found".to_string()));
                };
                let (reply, confirm) = oneshot::channel();
                let sent = handle.tx.send(RoomCmd::Reserve {
                    seat,
                    player: self.profile.clone(),
                    reply,
                });
                let result = match sent {
                    Ok(()) => confirm.await.unwrap_or(Err("table closed".to_string())),
                    Err(_) => Err("table closed".to_string()),
                };
                self.reserve_ack(table_id, result.err());
            }
            ClientMessage::ReleaseSeat { table_id, seat } => {
                if let Some(handle) = self.state.registry.handle(&table_id).await {
                    let _ = handle.tx.send(RoomCmd::Release {
                        seat,
                        player: Some(self.profile.id.clone()),
                    });
                }
            }
            ClientMessage::SitAtSeat {
                table_id,
                buy_in,
                seat,
                profile,
                tx_id,
                wallet_address,
            } => {
                let mut who = self.profile.clone();
                if let Some(overrides) = profile {
                    if let Some(name) = overrides.name {
                        who.name = name;
                    }
                    if let Some(avatar) = overrides.avatar_seed {
                        who.avatar_seed = avatar;
                    }
                }
                let request = SitRequest {
                    table_id: table_id.clone(),
                    buy_in,
                    seat,
                    profile: who,
                    tx_id,
                    wallet: wallet_address,
                };
                let result = crate::sit::sit_at_seat(
                    &self.state,
                    &self.session_id,
                    self.outbox.clone(),
                    self.claims.as_ref(),
                    request,
                )
                .await;
                match result {
                    Ok(seat_index) => self.send(ServerMessage::SitAck {
                        table_id,
                        seat_index: Some(seat_index),
                        error: None,
                    }),
                    Err(error) => self.send(ServerMessage::SitAck {
                        table_id,
                        seat_index: None,
                        error: Some(error),
                    }),
                }
            }
            ClientMessage::JoinTable {
                table_id,
                buy_in,
                player_name,
            } => {
                let mut who = self.profile.clone();
                if !player_name.is_empty() {
                    who.name = player_name;
                }
                let request = SitRequest {
                    table_id: table_id.clone(),
                    buy_in,
                    seat: None,
                    profile: who,
                    tx_id: None,
                    wallet: None,
                };
                let result = crate::sit::sit_at_seat(
                    &self.state,
                    &self.session_id,
                    self.outbox.clone(),
                    self.claims.as_ref(),
                    request,
                )
                .await;
                match result {
                    Ok(seat_index) => self.send(ServerMessage::SitAck {
                        table_id,
                        seat_index: Some(seat_index),
                        error: None,
                    }),
                    Err(error) => self.send(ServerMessage::SitAck {
                        table_id,
                        seat_index: None,
                        error: Some(error),
                    }),
                }
            }
            ClientMessage::LeaveTable { table_id } => {
                if let Some(handle) = self.state.registry.handle(&table_id).await {
                    let _ = handle.tx.send(RoomCmd::Leave {
                        session: self.session_id.clone(),
                    });
                }
            }
            ClientMessage::WatchTable { table_id } => {
                if let Some(handle) = self.state.registry.handle(&table_id).await {
                    let _ = handle.tx.send(RoomCmd::Watch {
                        session: self.session_id.clone(),
                        outbox: self.outbox.clone(),
                    });
                }
            }
            ClientMessage::PlayerAction {
                table_id,
                action,
                amount,
            } => match Action::parse(&action, amount) {
                Ok(action) => {
                    if let Some(handle) = self.state.registry.handle(&table_id).await {
                        let _ = handle.tx.send(RoomCmd::Action {
                            session: self.session_id.clone(),
                            action,
                        });
                    }
                }
                Err(message) => self.send(ServerMessage::Error { message }),
            },
        }
    }

    fn reserve_ack(&self, table_id: String, error: Option<String>) {
        self.send(ServerMessage::ReserveAck {
            table_id,
            ok: error.is_none(),
            error,
        });
    }
}
