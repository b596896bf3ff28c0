use super::snapshot::LobbyEntry;
use super::snapshot::TableSnapshot;
use gf_core::Chips;
use gf_core::PlayerId;
use gf_core::Position;
use gf_core::RoomId;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// A connection's outbound queue. One writer task per socket drains it.
pub type Outbox = UnboundedSender<ServerMessage>;

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Attach acknowledged.
    Attached {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    /// Latency probe echo.
    Pong { t: u64 },
    /// Lobby snapshot.
    TablesList { tables: Vec<LobbyEntry> },
    /// Whole per-recipient table state.
    TableState {
        #[serde(flatten)]
        state: Box<TableSnapshot>,
    },
    /// Full personalized state pushed after a reconnect.
    ReconnectState {
        #[serde(flatten)]
        state: Box<TableSnapshot>,
    },
    /// A new ephemeral table exists.
    TableCreated {
        #[serde(rename = "tableId")]
        table_id: RoomId,
    },
    SeatReserved {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    SeatReleased {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
    },
    PlayerJoined {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        name: String,
    },
    PlayerLeft {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    GameStarted {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        #[serde(rename = "handId")]
        hand_id: String,
    },
    /// The acting player's deadline. Unicast to that player only.
    TurnStart {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
        #[serde(rename = "turnTimeoutAt")]
        turn_timeout_at: u64,
    },
    /// Echo of a successfully applied action, to the actor.
    ActionAck {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        sequence: u64,
        action: String,
    },
    HandResult {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        rake: Chips,
        result: gf_engine::HandResult,
    },
    PlayerKicked {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
        #[serde(rename = "playerId")]
        player_id: PlayerId,
    },
    CashOutComplete {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        amount: Chips,
        #[serde(rename = "txId")]
        txid: Option<String>,
    },
    /// Command acknowledgement: reserve.
    ReserveAck {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Command acknowledgement: sit / join.
    SitAck {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        #[serde(rename = "seatIndex", skip_serializing_if = "Option::is_none")]
        seat_index: Option<Position>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Targeted recoverable failure.
    Error { message: String },
}

impl ServerMessage {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_tag_with_snake_case_type() {
        let json = ServerMessage::SeatReleased {
            table_id: "table-low-1".to_string(),
            seat: 2,
        }
        .to_json();
        assert!(json.contains(r#""type":"seat_released""#));
        assert!(json.contains(r#""tableId":"table-low-1""#));
    }

    #[test]
    fn absent_txid_serializes_as_null() {
        let json = ServerMessage::CashOutComplete {
            table_id: "t".to_string(),
            amount: 750_000,
            txid: None,
        }
        .to_json();
        assert!(json.contains(r#""txId":null"#));
    }
}
