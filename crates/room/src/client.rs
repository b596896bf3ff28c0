use gf_core::Chips;
use gf_core::Position;
use gf_core::RoomId;
use serde::Deserialize;

/// Commands from a connection, after the attach handshake.
///
/// `request_tables` keeps its legacy `get_tables` spelling as an alias.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Attach {
        #[serde(rename = "playerId")]
        player_id: String,
        name: String,
        #[serde(default)]
        token: Option<String>,
    },
    Ping {
        #[serde(default)]
        t: u64,
    },
    #[serde(alias = "get_tables")]
    RequestTables,
    CreateTable {
        name: String,
        #[serde(rename = "smallBlind")]
        small_blind: Chips,
        #[serde(rename = "bigBlind")]
        big_blind: Chips,
        #[serde(rename = "minBuyIn")]
        min_buy_in: Chips,
        #[serde(rename = "maxBuyIn")]
        max_buy_in: Chips,
        #[serde(rename = "maxPlayers", default)]
        max_players: Option<usize>,
    },
    ReserveSeat {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
    },
    ReleaseSeat {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        seat: Position,
    },
    SitAtSeat {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        #[serde(rename = "buyIn")]
        buy_in: Chips,
        #[serde(default)]
        seat: Option<Position>,
        #[serde(default)]
        profile: Option<SitProfile>,
        #[serde(rename = "txId", default)]
        tx_id: Option<String>,
        #[serde(rename = "walletAddress", default)]
        wallet_address: Option<String>,
    },
    JoinTable {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        #[serde(rename = "buyIn")]
        buy_in: Chips,
        #[serde(rename = "playerName")]
        player_name: String,
    },
    LeaveTable {
        #[serde(rename = "tableId")]
        table_id: RoomId,
    },
    WatchTable {
        #[serde(rename = "tableId")]
        table_id: RoomId,
    },
    PlayerAction {
        #[serde(rename = "tableId")]
        table_id: RoomId,
        action: String,
        #[serde(default)]
        amount: Option<Chips>,
    },
}

/// Display fields a client may attach to a sit request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SitProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar_seed: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_tables_accepts_both_spellings() {
        for raw in [r#"{"type":"request_tables"}"#, r#"{"type":"get_tables"}"#] {
            let msg: ClientMessage = serde_json::from_str(raw).expect("parse");
            assert!(matches!(msg, ClientMessage::RequestTables));
        }
    }

    #[test]
    fn player_action_parses_with_and_without_amount() {
        let raw = r#"{"type":"player_action","tableId":"table-low-1","action":"raise","amount":40}"#;
        let msg: ClientMessage = serde_json::from_str(raw).expect("parse");
        match msg {
            ClientMessage::PlayerAction { action, amount, .. } => {
                assert_eq!(action, "raise");
                assert_eq!(amount, Some(40));
            }
            other => panic!("unexpected {:?}", other),
        }
        let raw = r#"{"type":"player_action","tableId":"t","action":"fold"}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_ok());
    }

    #[test]
    fn sit_at_seat_parses_vault_fields() {
        let raw = r#"{
            "type":"sit_at_seat","tableId":"table-low-1","buyIn":1000000,"seat":2,
            "txId":"5K8...sig","walletAddress":"9xQe...key",
            "profile":{"name":"Ace","avatarSeed":"a1"}
        }"#;
        let msg: ClientMessage = serde_json::from_str(raw).expect("parse");
        match msg {
            ClientMessage::SitAtSeat {
                seat,
                tx_id,
                wallet_address,
                profile,
                ..
            } => {
                assert_eq!(seat, Some(2));
                assert!(tx_id.is_some());
                assert!(wallet_address.is_some());
                assert_eq!(profile.expect("profile").name.as_deref(), Some("Ace"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_identity_fails_attach_parse() {
        let raw = r#"{"type":"attach","name":"NoId"}"#;
        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }
}
