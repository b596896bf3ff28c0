//! Seat-map and hand-history persistence.
//!
//! Seats serialize as one JSON document per room: the whole map is tiny
//! and always written together. Hand records are an append-only audit
//! trail; the chips already moved inside the hand.

use gf_core::RoomId;
use gf_database::HANDS;
use gf_database::PgErr;
use gf_database::SEATS;
use gf_database::Schema;
use gf_engine::HandResult;
use gf_room::PersistedSeat;
use std::sync::Arc;
use tokio_postgres::Client;

/// One room's persisted seat map.
pub struct SeatMap;

impl Schema for SeatMap {
    fn name() -> &'static str {
        SEATS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            SEATS,
            " (
                room        TEXT PRIMARY KEY,
                data        TEXT NOT NULL,
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            );"
        )
    }
    fn indices() -> &'static str {
        ""
    }
}

/// One completed hand.
pub struct HandRecord;

impl Schema for HandRecord {
    fn name() -> &'static str {
        HANDS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            HANDS,
            " (
                id          TEXT PRIMARY KEY,
                room        TEXT NOT NULL,
                pot         BIGINT NOT NULL,
                seed        TEXT NOT NULL,
                data        TEXT NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_hands_room ON ",
            HANDS,
            " (room);"
        )
    }
}

#[allow(async_fn_in_trait)]
pub trait RoomStore {
    async fn save_seats(&self, room: &RoomId, seats: &[PersistedSeat]) -> Result<(), PgErr>;
    async fn load_seats(&self, room: &RoomId) -> Result<Vec<PersistedSeat>, PgErr>;
    async fn save_hand(&self, room: &RoomId, result: &HandResult) -> Result<(), PgErr>;
}

impl RoomStore for Arc<Client> {
    async fn save_seats(&self, room: &RoomId, seats: &[PersistedSeat]) -> Result<(), PgErr> {
        let data = serde_json::to_string(seats).expect("serialize seats");
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                SEATS,
                " (room, data, updated_at) VALUES ($1, $2, now())
                 ON CONFLICT (room) DO UPDATE SET data = EXCLUDED.data, updated_at = now()"
            ),
            &[&room, &data],
        )
        .await
        .map(|_| ())
    }

    async fn load_seats(&self, room: &RoomId) -> Result<Vec<PersistedSeat>, PgErr> {
        self.query_opt(
            const_format::concatcp!("SELECT data FROM ", SEATS, " WHERE room = $1"),
            &[&room],
        )
        .await
        .map(|opt| {
            opt.and_then(|row| serde_json::from_str(&row.get::<_, String>(0)).ok())
                .unwrap_or_default()
        })
    }

    async fn save_hand(&self, room: &RoomId, result: &HandResult) -> Result<(), PgErr> {
        let data = serde_json::to_string(result).expect("serialize hand result");
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                HANDS,
                " (id, room, pot, seed, data) VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (id) DO NOTHING"
            ),
            &[
                &result.hand_id,
                &room,
                &(result.pot as i64),
                &result.seed,
                &data,
            ],
        )
        .await
        .map(|_| ())
    }
}
