use super::hooks::RoomHooks;
use super::inbox::RoomCmd;
use super::room::Room;
use super::room::RoomHandle;
use super::snapshot::LobbyEntry;
use gf_core::PlayerId;
use gf_core::RoomId;
use gf_core::SessionId;
use gf_engine::TableConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::oneshot;

/// A predefined table that exists from boot and is never destroyed.
#[derive(Debug, Clone)]
pub struct TableDef {
    pub id: RoomId,
    pub name: String,
    pub config: TableConfig,
}

impl TableDef {
    /// The stock lineup: two low-stakes tables and a premium one.
    pub fn house_tables() -> Vec<TableDef> {
        let low = TableConfig {
            small_blind: 5_000,
            big_blind: 10_000,
            min_buy_in: 200_000,
            max_buy_in: 2_000_000,
            ..TableConfig::default()
        };
        let high = TableConfig {
            small_blind: 100_000,
            big_blind: 200_000,
            min_buy_in: 4_000_000,
            max_buy_in: 40_000_000,
            premium: true,
            ..TableConfig::default()
        };
        vec![
            TableDef {
                id: "table-low-1".to_string(),
                name: "Driftwood".to_string(),
                config: low.clone(),
            },
            TableDef {
                id: "table-low-2".to_string(),
                name: "Boardwalk".to_string(),
                config: low,
            },
            TableDef {
                id: "table-high-1".to_string(),
                name: "Gilded Flop".to_string(),
                config: high,
            },
        ]
    }
}

/// Catalog of live rooms.
///
/// Persistent rooms are constructed at boot with their persisted seats
/// restored (disconnected, awaiting their players). Ephemeral rooms are
/// created by players and reap themselves once empty past the grace
/// window; the registry prunes handles whose tasks have exited.
pub struct Registry {
    rooms: RwLock<HashMap<RoomId, RoomHandle>>,
    hooks: Arc<dyn RoomHooks>,
}

impl Registry {
    pub async fn boot(hooks: Arc<dyn RoomHooks>, defs: Vec<TableDef>) -> Self {
        let mut rooms = HashMap::new();
        for def in defs {
            let restored = hooks.restore_seats(&def.id).await;
            if !restored.is_empty() {
                log::info!("room {} restored {} seats", def.id, restored.len());
            }
            let handle = Room::spawn(
                def.id.clone(),
                def.name,
                "house".to_string(),
                def.config,
                true,
                hooks.clone(),
                restored,
            );
            rooms.insert(def.id, handle);
        }
        Self {
            rooms: RwLock::new(rooms),
            hooks,
        }
    }

    /// Create an ephemeral player room. Returns its id.
    pub async fn create(
        &self,
        name: String,
        creator: PlayerId,
        config: TableConfig,
    ) -> Result<RoomId, String> {
        config.validate()?;
        let id = format!("table-{}", uuid::Uuid::now_v7());
        let handle = Room::spawn(
            id.clone(),
            name,
            creator,
            config,
            false,
            self.hooks.clone(),
            Vec::new(),
        );
        self.rooms.write().await.insert(id.clone(), handle);
        log::info!("created ephemeral room {}", id);
        Ok(id)
    }

    pub async fn handle(&self, id: &str) -> Option<RoomHandle> {
        let handle = self.rooms.read().await.get(id).cloned();
        match handle {
            Some(handle) if !handle.tx.is_closed() => Some(handle),
            Some(_) => {
                self.rooms.write().await.remove(id);
                None
            }
            None => None,
        }
    }

    /// Lobby snapshot: ask every live room for its entry, prune the dead.
    pub async fn lobby(&self) -> Vec<LobbyEntry> {
        let handles = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(id, handle)| (id.clone(), handle.clone()))
            .collect::<Vec<(RoomId, RoomHandle)>>();
        let mut entries = Vec::new();
        let mut dead = Vec::new();
        for (id, handle) in handles {
            let (reply, confirm) = oneshot::channel();
            if handle.tx.send(RoomCmd::LobbyInfo { reply }).is_err() {
                dead.push(id);
                continue;
            }
            match confirm.await {
                Ok(entry) => entries.push(entry),
                Err(_) => dead.push(id),
            }
        }
        if !dead.is_empty() {
            let mut rooms = self.rooms.write().await;
            for id in dead {
                rooms.remove(&id);
            }
        }
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        entries
    }

    /// Session drop: every room learns, grace timers start where seated.
    pub async fn disconnect(&self, session: &SessionId) {
        for handle in self.rooms.read().await.values() {
            let _ = handle.tx.send(RoomCmd::Disconnect {
                session: session.clone(),
            });
        }
    }

    /// Reconnect fan-out: rooms holding this player swap in the session.
    pub async fn reconnect(&self, player: &PlayerId, session: &SessionId, outbox: super::Outbox) {
        for handle in self.rooms.read().await.values() {
            let _ = handle.tx.send(RoomCmd::Reconnect {
                player: player.clone(),
                session: session.clone(),
                outbox: outbox.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::NullHooks;

    #[tokio::test]
    async fn boot_registers_house_tables() {
        let registry = Registry::boot(Arc::new(NullHooks), TableDef::house_tables()).await;
        let lobby = registry.lobby().await;
        assert_eq!(lobby.len(), 3);
        assert!(lobby.iter().any(|e| e.id == "table-low-1"));
        assert!(lobby.iter().any(|e| e.premium));
    }

    #[tokio::test]
    async fn create_validates_config() {
        let registry = Registry::boot(Arc::new(NullHooks), Vec::new()).await;
        let bad = TableConfig {
            small_blind: 0,
            ..TableConfig::default()
        };
        assert!(registry
            .create("Broken".to_string(), "p1".to_string(), bad)
            .await
            .is_err());
        let id = registry
            .create("Home Game".to_string(), "p1".to_string(), TableConfig::default())
            .await
            .expect("create");
        assert!(registry.handle(&id).await.is_some());
        assert_eq!(registry.lobby().await.len(), 1);
    }

    #[tokio::test]
    async fn unknown_room_has_no_handle() {
        let registry = Registry::boot(Arc::new(NullHooks), Vec::new()).await;
        assert!(registry.handle("table-low-9").await.is_none());
    }
}
