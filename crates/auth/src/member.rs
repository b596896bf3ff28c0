use gf_core::ID;
use gf_core::Unique;
use gf_database::PgErr;
use gf_database::Schema;
use gf_database::USERS;
use std::sync::Arc;
use tokio_postgres::Client;

/// Durable account keyed by wallet address.
#[derive(Debug, Clone)]
pub struct User {
    id: ID<Self>,
    wallet: String,
    display_name: Option<String>,
}

impl User {
    pub fn new(id: ID<Self>, wallet: String, display_name: Option<String>) -> Self {
        Self {
            id,
            wallet,
            display_name,
        }
    }
    pub fn wallet(&self) -> &str {
        &self.wallet
    }
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }
}

impl Unique for User {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

impl Schema for User {
    fn name() -> &'static str {
        USERS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            USERS,
            " (
                id            UUID PRIMARY KEY,
                wallet        TEXT NOT NULL UNIQUE,
                display_name  TEXT
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS idx_users_wallet ON ",
            USERS,
            " (wallet);"
        )
    }
}

/// Repository for account lookups. Abstracts SQL from domain modules.
#[allow(async_fn_in_trait)]
pub trait UserRepository {
    /// Resolve a user by wallet, creating the record on first sight.
    async fn find_or_create_by_wallet(&self, wallet: &str) -> Result<User, PgErr>;
    async fn find_by_id(&self, id: ID<User>) -> Result<Option<User>, PgErr>;
    async fn set_display_name(&self, id: ID<User>, name: &str) -> Result<(), PgErr>;
}

impl UserRepository for Arc<Client> {
    async fn find_or_create_by_wallet(&self, wallet: &str) -> Result<User, PgErr> {
        let fresh = ID::<User>::fresh();
        let row = self
            .query_one(
                const_format::concatcp!(
                    "INSERT INTO ",
                    USERS,
                    " (id, wallet) VALUES ($1, $2)
                     ON CONFLICT (wallet) DO UPDATE SET wallet = EXCLUDED.wallet
                     RETURNING id, wallet, display_name"
                ),
                &[&fresh.inner(), &wallet],
            )
            .await?;
        Ok(User::new(
            ID::from(row.get::<_, uuid::Uuid>(0)),
            row.get::<_, String>(1),
            row.get::<_, Option<String>>(2),
        ))
    }

    async fn find_by_id(&self, id: ID<User>) -> Result<Option<User>, PgErr> {
        self.query_opt(
            const_format::concatcp!(
                "SELECT id, wallet, display_name FROM ",
                USERS,
                " WHERE id = $1"
            ),
            &[&id.inner()],
        )
        .await
        .map(|opt| {
            opt.map(|row| {
                User::new(
                    ID::from(row.get::<_, uuid::Uuid>(0)),
                    row.get::<_, String>(1),
                    row.get::<_, Option<String>>(2),
                )
            })
        })
    }

    async fn set_display_name(&self, id: ID<User>, name: &str) -> Result<(), PgErr> {
        self.execute(
            const_format::concatcp!("UPDATE ", USERS, " SET display_name = $2 WHERE id = $1"),
            &[&id.inner(), &name],
        )
        .await
        .map(|_| ())
    }
}
