use crate::store::{Record, Scope, Store, StoreError, StoreResult};
use async_trait::async_trait;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use tokio_postgres::NoTls;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

#[derive(Clone, Debug)]
pub struct Db {
    pub(crate) pool: Pool,
}

impl Db {
    pub fn new(url: &str) -> StoreResult<Self> {
        let cfg = tokio_postgres::Config::from_str(url)?;

        let mgr = Manager::from_config(
            cfg,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let pool = Pool::builder(mgr).max_size(16).runtime(Runtime::Tokio1).build()?;

        Ok(Self { pool })
    }

    /// Run embedded SQL migrations (idempotent).
    pub async fn init(&self) -> StoreResult<()> {
        let mut client = self.pool.get().await?;
        embedded::migrations::runner().run_async(&mut **client).await?;

        Ok(())
    }

    pub async fn get_client(&self) -> StoreResult<deadpool_postgres::Client> {
        Ok(self.pool.get().await?)
    }
}

/// One scope (users, threads or global) of the `neax_records` table.
pub struct PgStore {
    db: Arc<Db>,
    scope: Scope,
}

impl PgStore {
    pub fn new(db: Arc<Db>, scope: Scope) -> Self {
        Self { db, scope }
    }
}

fn into_record(id: &str, value: Value) -> StoreResult<Record> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Record::new()),
        other => Err(StoreError::Corrupt {
            id: id.to_string(),
            reason: format!("expected an object, found {other}"),
        }),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_item(&self, id: &str) -> StoreResult<Record> {
        let client = self.db.get_client().await?;
        let row_opt = client
            .query_opt(
                "SELECT data
                 FROM neax_records
                 WHERE scope = $1 AND id = $2",
                &[&self.scope.as_str(), &id],
            )
            .await?;

        match row_opt {
            Some(row) => into_record(id, row.get::<_, Value>(0)),
            None => Ok(Record::new()),
        }
    }

    // jsonb `||` merges by top-level key, same as the in-memory store.
    async fn set_item(&self, id: &str, partial: Record) -> StoreResult<()> {
        let client = self.db.get_client().await?;
        let data = Value::Object(partial);
        client
            .execute(
                "INSERT INTO neax_records (scope, id, data)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (scope, id)
                 DO UPDATE SET data = neax_records.data || EXCLUDED.data, updated_at = now()",
                &[&self.scope.as_str(), &id, &data],
            )
            .await?;
        Ok(())
    }

    async fn query_item(&self, id: &str, path: &str) -> StoreResult<Record> {
        let keys: Vec<&str> = path.split('.').filter(|k| !k.is_empty()).collect();
        if keys.is_empty() {
            return Ok(Record::new());
        }

        let client = self.db.get_client().await?;
        let row_opt = client
            .query_opt(
                "SELECT data #> $3
                 FROM neax_records
                 WHERE scope = $1 AND id = $2",
                &[&self.scope.as_str(), &id, &keys],
            )
            .await?;

        let Some(found) = row_opt.and_then(|r| r.get::<_, Option<Value>>(0)) else {
            return Ok(Record::new());
        };

        let mut out = found;
        for key in keys.iter().rev() {
            let mut wrap = Map::new();
            wrap.insert(key.to_string(), out);
            out = Value::Object(wrap);
        }
        into_record(id, out)
    }
}
