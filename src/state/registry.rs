use crate::config::Config;
use crate::error::AppResult;
use crate::services::{MemoryRoles, RoleService};
use crate::store::{Db, MemoryStore, PgStore, Scope, Store};
use std::sync::Arc;

/// The shared collaborators every invocation reads and writes through.
pub struct Registry {
    pub users: Arc<dyn Store>,
    pub threads: Arc<dyn Store>,
    pub global: Arc<dyn Store>,
    pub roles: Arc<dyn RoleService>,
    pub config: Arc<Config>,
}

impl Registry {
    pub fn new(
        users: Arc<dyn Store>,
        threads: Arc<dyn Store>,
        global: Arc<dyn Store>,
        roles: Arc<dyn RoleService>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            users,
            threads,
            global,
            roles,
            config,
        }
    }

    fn roles_from(config: &Config) -> Arc<dyn RoleService> {
        Arc::new(MemoryRoles::new(
            config.admins.iter().cloned(),
            config.moderators.iter().cloned(),
        ))
    }

    pub fn in_memory(config: Arc<Config>) -> Self {
        Self::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryStore::new()),
            Self::roles_from(&config),
            config,
        )
    }

    /// Postgres-backed stores, migrated on connect.
    pub async fn connect(config: Arc<Config>, database_url: &str) -> AppResult<Self> {
        let db = Arc::new(Db::new(database_url)?);
        db.init().await?;

        Ok(Self::new(
            Arc::new(PgStore::new(db.clone(), Scope::Users)),
            Arc::new(PgStore::new(db.clone(), Scope::Threads)),
            Arc::new(PgStore::new(db, Scope::Global)),
            Self::roles_from(&config),
            config,
        ))
    }

    pub fn store(&self, scope: Scope) -> &dyn Store {
        match scope {
            Scope::Users => self.users.as_ref(),
            Scope::Threads => self.threads.as_ref(),
            Scope::Global => self.global.as_ref(),
        }
    }
}
