use parking_lot::RwLock;
use std::collections::BTreeSet;

/// Authorization collaborator: who holds the administrator and moderator ranks.
///
/// Every mutation is a single read-modify-write and reports whether it changed anything, so
/// callers can tell "promoted" apart from "already promoted".
pub trait RoleService: Send + Sync {
    fn is_admin(&self, id: &str) -> bool;
    fn is_moderator(&self, id: &str) -> bool;

    fn add_admin(&self, id: &str) -> bool;
    fn remove_admin(&self, id: &str) -> bool;
    fn add_moderator(&self, id: &str) -> bool;
    fn remove_moderator(&self, id: &str) -> bool;

    fn admins(&self) -> Vec<String>;
    fn moderators(&self) -> Vec<String>;
}

#[derive(Default)]
pub struct MemoryRoles {
    admins: RwLock<BTreeSet<String>>,
    moderators: RwLock<BTreeSet<String>>,
}

impl MemoryRoles {
    pub fn new<A, M>(admins: A, moderators: M) -> Self
    where
        A: IntoIterator<Item = String>,
        M: IntoIterator<Item = String>,
    {
        Self {
            admins: RwLock::new(admins.into_iter().collect()),
            moderators: RwLock::new(moderators.into_iter().collect()),
        }
    }
}

impl RoleService for MemoryRoles {
    fn is_admin(&self, id: &str) -> bool {
        self.admins.read().contains(id)
    }

    fn is_moderator(&self, id: &str) -> bool {
        self.moderators.read().contains(id)
    }

    fn add_admin(&self, id: &str) -> bool {
        self.admins.write().insert(id.to_string())
    }

    fn remove_admin(&self, id: &str) -> bool {
        self.admins.write().remove(id)
    }

    fn add_moderator(&self, id: &str) -> bool {
        self.moderators.write().insert(id.to_string())
    }

    fn remove_moderator(&self, id: &str) -> bool {
        self.moderators.write().remove(id)
    }

    fn admins(&self) -> Vec<String> {
        self.admins.read().iter().cloned().collect()
    }

    fn moderators(&self) -> Vec<String> {
        self.moderators.read().iter().cloned().collect()
    }
}
