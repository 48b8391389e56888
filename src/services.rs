mod roles;

pub use roles::{MemoryRoles, RoleService};
