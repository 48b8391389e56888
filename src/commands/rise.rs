use crate::commands::{CmdCtx, CommandError, Modifier};
use crate::script::Permission;
use async_trait::async_trait;

/// Widens the active predicate for administrators; everyone else stays strict.
pub struct Rise;

#[async_trait]
impl Modifier for Rise {
    fn name(&self) -> &'static str {
        "rise"
    }

    async fn apply(&self, ctx: &CmdCtx) -> Result<Permission, CommandError> {
        if ctx.is_author_admin {
            return Ok(Permission::Rise);
        }
        tracing::debug!(author = %ctx.author, "rise requested by non-admin, staying strict");
        Ok(Permission::Strict)
    }
}
