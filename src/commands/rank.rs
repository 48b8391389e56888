use crate::commands::{CmdCtx, Command, CommandResult};
use crate::script::fault::NOT_ALLOWED;
use crate::script::{Code, Emitter};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Admin,
    Moderator,
}

impl Tier {
    fn noun(self) -> &'static str {
        match self {
            Tier::Admin => "admin",
            Tier::Moderator => "moderator",
        }
    }
}

/// `promote` / `demote` / `mpromote` / `mdemote`: grants or revokes a rank. Admin only.
pub struct Rank {
    tier: Tier,
    grant: bool,
}

impl Rank {
    pub fn promote() -> Self {
        Self { tier: Tier::Admin, grant: true }
    }

    pub fn demote() -> Self {
        Self { tier: Tier::Admin, grant: false }
    }

    pub fn mpromote() -> Self {
        Self { tier: Tier::Moderator, grant: true }
    }

    pub fn mdemote() -> Self {
        Self { tier: Tier::Moderator, grant: false }
    }
}

#[async_trait]
impl Command for Rank {
    fn name(&self) -> &'static str {
        match (self.tier, self.grant) {
            (Tier::Admin, true) => "promote",
            (Tier::Admin, false) => "demote",
            (Tier::Moderator, true) => "mpromote",
            (Tier::Moderator, false) => "mdemote",
        }
    }

    fn help(&self) -> &'static str {
        match (self.tier, self.grant) {
            (Tier::Admin, true) => "Grants the admin rank.\nUsage: promote::<target>\nAdmin only.",
            (Tier::Admin, false) => "Revokes the admin rank.\nUsage: demote::<target>\nAdmin only.",
            (Tier::Moderator, true) => {
                "Grants the moderator rank.\nUsage: mpromote::<target>\nAdmin only."
            }
            (Tier::Moderator, false) => {
                "Revokes the moderator rank.\nUsage: mdemote::<target>\nAdmin only."
            }
        }
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        let target = ctx.target.as_str();
        if target.is_empty() {
            out.emit("Target not found.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }
        if !ctx.is_author_admin {
            out.emit(NOT_ALLOWED).await;
            return Ok(Code::PermissionNeedRise);
        }

        let roles = ctx.roles();
        let changed = match (self.tier, self.grant) {
            (Tier::Admin, true) => roles.add_admin(target),
            (Tier::Admin, false) => roles.remove_admin(target),
            (Tier::Moderator, true) => roles.add_moderator(target),
            (Tier::Moderator, false) => roles.remove_moderator(target),
        };

        let noun = self.tier.noun();
        if !changed {
            let msg = if self.grant {
                format!("Already {noun}. [{target}]")
            } else {
                format!("Not {noun}. [{target}]")
            };
            out.emit(msg).await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        tracing::info!(uid = target, rank = noun, grant = self.grant, by = %ctx.author, "rank changed");
        let msg = if self.grant {
            format!("Added as {noun}. [{target}]")
        } else {
            format!("Removed as {noun}. [{target}]")
        };
        out.emit(msg).await;
        Ok(Code::Success)
    }
}
