use crate::commands::{CmdCtx, Command, CommandResult};
use crate::script::fault::NOT_ALLOWED;
use crate::script::{Code, Emitter};
use crate::store::{Record, Store, StoreResult};
use crate::util::json::json;
use async_trait::async_trait;
use serde_json::Value;

/// Global record holding the link table.
const LINKS_ID: &str = "uid_links";
const LINKS_FIELD: &str = "links";

/// Ordered `target -> linked` identity mappings, stored as `[[target, linked], ...]`.
#[derive(Debug, Default, PartialEq, Eq)]
struct LinkTable(Vec<(String, String)>);

impl LinkTable {
    async fn load(store: &dyn Store) -> StoreResult<Self> {
        let record = store.query_item(LINKS_ID, LINKS_FIELD).await?;
        let mut table = LinkTable::default();
        let Some(Value::Array(pairs)) = record.get(LINKS_FIELD) else {
            return Ok(table);
        };

        for pair in pairs {
            match pair.as_array().map(Vec::as_slice) {
                Some([Value::String(k), Value::String(v)]) => table.0.push((k.clone(), v.clone())),
                _ => tracing::warn!(entry = %pair, "skipping malformed uid link"),
            }
        }
        Ok(table)
    }

    async fn save(&self, store: &dyn Store) -> StoreResult<()> {
        let mut partial = Record::new();
        partial.insert(LINKS_FIELD.to_string(), self.to_value());
        store.set_item(LINKS_ID, partial).await
    }

    fn get(&self, target: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == target).map(|(_, v)| v.as_str())
    }

    /// First key whose mapping points at `linked`.
    fn key_of(&self, linked: &str) -> Option<&str> {
        self.0.iter().find(|(_, v)| v == linked).map(|(k, _)| k.as_str())
    }

    fn set(&mut self, target: &str, linked: &str) {
        match self.0.iter_mut().find(|(k, _)| k == target) {
            Some((_, v)) => *v = linked.to_string(),
            None => self.0.push((target.to_string(), linked.to_string())),
        }
    }

    fn remove(&mut self, target: &str) {
        self.0.retain(|(k, _)| k != target);
    }

    fn to_value(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|(k, v)| Value::from(vec![k.clone(), v.clone()]))
                .collect(),
        )
    }
}

pub struct Link;

#[async_trait]
impl Command for Link {
    fn name(&self) -> &'static str {
        "ulink"
    }

    fn help(&self) -> &'static str {
        "Makes the target use another identity's user id.\n\
         Usage: ulink::<target> <linked id>\n\
         Admin only. Links that would point back at the target are refused."
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        if !ctx.is_author_admin {
            out.emit(NOT_ALLOWED).await;
            return Ok(Code::PermissionNeedRise);
        }
        if ctx.target.is_empty() {
            out.emit("Missing target.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }
        if ctx.is_target_admin && ctx.config().ignore_admin_links {
            out.emit("Cannot modify uid link of a bot admin.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }
        let Some(linked) = ctx.args.arg(0) else {
            out.emit("Missing link uid as first arg.").await;
            return Ok(Code::MissingOrInvalidArgs);
        };

        let mut table = LinkTable::load(ctx.global()).await?;
        if linked == ctx.target || table.get(linked) == Some(ctx.target.as_str()) {
            out.emit("Circular link detected.").await;
            return Ok(Code::MalformedInput);
        }

        table.set(&ctx.target, linked);
        table.save(ctx.global()).await?;
        tracing::info!(uid = %ctx.target, linked, "uid linked");

        out.emit(format!("Link success [{}]", ctx.target)).await;
        out.emit(json(&Value::from(vec![ctx.target.clone(), linked.to_string()])))
            .await;
        out.emit(format!("{} will now use uid of {linked}", ctx.target)).await;
        Ok(Code::Success)
    }
}

pub struct Unlink;

#[async_trait]
impl Command for Unlink {
    fn name(&self) -> &'static str {
        "uunlink"
    }

    fn help(&self) -> &'static str {
        "Removes a uid link.\n\
         Usage: uunlink::<target>\n\
         Admin only. Drops the first mapping that points at the target's linked id."
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        if !ctx.is_author_admin {
            out.emit(NOT_ALLOWED).await;
            return Ok(Code::PermissionNeedRise);
        }
        if ctx.target.is_empty() {
            out.emit("Missing target.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        let mut table = LinkTable::load(ctx.global()).await?;
        let Some(linked) = table.get(&ctx.target).map(str::to_string) else {
            out.emit("The target has no linked uid.").await;
            return Ok(Code::MissingOrInvalidArgs);
        };
        let key = table.key_of(&linked).unwrap_or(ctx.target.as_str()).to_string();

        table.remove(&key);
        table.save(ctx.global()).await?;
        tracing::info!(uid = %ctx.target, key = %key, "uid unlinked");

        let remaining = table.get(&ctx.target).map(Value::from).unwrap_or(Value::Null);
        out.emit(format!("Unlink success [{}]", ctx.target)).await;
        out.emit(json(&Value::Array(vec![Value::from(ctx.target.clone()), remaining])))
            .await;
        out.emit(format!("{} will no longer use uid of {key}", ctx.target))
            .await;
        Ok(Code::Success)
    }
}

pub struct Links;

#[async_trait]
impl Command for Links {
    fn name(&self) -> &'static str {
        "links"
    }

    fn help(&self) -> &'static str {
        "Lists every uid link as [target, linked] pairs.\n\
         Usage: links::"
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        let table = LinkTable::load(ctx.global()).await?;
        if table.0.is_empty() {
            out.emit("No linked uids.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }
        out.emit(json(&table.to_value())).await;
        Ok(Code::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn table_survives_a_save() {
        let store = MemoryStore::new();
        let mut t = LinkTable::default();
        t.set("1", "2");
        t.set("3", "2");
        t.set("1", "4");
        t.save(&store).await.unwrap();

        let back = LinkTable::load(&store).await.unwrap();
        assert_eq!(back, t);
        assert_eq!(back.get("1"), Some("4"));
        assert_eq!(back.key_of("2"), Some("3"));
    }

    #[tokio::test]
    async fn malformed_entries_are_skipped() {
        let store = MemoryStore::new();
        store.insert(
            LINKS_ID,
            serde_json::json!({"links": [["1", "2"], ["bad"], 7]})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let t = LinkTable::load(&store).await.unwrap();
        assert_eq!(t.0, vec![("1".to_string(), "2".to_string())]);
    }
}
