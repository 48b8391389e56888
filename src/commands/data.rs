use crate::commands::{CmdCtx, Command, CommandResult};
use crate::script::fault::NOT_ALLOWED;
use crate::script::{Code, Emitter, Fault};
use crate::store::{Scope, write_path};
use crate::util::json::{INSPECT_DEPTH, get_nested, inspect, json, path_keys};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// `uget` / `tget`: reads a (nested) property of a user or thread record.
pub struct Get {
    scope: Scope,
}

impl Get {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Command for Get {
    fn name(&self) -> &'static str {
        match self.scope {
            Scope::Threads => "tget",
            _ => "uget",
        }
    }

    fn help(&self) -> &'static str {
        match self.scope {
            Scope::Threads => {
                "Reads a property of a thread record.\n\
                 Usage: tget::<thread id> <key> [nested keys...] [--all] [--json] [--raw] [--depth n]\n\
                 --all reads the whole record, --json prints JSON, --raw drops the header line."
            }
            _ => {
                "Reads a property of a user record.\n\
                 Usage: uget::<user id> <key> [nested keys...] [--all] [--json] [--raw] [--depth n]\n\
                 --all reads the whole record, --json prints JSON, --raw drops the header line.\n\
                 Reading someone else's record needs admin rank."
            }
        }
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        if ctx.target.is_empty() {
            out.emit("Missing target.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        let all = ctx.args.has_flag("all");
        let keys = path_keys(ctx.args.args.iter().map(String::as_str));
        if keys.is_empty() && !all {
            out.emit("A nested keys (shallowest to deepest, separated by spaces.) is required.")
                .await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        if !ctx.rise_target_allowed() {
            out.emit(NOT_ALLOWED).await;
            return Ok(Code::PermissionNeedRise);
        }

        let store = ctx.store(self.scope);
        let record = match keys.first() {
            Some(first) if !all => store.query_item(&ctx.target, first).await?,
            _ => store.get_item(&ctx.target).await?,
        };
        let root = Value::Object(record);
        let null = Value::Null;
        let item = get_nested(&root, &keys).unwrap_or(&null);

        let header = if ctx.args.has_flag("raw") {
            String::new()
        } else {
            format!("Property => {}\n\n", keys.join("."))
        };

        let body = if ctx.args.has_flag("json") {
            json(item)
        } else if let Value::String(s) = item {
            s.clone()
        } else {
            let depth = if all {
                0
            } else {
                ctx.args
                    .flag_str("depth")
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(INSPECT_DEPTH)
            };
            inspect(item, depth)
        };

        out.emit(format!("{header}{body}")).await;
        Ok(Code::Success)
    }
}

/// `uset` / `tset`: writes a JSON value at a (nested) property. Admin only.
pub struct Set {
    scope: Scope,
}

impl Set {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }
}

#[async_trait]
impl Command for Set {
    fn name(&self) -> &'static str {
        match self.scope {
            Scope::Threads => "tset",
            _ => "uset",
        }
    }

    fn help(&self) -> &'static str {
        match self.scope {
            Scope::Threads => {
                "Writes a JSON value into a thread record.\n\
                 Usage: tset::<thread id> <key[.nested]> <json>\n\
                 Admin only. The value must be valid JSON, e.g. 5, \"text\" or {\"a\": 1}."
            }
            _ => {
                "Writes a JSON value into a user record.\n\
                 Usage: uset::<user id> <key[.nested]> <json>\n\
                 Admin only. The value must be valid JSON, e.g. 5, \"text\" or {\"a\": 1}."
            }
        }
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        if ctx.target.is_empty() {
            out.emit("Missing target.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        if !ctx.is_author_admin {
            out.emit(NOT_ALLOWED).await;
            return Ok(Code::PermissionNeedRise);
        }

        let raw = ctx.args.rest(1);
        let Some(property) = ctx.args.arg(0).filter(|_| !raw.is_empty()) else {
            out.emit("First arg must be property key, the rest must be a JSON value.")
                .await;
            return Ok(Code::MissingOrInvalidArgs);
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                out.emit(Fault::from_error("SyntaxError", &e).to_string()).await;
                return Ok(Code::ExecError);
            }
        };

        let keys = path_keys([property]);
        write_path(ctx.store(self.scope), &ctx.target, &keys, value.clone()).await?;
        tracing::info!(scope = %self.scope, uid = %ctx.target, property, "property set");

        let mut echo = Map::new();
        echo.insert(property.to_string(), value);
        out.emit(format!("Set success [{}]", ctx.target)).await;
        out.emit(json(&Value::Object(echo))).await;
        Ok(Code::Success)
    }
}
