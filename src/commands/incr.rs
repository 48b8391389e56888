use crate::commands::{CmdCtx, Command, CommandResult};
use crate::script::fault::NOT_ALLOWED;
use crate::script::{Code, Emitter};
use crate::store::{Scope, write_path};
use crate::util::json::{format_number, get_nested, json, number_value, path_keys};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// `uincr` / `tincr`: adds a number to a numeric property.
pub struct Incr {
    scope: Scope,
}

impl Incr {
    pub fn new(scope: Scope) -> Self {
        Self { scope }
    }

    fn noun(&self) -> &'static str {
        match self.scope {
            Scope::Threads => "thread",
            _ => "user",
        }
    }
}

#[async_trait]
impl Command for Incr {
    fn name(&self) -> &'static str {
        match self.scope {
            Scope::Threads => "tincr",
            _ => "uincr",
        }
    }

    fn help(&self) -> &'static str {
        match self.scope {
            Scope::Threads => {
                "Adds a number to a numeric property of a thread record.\n\
                 Usage: tincr::<thread id> <key[.nested]> <number>\n\
                 Negative numbers subtract. The property must already hold a number."
            }
            _ => {
                "Adds a number to a numeric property of a user record.\n\
                 Usage: uincr::<user id> <key[.nested]> <number>\n\
                 Negative numbers subtract. The property must already hold a number.\n\
                 Changing someone else's record needs admin rank."
            }
        }
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        if ctx.target.is_empty() {
            out.emit("Missing target.").await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        if !ctx.rise_target_allowed() {
            out.emit(NOT_ALLOWED).await;
            return Ok(Code::PermissionNeedRise);
        }

        let (Some(property), Some(raw)) = (ctx.args.arg(0), ctx.args.arg(1)) else {
            out.emit("First arg must be property key, second arg must be a number.")
                .await;
            return Ok(Code::MissingOrInvalidArgs);
        };

        let delta = match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => n,
            _ => {
                out.emit(format!("Invalid number provided: {raw}")).await;
                return Ok(Code::MalformedInput);
            }
        };

        let store = ctx.store(self.scope);
        let keys = path_keys([property]);
        let root = match keys.first() {
            Some(first) => Value::Object(store.query_item(&ctx.target, first).await?),
            None => Value::Null,
        };
        let Some(current) = get_nested(&root, &keys).and_then(Value::as_f64) else {
            out.emit(format!("Property {property} is not a number or does not exist."))
                .await;
            return Ok(Code::MalformedInput);
        };

        let next = current + delta;
        write_path(store, &ctx.target, &keys, number_value(next)).await?;
        tracing::info!(scope = %self.scope, uid = %ctx.target, property, next, "property incremented");

        out.emit(format!(
            "Incremented {property} by {} for {} [{}]. New value: {}",
            format_number(delta),
            self.noun(),
            ctx.target,
            format_number(next)
        ))
        .await;

        let mut echo = Map::new();
        echo.insert(property.to_string(), number_value(next));
        out.emit(json(&Value::Object(echo))).await;
        Ok(Code::Success)
    }
}
