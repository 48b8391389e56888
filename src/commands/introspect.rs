use crate::commands::{CmdCtx, Command, CommandResult};
use crate::script::{Code, Emitter};
use crate::util::json::{get_nested, json, path_keys};
use async_trait::async_trait;
use serde_json::Value;

pub struct Print;

#[async_trait]
impl Command for Print {
    fn name(&self) -> &'static str {
        "print"
    }

    fn help(&self) -> &'static str {
        "Writes its arguments back, separated by single spaces.\n\
         Usage: print::self <text...>\n\
         Prints [nothing] when no text is given."
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        if ctx.args.args.is_empty() {
            out.emit("[nothing]").await;
            return Ok(Code::MissingOrInvalidArgs);
        }
        out.emit(ctx.args.rest(0)).await;
        Ok(Code::Success)
    }
}

pub struct Arg;

#[async_trait]
impl Command for Arg {
    fn name(&self) -> &'static str {
        "arg"
    }

    fn help(&self) -> &'static str {
        "Shows how the interpreter understood the statement.\n\
         Usage: [modifier] arg::<target> [args...] [--flags]\n\
         Lists the command name, parsed arguments and flags, resolved target and author,\n\
         the modifier, whether the active permission allows acting on the target, and\n\
         the admin status of author and target."
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        let report = serde_json::json!({
            "nsxName": ctx.name,
            "nsxuCreated": ctx.args,
            "nsxTarget": ctx.target,
            "nsxAuthor": ctx.author,
            "isTargetAdmin": ctx.is_target_admin,
            "nsxMod": ctx.modifier,
            "permission": ctx.permission(),
            "isAllowed": ctx.is_target_allowed(),
            "isAuthorAdmin": ctx.is_author_admin,
        });
        out.emit(json(&report)).await;
        Ok(Code::Success)
    }
}

/// `input`: reads a field of the invocation input.
pub struct InputGet;

#[async_trait]
impl Command for InputGet {
    fn name(&self) -> &'static str {
        "input"
    }

    fn help(&self) -> &'static str {
        "Reads a field of the message that carried the script.\n\
         Usage: input::self <key> [nested keys...]\n\
         Strings print as-is, everything else as JSON. Prints [Invalid] without a key."
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        if ctx.args.args.is_empty() {
            out.emit("[Invalid]").await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        let keys = path_keys(ctx.args.args.iter().map(String::as_str));
        let root = ctx.input.to_value();
        match get_nested(&root, &keys) {
            Some(Value::String(s)) => out.emit(s.clone()).await,
            Some(other) => out.emit(json(other)).await,
            None => out.emit(json(&Value::Null)).await,
        }
        Ok(Code::Success)
    }
}
