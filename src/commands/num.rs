use crate::commands::{CmdCtx, Command, CommandResult};
use crate::script::{Code, Emitter};
use crate::util::bet::parse_bet;
use crate::util::json::format_number;
use async_trait::async_trait;
use serde_json::Value;

pub struct Num;

#[async_trait]
impl Command for Num {
    fn name(&self) -> &'static str {
        "num"
    }

    fn help(&self) -> &'static str {
        "Turns shorthand amounts into plain numbers.\n\
         Usage: num:: <amount> or num::<amount>\n\
         Accepts suffixes (5k, 2.5m, 5T, 1qa), commas, percentages of your money (50%),\n\
         and all, allin, max or half. Anything unreadable gives NaN."
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        let money = ctx
            .users()
            .query_item(&ctx.author, "money")
            .await?
            .get("money")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        let text = ctx.args.arg(0).unwrap_or(ctx.target.as_str());
        if text.is_empty() {
            out.emit("0").await;
            return Ok(Code::MissingOrInvalidArgs);
        }

        out.emit(format_number(parse_bet(text, money))).await;
        Ok(Code::Success)
    }
}
