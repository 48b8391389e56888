use crate::commands::{CmdCtx, Command, CommandResult, summary};
use crate::script::{Code, Emitter};
use async_trait::async_trait;

const FOOTER: [&str; 5] = [
    "",
    "Foundational Syntax:",
    "<command>::<target id | 'self' | 'replied'> <arg1> <arg2>",
    "%var_name% can be used for input variables.",
    "neax[example::idk] can be used to run nested neax script inline",
];

pub struct Help;

#[async_trait]
impl Command for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn help(&self) -> &'static str {
        "Lists commands or describes one.\n\
         Usage: help:: [command] [-h | --help]\n\
         With a command name, shows its summary; add -h or --help for the full text."
    }

    async fn run(&self, ctx: &CmdCtx, out: &Emitter) -> CommandResult {
        let Some(name) = ctx.args.arg(0) else {
            out.emit("More Usage: help <command>\n\nAvailable commands:\n").await;
            for cmd in ctx.catalog.iter() {
                out.emit(format!("  {} - {}", cmd.name(), summary(cmd.help()))).await;
            }
            for line in FOOTER {
                out.emit(line).await;
            }
            return Ok(Code::Success);
        };

        let Some(cmd) = ctx.catalog.get(name) else {
            out.emit(format!("Unknown command: {name}")).await;
            return Ok(Code::CommandNotFound);
        };

        let full = ctx.args.args[1..].iter().any(|a| a == "-h") || ctx.args.has_flag("help");
        if full {
            out.emit(format!("Usage: {name} [options] <args>\n\n{}", cmd.help().trim()))
                .await;
        } else {
            out.emit(format!("{name} - {}", summary(cmd.help()))).await;
        }
        Ok(Code::Success)
    }
}
