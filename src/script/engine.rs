use super::chunks;
use super::fault::Fault;
use super::inline;
use super::statement::{MissingSeparator, Statement};
use super::vars;
use super::{Code, Evaluation, Mode, NullSink, Sink};
use crate::commands::{Catalog, CmdCtx, Command, CommandError};
use crate::state::input::Input;
use crate::state::registry::Registry;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Inline spans may expand to further spans through interpolated input; stop past this depth.
pub const MAX_INLINE_DEPTH: usize = 16;

pub struct Interpreter {
    registry: Arc<Registry>,
    catalog: Arc<Catalog>,
}

impl Interpreter {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_catalog(registry, Catalog::builtin())
    }

    pub fn with_catalog(registry: Arc<Registry>, catalog: Catalog) -> Self {
        Self {
            registry,
            catalog: Arc::new(catalog),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Evaluates one script for `input`. Streaming mode forwards each chunk to `sink` as it is
    /// produced; buffered mode sends the composed result once. Never fails: every fault
    /// becomes a status code.
    pub fn run<'a>(
        &'a self,
        input: &'a Input,
        script: &'a str,
        sink: &'a mut dyn Sink,
        mode: Mode,
    ) -> BoxFuture<'a, Evaluation> {
        self.eval(input, script, sink, mode, 0)
    }

    pub async fn run_buffered(&self, input: &Input, script: &str) -> Evaluation {
        self.run(input, script, &mut NullSink, Mode::Buffered).await
    }

    pub async fn run_streaming(&self, input: &Input, script: &str, sink: &mut dyn Sink) -> Evaluation {
        self.run(input, script, sink, Mode::Streaming).await
    }

    pub(crate) fn eval<'a>(
        &'a self,
        input: &'a Input,
        script: &'a str,
        sink: &'a mut dyn Sink,
        mode: Mode,
        depth: usize,
    ) -> BoxFuture<'a, Evaluation> {
        async move {
            if depth > MAX_INLINE_DEPTH {
                let msg = Fault::problem("inline scripts nested too deeply").to_string();
                return terminate(sink, Code::MalformedInput, msg);
            }

            let script = vars::interpolate(script, input);
            let expansion = inline::expand(self, input, &script, depth).await;
            if expansion.failed() {
                return terminate(sink, Code::MalformedInput, expansion.issues());
            }

            let stmt = match Statement::parse(&expansion.script, input) {
                Ok(stmt) => stmt,
                Err(MissingSeparator(text)) => {
                    return terminate(sink, Code::CommandNotFound, format!("Neax::CommandNotFound = {text}"));
                }
            };

            let mut ctx = CmdCtx::new(self.registry.clone(), self.catalog.clone(), input, &stmt);

            if let Some(name) = &stmt.modifier {
                let Some(modifier) = self.catalog.modifier(name).cloned() else {
                    return terminate(sink, Code::CommandNotFound, format!("Neax::ModNotFound = {name}"));
                };
                match guarded(modifier.apply(&ctx)).await {
                    Ok(permission) => ctx.set_permission(permission),
                    Err(fault) => {
                        tracing::warn!(modifier = %name, error = %fault, "modifier failed");
                        return terminate(sink, Code::ExecError, fault.to_string());
                    }
                }
            }

            let Some(command) = self.catalog.get(&stmt.command).cloned() else {
                return terminate(
                    sink,
                    Code::CommandNotFound,
                    format!("Neax::CommandNotFound = {}", stmt.command),
                );
            };

            execute(command.as_ref(), ctx, sink, mode).await
        }
        .boxed()
    }
}

/// Ends an evaluation before any command ran.
fn terminate(sink: &mut dyn Sink, code: Code, msg: String) -> Evaluation {
    tracing::debug!(%code, "evaluation stopped early");
    sink.send(&msg);
    Evaluation::new(code, msg)
}

async fn execute(command: &dyn Command, ctx: CmdCtx, sink: &mut dyn Sink, mode: Mode) -> Evaluation {
    let name = ctx.name.clone();
    tracing::debug!(command = %name, uid = %ctx.target, author = %ctx.author, "running command");

    let mut chunks: Vec<String> = Vec::new();
    let outcome = chunks::drive(
        |out| async move { guarded(command.run(&ctx, &out)).await },
        |chunk| {
            if mode == Mode::Streaming {
                sink.send(&chunk);
            }
            chunks.push(chunk);
        },
    )
    .await;

    let code = match outcome {
        Ok(code) => code,
        Err(fault) => {
            let msg = fault.to_string();
            tracing::warn!(command = %name, error = %msg, "command failed");
            if mode == Mode::Streaming {
                sink.send(&msg);
            }
            chunks.push(msg);
            Code::ExecError
        }
    };

    let result = chunks.join("\n");
    if mode == Mode::Buffered {
        sink.send(&result);
    }
    Evaluation::new(code, result)
}

/// Awaits `fut`, turning both its error and a panic into a reportable fault.
async fn guarded<T, F>(fut: F) -> Result<T, Fault>
where
    F: Future<Output = Result<T, CommandError>>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => Err(e.to_fault()),
        Err(panic) => Err(Fault::problem(panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "command panicked".to_string()
    }
}
