use anyhow::Context;
use clap::Parser;
use neax::config::Config;
use neax::{Code, Input, Interpreter, Mode, Registry};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

// cargo run -- --sender 100 'print::self hello'
// echo 'help::' | cargo run -- --sender 100

#[derive(Debug, Parser)]
#[command(name = "neax", version, about = "Evaluate NeaxScript statements")]
struct Args {
    /// Identity the scripts run as (`self`)
    #[arg(long, default_value = "0")]
    sender: String,

    /// Identity `replied` resolves to
    #[arg(long)]
    replied: Option<String>,

    /// TOML configuration file (if omitted, use NEAX_CONFIG / env)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override database URL; in-memory stores when neither this nor DATABASE_URL is set
    #[arg(long)]
    database_url: Option<String>,

    /// Print the composed result once instead of chunk by chunk
    #[arg(long)]
    buffered: bool,

    /// Evaluate this script and exit. Reads scripts from stdin, one per line, otherwise.
    script: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let cfg = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::from_env()?,
    };
    init_tracing(&cfg.log_filter)?;

    let database_url = args.database_url.clone().or_else(|| cfg.database_url.clone());
    let cfg = Arc::new(cfg);
    let registry = match database_url {
        Some(url) => Registry::connect(cfg, &url)
            .await
            .context("connecting to the database")?,
        None => {
            tracing::info!("no database configured, using in-memory stores");
            Registry::in_memory(cfg)
        }
    };
    let interp = Interpreter::new(Arc::new(registry));

    let mut input = Input::new(args.sender.clone());
    if let Some(replied) = &args.replied {
        input = input.replying_to(replied.clone());
    }
    let mode = if args.buffered { Mode::Buffered } else { Mode::Streaming };

    if let Some(script) = &args.script {
        let code = evaluate(&interp, &input, script, mode).await;
        return Ok(ExitCode::from(code.as_i32() as u8));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let script = line.trim();
        if script.is_empty() {
            continue;
        }
        evaluate(&interp, &input, script, mode).await;
    }

    Ok(ExitCode::SUCCESS)
}

async fn evaluate(interp: &Interpreter, input: &Input, script: &str, mode: Mode) -> Code {
    let mut print = |chunk: &str| println!("{chunk}");
    let eval = interp.run(input, script, &mut print, mode).await;
    println!("[{}]", eval.code);
    eval.code
}

fn init_tracing(default_directive: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{EnvFilter, prelude::*};

    color_eyre::install().map_err(|e| anyhow::anyhow!("installing error hooks: {e}"))?;

    let directive = default_directive
        .parse()
        .with_context(|| format!("invalid log filter {default_directive:?}"))?;

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(directive))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_timer(tracing_subscriber::fmt::time::uptime()),
        )
        .with(tracing_error::ErrorLayer::default())
        .init();

    Ok(())
}
