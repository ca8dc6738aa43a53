mod api;
mod args;
mod op;
mod ops;
mod state;
mod store;

use args::{Args, Parser};
use op::Op;
use ops::{Account, Asset, Download, Init, Issue, Key, Lease, SignRequest, Transfer, Version};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

command_enum! {
    (Init, Init),
    (Account, Account),
    (SignRequest, SignRequest),
    (Asset, Asset),
    (Issue, Issue),
    (Transfer, Transfer),
    (Lease, Lease),
    (Download, Download),
    (Key, Key),
    (Version, Version),
}

fn init_tracing(args: &Args) {
    let configured = state::AppState::load(args.config_path.clone())
        .map(|state| state.config.log_level)
        .ok();
    let level = args
        .log_level
        .clone()
        .or(configured)
        .unwrap_or_else(|| "warn".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stderr_layer).init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing(&args);

    let ctx = op::OpContext::new(args.config_path);

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
