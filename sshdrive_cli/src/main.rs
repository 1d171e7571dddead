mod ui;

use clap::Parser;
use crate::ui::cli;

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    if let Err(e) = cli::run_cli(args).await {
        eprintln!("sshdrive: {e:#}");
        std::process::exit(1);
    }
}
