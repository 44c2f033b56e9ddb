use clap::Parser;

use mousetrail_lib::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = mousetrail_lib::run(cli).await {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
