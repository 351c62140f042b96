use clap::Parser;

use stackup::cli::{self, output, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match cli::run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::error(&e.to_string());
            std::process::exit(1);
        }
    }
}
