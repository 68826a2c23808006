use clap::Parser;
use client::BoardClient;
use log::info;
use shared::DEFAULT_PORT;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about = "Terminal client for the bulletin board server", long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = format!("127.0.0.1:{}", DEFAULT_PORT))]
    server: String,

    /// The server was started with --no-banner
    #[arg(long)]
    no_banner: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=debug to trace every request");
    }
    env_logger::init();

    let args = Args::parse();

    info!("Connecting to: {}", args.server);
    let mut client = if args.no_banner {
        BoardClient::connect_without_banner(&args.server).await?
    } else {
        BoardClient::connect(&args.server).await?
    };

    if let Some(config) = client.config() {
        println!("{}", config.banner());
    }

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = stdin.next_line().await? {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        if command.eq_ignore_ascii_case("DISCONNECT") {
            println!("{}", client.disconnect().await?);
            return Ok(());
        }

        println!("{}", client.send(command).await?);
    }

    client.disconnect().await?;
    Ok(())
}
