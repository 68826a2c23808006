use clap::Parser;
use log::info;
use server::config::load_board_config;
use server::network::{Server, ServerConfig};
use shared::{
    BoardConfig, DEFAULT_BOARD_HEIGHT, DEFAULT_BOARD_WIDTH, DEFAULT_COLORS, DEFAULT_NOTE_HEIGHT,
    DEFAULT_NOTE_WIDTH, DEFAULT_PORT,
};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Shared bulletin board server", long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Board width
    #[arg(long, default_value_t = DEFAULT_BOARD_WIDTH)]
    width: u32,

    /// Board height (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = DEFAULT_BOARD_HEIGHT)]
    height: u32,

    /// Width of every note
    #[arg(long, default_value_t = DEFAULT_NOTE_WIDTH)]
    note_width: u32,

    /// Height of every note
    #[arg(long, default_value_t = DEFAULT_NOTE_HEIGHT)]
    note_height: u32,

    /// Comma-separated color palette
    #[arg(short, long, value_delimiter = ',', default_values_t = DEFAULT_COLORS.map(String::from))]
    colors: Vec<String>,

    /// JSON board configuration; replaces the size and color flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not send the BOARD_CONFIG line to new clients
    #[arg(long)]
    no_banner: bool,
}

impl Args {
    fn board_config(&self) -> Result<BoardConfig, Box<dyn std::error::Error>> {
        let config = match &self.config {
            Some(path) => load_board_config(path)?,
            None => BoardConfig::new(
                self.width,
                self.height,
                self.note_width,
                self.note_height,
                &self.colors,
            )?,
        };
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=debug to log every request");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = ServerConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        board: args.board_config()?,
        send_banner: !args.no_banner,
    };

    let server = Server::bind(config).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
