//! tabdb CLI
//!
//! Serves the databases over TCP or runs statements from an interactive prompt.

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use tabdb::{Config, FileStorage, Session, server};

/// Relational engine over tab-separated table files.
#[derive(Parser)]
#[command(name = "tabdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding one sub-directory per database.
    #[arg(short, long, env = "TABDB_DATA_DIR", default_value = "databases")]
    data_dir: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Accept statements over TCP, one per line.
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "TABDB_PORT", default_value_t = 8888)]
        port: u16,
    },

    /// Read statements from standard input.
    Repl,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Config::default().with_data_dir(cli.data_dir);
    match cli.command {
        Commands::Serve { port } => server::serve(&config.with_port(port)).await?,
        Commands::Repl => repl(&config)?,
    }
    Ok(())
}

/// Statements may span several lines; a line ending in `;` completes one.
fn repl(config: &Config) -> tabdb::Result<()> {
    let mut session = Session::new(FileStorage::new(&config.data_dir)?);
    info!(data_dir = %config.data_dir.display(), "tabdb REPL (type '.exit' or '.quit' to stop)");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut buffer = String::new();
    loop {
        print!("{}", if buffer.is_empty() { "tabdb> " } else { "   ... " });
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if buffer.is_empty() && (input == ".exit" || input == ".quit") {
            break;
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(input);
        if input.ends_with(';') {
            let statement = std::mem::take(&mut buffer);
            println!("{}", session.handle_command(&statement));
        }
    }
    Ok(())
}
