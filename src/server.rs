//! Line-oriented TCP transport
//!
//! Each line received is one statement. The reply is the response text followed
//! by a line holding a single end-of-transmission character (`\u{4}`). All
//! connections share one session, so commands from different clients execute
//! one at a time against the same active database.

use std::sync::Arc;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::Mutex,
};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::Result,
    sql::engine::Session,
    storage::{Storage, file::FileStorage},
};

/// Marks the end of one reply
pub const END_OF_TRANSMISSION: char = '\u{4}';

pub struct Server<S: Storage> {
    session: Arc<Mutex<Session<S>>>,
}

impl<S: Storage + Send + 'static> Server<S> {
    pub fn new(session: Session<S>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Accepts connections until the listener fails
    pub async fn run(&self, listener: TcpListener) -> Result<()> {
        loop {
            let (stream, peer) = listener.accept().await?;
            debug!(%peer, "accepted connection");
            let session = self.session.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, session).await {
                    warn!(%peer, %err, "connection failed");
                }
            });
        }
    }
}

async fn handle_connection<S: Storage + 'static>(
    stream: TcpStream,
    session: Arc<Mutex<Session<S>>>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        // invalid UTF-8 is replaced rather than dropping the connection
        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        let response = session.lock().await.handle_command(line);
        writer
            .write_all(format!("{}\n{}\n", response, END_OF_TRANSMISSION).as_bytes())
            .await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Serves the databases under `config.data_dir` on `config.port`
pub async fn serve(config: &Config) -> Result<()> {
    let storage = FileStorage::new(&config.data_dir)?;
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(
        port = config.port,
        data_dir = %config.data_dir.display(),
        "server listening"
    );
    Server::new(Session::new(storage)).run(listener).await
}
