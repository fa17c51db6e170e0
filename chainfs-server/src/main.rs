//! TCP front end for the chainfs storage engine. One OS thread per
//! connection; every handler shares the single engine instance and the
//! engine's own lock serializes access.

mod proto;

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use log::{debug, error, info, warn};

use chainfs::{FileBlockDevice, FsError, StorageEngine, BLOCK_SIZE};
use proto::{parse, Command};

const DEFAULT_PORT: u16 = 12345;
const DEFAULT_STORE: &str = "store.img";
const DEFAULT_TOTAL_SIZE: usize = 10 * BLOCK_SIZE;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let port = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let store = args.next().unwrap_or_else(|| DEFAULT_STORE.to_string());
    let total_size = args
        .next()
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_TOTAL_SIZE);

    if let Err(err) = run(port, &store, total_size) {
        error!("server failed: {}", err);
        std::process::exit(1);
    }
}

fn run(port: u16, store: &str, total_size: usize) -> Result<(), FsError> {
    let engine = Arc::new(StorageEngine::init(store, total_size)?);
    info!(
        "backing store {} holds {} blocks of {} bytes",
        store,
        total_size / BLOCK_SIZE,
        BLOCK_SIZE
    );

    let listener = TcpListener::bind(("0.0.0.0", port))?;
    info!("listening on port {}", port);

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    if let Err(err) = handle_client(stream, engine) {
                        warn!("connection ended with error: {}", err);
                    }
                });
            }
            Err(err) => warn!("failed to accept connection: {}", err),
        }
    }
    Ok(())
}

fn handle_client(
    stream: TcpStream,
    engine: Arc<StorageEngine<FileBlockDevice>>,
) -> std::io::Result<()> {
    let peer = stream.peer_addr()?;
    info!("client connected: {}", peer);

    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        debug!("{} -> {}", peer, line);

        let command = match parse(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(writer, "{}", err.response())?;
                continue;
            }
        };

        match command {
            Command::Create(name) => match engine.create(name) {
                Ok(()) => writeln!(writer, "SUCCESS: File '{}' created.", name)?,
                Err(err) => writeln!(writer, "{}", proto::error_response(&err))?,
            },
            Command::List => {
                let files = engine.list();
                if files.is_empty() {
                    writeln!(writer, "No files found.")?;
                } else {
                    for name in files {
                        writeln!(writer, "{}", name)?;
                    }
                }
            }
            Command::Read(name) => match engine.read(name) {
                Ok(content) => {
                    writer.write_all(&content)?;
                    writer.write_all(b"\n")?;
                }
                Err(err) => writeln!(writer, "{}", proto::error_response(&err))?,
            },
            Command::Write(name, data) => match engine.write(name, data.as_bytes()) {
                Ok(written) => {
                    writeln!(writer, "SUCCESS: {} bytes written to '{}'.", written, name)?
                }
                Err(err) => writeln!(writer, "{}", proto::error_response(&err))?,
            },
            Command::Delete(name) => match engine.delete(name) {
                Ok(()) => writeln!(writer, "SUCCESS: File '{}' deleted.", name)?,
                Err(err) => writeln!(writer, "{}", proto::error_response(&err))?,
            },
            Command::Quit => {
                writeln!(writer, "SUCCESS: Disconnecting.")?;
                break;
            }
        }
        writer.flush()?;
    }

    info!("client disconnected: {}", peer);
    Ok(())
}
