//! TCP front end for chat clients.
use converter_common::event::{from_json_line, to_json_line};
use converter_common::{ConverterError, Envelope, Reply};
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use crate::model::registry::SessionRegistry;

/// Longest accepted frame in bytes, newline included.
pub const MAX_FRAME_LEN: u64 = 4096;

/// TCP receiver that accepts chat clients and feeds their events to the registry.
///
/// Every connection is served by its own thread. A connection carries
/// newline-delimited JSON `Envelope`s and gets one `Reply` line back per
/// envelope. Failures are contained to the connection that caused them.
pub struct EventReceiver {
    /// The underlying TCP listening socket.
    pub(crate) socket: TcpListener,
}

impl EventReceiver {
    /// Bind a new TCP receiver to the provided `bind_addr` (e.g., `0.0.0.0:8090`).
    pub fn new(bind_addr: &str) -> Result<Self, ConverterError> {
        let socket = TcpListener::bind(bind_addr)?;
        Ok(Self { socket })
    }

    /// Address the receiver is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr, ConverterError> {
        Ok(self.socket.local_addr()?)
    }

    /// Blocking accept loop. Spawns a handler thread per client connection.
    pub fn receive_loop(self, registry: Arc<SessionRegistry>) -> Result<(), ConverterError> {
        info!("Event TCP server is started on {}", self.socket.local_addr()?);

        for stream in self.socket.incoming() {
            match stream {
                Ok(stream) => {
                    let registry = Arc::clone(&registry);
                    thread::spawn(move || {
                        let peer = stream.peer_addr().ok();
                        if let Err(e) = handle_connection(stream, &registry) {
                            error!("Client {:?} connection error: {}", peer, e);
                        }
                    });
                }
                Err(e) => error!("TCP connection error: {}", e),
            }
        }
        Ok(())
    }
}

/// Serve one client until it disconnects.
pub(crate) fn handle_connection(
    stream: TcpStream,
    registry: &SessionRegistry,
) -> Result<(), ConverterError> {
    let peer = stream.peer_addr()?;
    info!("Client connected: {}", peer);
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;
    let mut line = String::new();

    loop {
        match read_frame(&mut reader, &mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e @ ConverterError::FrameTooLong(_)) => {
                warn!("Dropping client {}: {}", peer, e);
                writer.write_all(&to_json_line(&Reply::from(&e))?)?;
                writer.flush()?;
                break;
            }
            Err(e) => return Err(e),
        }
        if line.trim().is_empty() {
            continue;
        }
        debug!("{} -> {}", peer, line);

        let reply = match from_json_line::<Envelope>(&line) {
            Ok(envelope) => registry.dispatch(envelope),
            Err(e) => {
                warn!("Malformed frame from {}: {}", peer, e);
                Reply::from(&e)
            }
        };
        writer.write_all(&to_json_line(&reply)?)?;
        writer.flush()?;
    }
    info!(
        "Client disconnected: {} ({} sessions known)",
        peer,
        registry.len()?
    );
    Ok(())
}

/// Read one newline-terminated frame into `line`, reading at most
/// [`MAX_FRAME_LEN`] bytes. Returns the number of bytes read, 0 at end of stream.
fn read_frame<R: BufRead>(reader: &mut R, line: &mut String) -> Result<usize, ConverterError> {
    line.clear();
    let read = reader.take(MAX_FRAME_LEN).read_line(line)?;
    if read as u64 == MAX_FRAME_LEN && !line.ends_with('\n') {
        return Err(ConverterError::FrameTooLong(MAX_FRAME_LEN));
    }
    Ok(read)
}
