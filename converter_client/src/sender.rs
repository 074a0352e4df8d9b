//! Sending chat events to the conversion server over TCP.
//!
//! This module provides a small helper for encoding `Envelope`s as JSON lines and
//! reading back the matching `Reply` line.
use converter_common::event::{from_json_line, to_json_line};
use converter_common::{ConverterError, Envelope, Reply};
use log::debug;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;

/// Request/response channel to the server.
pub struct EventSender {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl EventSender {
    /// Wrap a connected stream.
    pub fn new(stream: TcpStream) -> Result<Self, ConverterError> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            reader,
            writer: stream,
        })
    }

    /// Send one envelope and wait for its reply.
    pub fn exchange(&mut self, envelope: &Envelope) -> Result<Reply, ConverterError> {
        debug!("Sending {:?}", envelope);
        self.writer.write_all(&to_json_line(envelope)?)?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(ConverterError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                "server closed the connection",
            )));
        }
        from_json_line(&line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use converter_common::Event;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn exchange_writes_line_and_reads_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let reply = Reply::Help { text: "hi".into() };
            let mut writer = stream;
            writer.write_all(&to_json_line(&reply).unwrap()).unwrap();
            from_json_line::<Envelope>(&line).unwrap()
        });

        let mut sender = EventSender::new(TcpStream::connect(addr).unwrap()).unwrap();
        let reply = sender.exchange(&Envelope::new("u", Event::Help)).unwrap();
        assert_eq!(reply, Reply::Help { text: "hi".into() });
        assert_eq!(server.join().unwrap(), Envelope::new("u", Event::Help));
    }

    #[test]
    fn closed_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let mut sender = EventSender::new(TcpStream::connect(addr).unwrap()).unwrap();
        server.join().unwrap();
        let err = sender.exchange(&Envelope::new("u", Event::Start)).unwrap_err();
        assert!(matches!(err, ConverterError::Io(_)));
    }
}
