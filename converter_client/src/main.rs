//! Converter Client — a terminal chat client for the crypto conversion server.
//!
//! It connects to the server over TCP, opens a conversation with `/start`, and then
//! turns every typed line into a chat event: a menu number or value picks an option,
//! free text answers the amount prompt, `/help` and `/restart` work at any time.
//!
//! Usage example (CLI):
//! ```bash
//! converter_client --server-ip 127.0.0.1 --user-id alice
//! ```
#![warn(missing_docs)]
mod args;
mod model;
mod sender;

use crate::args::Args;
use crate::model::prompt::Prompt;
use crate::model::render::render;
use crate::sender::EventSender;
use clap::Parser;
use converter_common::net::addr;
use converter_common::{ConverterError, Envelope, Event, Result};
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

fn main() -> Result<(), ConverterError> {
    init_logger();
    let args = Args::parse();
    let server_address = addr(args.server_ip.trim(), args.port);

    info!("Connecting to conversion server at {}", server_address);
    let stream = TcpStream::connect(&server_address)
        .map_err(|e| ConverterError::Config(format!("Failed to connect to server: {}", e)))?;

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = shutdown.clone();
        let stream = stream.try_clone()?;
        ctrlc::set_handler(move || {
            info!("Ctrl+C received. Shutting down client...");
            shutdown.store(true, Ordering::SeqCst);
            let _ = stream.shutdown(Shutdown::Both);
        })
        .map_err(|e| ConverterError::Config(format!("Error setting Ctrl+C handler: {}", e)))?;
    }

    let mut sender = EventSender::new(stream)?;
    let mut prompt = Prompt::default();
    run_chat(&mut sender, &args.user_id, &mut prompt, &shutdown)
}

/// Read lines from stdin until EOF or shutdown and print the server's replies.
fn run_chat(
    sender: &mut EventSender,
    user_id: &str,
    prompt: &mut Prompt,
    shutdown: &AtomicBool,
) -> Result<(), ConverterError> {
    let mut stdout = io::stdout();
    converse(sender, user_id, prompt, Event::Start, &mut stdout)?;

    for line in io::stdin().lock().lines() {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }
        let line = line?;
        let Some(event) = prompt.event_for(&line) else {
            continue;
        };
        if let Err(e) = converse(sender, user_id, prompt, event, &mut stdout) {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            error!("Conversation failed: {}", e);
            return Err(e);
        }
    }
    info!("Chat loop stopping...");
    Ok(())
}

fn converse<W: Write>(
    sender: &mut EventSender,
    user_id: &str,
    prompt: &mut Prompt,
    event: Event,
    out: &mut W,
) -> Result<(), ConverterError> {
    let reply = sender.exchange(&Envelope::new(user_id, event))?;
    let follow_up = prompt.update(&reply);
    writeln!(out, "{}", render(&reply))?;
    if let Some(menu) = follow_up {
        writeln!(out, "{}", render(&menu))?;
    }
    out.flush()?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
