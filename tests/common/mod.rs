//! Shared test support: a scripted mock tickstore server.
//!
//! Binds to an ephemeral port, accepts one connection, then for each
//! scripted frame reads exactly one newline-terminated command line,
//! records it, and writes the frame back. Framing mirrors the server:
//! 1 success byte + 8-byte big-endian body length + body.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{channel, Receiver};
use std::thread;
use std::time::Duration;

use tickstore_client::ClientConfig;

/// One scripted response frame
pub struct Frame {
    pub success: bool,
    pub body: Vec<u8>,
    /// Write the frame one byte at a time with small pauses, to exercise
    /// partial-read reassembly in the client
    pub trickle: bool,
}

impl Frame {
    pub fn ok(body: &[u8]) -> Self {
        Frame {
            success: true,
            body: body.to_vec(),
            trickle: false,
        }
    }

    pub fn err(body: &[u8]) -> Self {
        Frame {
            success: false,
            body: body.to_vec(),
            trickle: false,
        }
    }

    pub fn trickled(body: &[u8]) -> Self {
        Frame {
            success: true,
            body: body.to_vec(),
            trickle: true,
        }
    }
}

/// Spawn a mock server scripted with `frames`. Returns its address and a
/// channel yielding each command line the server received (without the
/// trailing newline).
pub fn spawn_server(frames: Vec<Frame>) -> (SocketAddr, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = channel();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone"));
        let mut writer = stream;
        for frame in frames {
            let mut line = String::new();
            if reader.read_line(&mut line).expect("read command") == 0 {
                return;
            }
            let command = line.trim_end_matches('\n').to_string();
            let _ = tx.send(command);
            write_frame(&mut writer, &frame);
        }
    });

    (addr, rx)
}

/// Encode and send one response frame
pub fn write_frame(stream: &mut TcpStream, frame: &Frame) {
    let mut buf = Vec::with_capacity(9 + frame.body.len());
    buf.push(frame.success as u8);
    buf.extend_from_slice(&(frame.body.len() as u64).to_be_bytes());
    buf.extend_from_slice(&frame.body);

    if frame.trickle {
        for byte in buf {
            stream.write_all(&[byte]).expect("write");
            stream.flush().expect("flush");
            thread::sleep(Duration::from_millis(1));
        }
    } else {
        stream.write_all(&buf).expect("write");
        stream.flush().expect("flush");
    }
}

/// Client config pointing at the mock server, with a short backoff so
/// subscription tests stay fast
pub fn config_for(addr: SocketAddr) -> ClientConfig {
    ClientConfig::builder()
        .host(addr.ip().to_string())
        .port(addr.port())
        .poll_backoff(Duration::from_millis(5))
        .build()
}

/// Drain every command line the server has recorded so far
pub fn received(rx: &Receiver<String>) -> Vec<String> {
    rx.try_iter().collect()
}
