//! Remote control via Unix socket
//!
//! Accepts line-based commands over a Unix socket and hands them to the main
//! loop, which turns them into state machine events:
//!
//! ```text
//! echo next | nc -U /tmp/demogallery.sock
//! ```

use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::state::StateEvent;

const SOCKET_PATH: &str = "/tmp/demogallery.sock";

/// Commands that can be sent over the socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Pause,
    Resume,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "next" | "skip" | "right" => Some(Self::Next),
            "pause" | "p" => Some(Self::Pause),
            "resume" | "continue" => Some(Self::Resume),
            "quit" | "q" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// Manager event for this command; `Quit` is handled by the host
    pub fn event(self) -> Option<StateEvent> {
        match self {
            Self::Next => Some(StateEvent::End),
            Self::Pause => Some(StateEvent::Pause),
            Self::Resume => Some(StateEvent::Resume),
            Self::Quit => None,
        }
    }
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    receiver: Receiver<Command>,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    /// Create a new controller listening on the Unix socket
    pub fn new() -> std::io::Result<Self> {
        // Stale socket from a previous run
        let _ = std::fs::remove_file(SOCKET_PATH);

        let listener = UnixListener::bind(SOCKET_PATH)?;
        listener.set_nonblocking(true)?;

        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || {
            Self::listener_loop(&listener, &sender);
        });

        info!(path = SOCKET_PATH, "remote control listening");
        Ok(Self {
            receiver,
            _listener_thread: handle,
        })
    }

    fn listener_loop(listener: &UnixListener, sender: &Sender<Command>) {
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || {
                        Self::handle_client(stream, &sender);
                    });
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                },
                Err(e) => {
                    warn!(error = %e, "remote control stopped");
                    break;
                },
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: &Sender<Command>) {
        // Accepted sockets inherit non-blocking mode on some platforms
        if let Err(e) = stream.set_nonblocking(false) {
            warn!(error = %e, "remote client dropped");
            return;
        }
        let reader = BufReader::new(stream);
        for line in reader.lines().map_while(Result::ok) {
            match Command::parse(&line) {
                Some(cmd) => {
                    debug!(?cmd, "remote command");
                    if sender.send(cmd).is_err() {
                        break;
                    }
                },
                None => warn!(line = line.trim(), "unknown remote command"),
            }
        }
    }

    /// Get any pending commands (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    pub fn socket_path() -> &'static str {
        SOCKET_PATH
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }
}
