//! # Line formatting and output sinks.
//!
//! One fixed-column line format, four sink kinds. The TCP sink runs a small
//! connection state machine driven by the log task's reconnect timer:
//!
//! ```text
//!   Disabled        terminal, set only by configuration
//!   NotConnected ──tick──► Connecting ──ok──► Connected
//!        ▲                      │ err              │ write err
//!        └──────────────────────┴──────────────────┘
//! ```
//!
//! A write failure downgrades to `NotConnected` and the next reconnect tick
//! tries again; no runtime event ever reaches `Disabled`.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::net::TcpStream;
use std::path::Path;
use std::time::Duration;

use crate::logging::config::{LogConfig, LogOutput};
use crate::logging::item::LogItem;

const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
const ANSI_RESET: &str = "\x1b[0m";

/// Renders one record into the fixed-column line format.
///
/// `000042 2026-08-30T12:00:00.123456Z 0000001A MME  INFO  SCTP sctp_task.rs:0217   message`
pub(crate) fn format_line(item: &LogItem, color: bool) -> String {
    let file = item
        .file
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(item.file);
    let mut line = String::with_capacity(96 + item.text.len());
    if color {
        line.push_str(item.level.ansi_color());
    }
    let corr = match item.correlation_id {
        Some(id) => format!("[{id:08X}] "),
        None => String::new(),
    };
    use std::fmt::Write as _;
    let _ = write!(
        line,
        "{seq:06} {ts} {tid:08X} {app:<4.4} {level:<5.5} {sub:<4.4} {file}:{srcline:04}   {corr}{indent}{text}",
        seq = item.seq,
        ts = item.at.format("%Y-%m-%dT%H:%M:%S%.6fZ"),
        tid = item.thread_id,
        app = item.app_name,
        level = item.level.name(),
        sub = item.subsystem.name(),
        srcline = item.line,
        indent = " ".repeat(item.indent),
        text = item.text,
    );
    if color {
        line.push_str(ANSI_RESET);
    }
    line.push('\n');
    line
}

/// Connection state of the TCP sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TcpState {
    /// TCP output is configured off. Terminal.
    Disabled,
    /// No connection; the reconnect timer will retry.
    NotConnected,
    /// A connect attempt is in flight.
    Connecting,
    /// Lines are being written to the collector.
    Connected,
}

/// TCP collector sink with background reconnect.
#[derive(Debug)]
pub(crate) struct TcpSink {
    host: String,
    port: u16,
    state: TcpState,
    stream: Option<TcpStream>,
}

impl TcpSink {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            state: TcpState::NotConnected,
            stream: None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> TcpState {
        self.state
    }

    /// One reconnect-timer tick: attempt a connection if there is none.
    pub fn tick_connect(&mut self) {
        if !matches!(self.state, TcpState::NotConnected) {
            return;
        }
        self.state = TcpState::Connecting;
        let target = (self.host.as_str(), self.port);
        let addrs = match std::net::ToSocketAddrs::to_socket_addrs(&target) {
            Ok(addrs) => addrs,
            Err(_) => {
                self.state = TcpState::NotConnected;
                return;
            }
        };
        for addr in addrs {
            if let Ok(stream) = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
                let _ = stream.set_nodelay(true);
                self.stream = Some(stream);
                self.state = TcpState::Connected;
                return;
            }
        }
        self.state = TcpState::NotConnected;
    }

    /// Writes one formatted line; a failure drops the connection.
    pub fn write_line(&mut self, line: &str) {
        let Some(stream) = self.stream.as_mut() else {
            return;
        };
        if stream.write_all(line.as_bytes()).is_err() {
            self.stream = None;
            self.state = TcpState::NotConnected;
        }
    }
}

/// The configured output sink.
#[derive(Debug)]
pub(crate) enum Sink {
    Console,
    File(File),
    #[cfg(unix)]
    Syslog {
        socket: std::os::unix::net::UnixDatagram,
        tag: String,
    },
    Tcp(TcpSink),
}

impl Sink {
    /// Builds the sink named by the configuration.
    ///
    /// File-open and syslog-socket failures degrade to console with a note
    /// on stderr; the process keeps its logs either way.
    pub fn from_config(cfg: &LogConfig) -> Self {
        match &cfg.output {
            LogOutput::Console => Sink::Console,
            LogOutput::File(path) => match open_log_file(path) {
                Ok(file) => Sink::File(file),
                Err(e) => {
                    eprintln!("log: cannot open {}: {e}; using console", path.display());
                    Sink::Console
                }
            },
            LogOutput::Syslog => {
                #[cfg(unix)]
                {
                    match connect_syslog() {
                        Ok(socket) => Sink::Syslog {
                            socket,
                            tag: cfg.app_name.clone(),
                        },
                        Err(e) => {
                            eprintln!("log: cannot reach syslog: {e}; using console");
                            Sink::Console
                        }
                    }
                }
                #[cfg(not(unix))]
                {
                    Sink::Console
                }
            }
            LogOutput::Tcp { host, port } => Sink::Tcp(TcpSink::new(host.clone(), *port)),
        }
    }

    /// True when this sink is driven by the reconnect timer.
    pub fn wants_connect_timer(&self) -> bool {
        matches!(self, Sink::Tcp(_))
    }

    pub fn tick_connect(&mut self) {
        if let Sink::Tcp(tcp) = self {
            tcp.tick_connect();
        }
    }

    /// Writes one formatted line (already newline-terminated).
    pub fn write_line(&mut self, line: &str, item: &LogItem) {
        match self {
            Sink::Console => {
                let stdout = io::stdout();
                let mut out = stdout.lock();
                let _ = out.write_all(line.as_bytes());
            }
            Sink::File(file) => {
                let _ = file.write_all(line.as_bytes());
            }
            #[cfg(unix)]
            Sink::Syslog { socket, tag } => {
                // RFC 3164 user-facility priority derived from the level.
                let pri = 8 + (item.level as u8).min(7);
                let msg = format!("<{pri}>{tag}: {}", item.text);
                let _ = socket.send(msg.as_bytes());
            }
            Sink::Tcp(tcp) => tcp.write_line(line),
        }
    }

    pub fn flush(&mut self) {
        match self {
            Sink::Console => {
                let _ = io::stdout().flush();
            }
            Sink::File(file) => {
                let _ = file.flush();
            }
            #[cfg(unix)]
            Sink::Syslog { .. } => {}
            Sink::Tcp(tcp) => {
                if let Some(stream) = tcp.stream.as_mut() {
                    if stream.flush().is_err() {
                        tcp.stream = None;
                        tcp.state = TcpState::NotConnected;
                    }
                }
            }
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(unix)]
fn connect_syslog() -> io::Result<std::os::unix::net::UnixDatagram> {
    let socket = std::os::unix::net::UnixDatagram::unbound()?;
    socket.connect("/dev/log")?;
    Ok(socket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::level::{LogLevel, Subsystem};
    use chrono::TimeZone;

    fn sample_item() -> LogItem {
        let mut item = LogItem::blank();
        item.app_name.push_str("MME");
        item.level = LogLevel::Warning;
        item.subsystem = Subsystem::Sctp;
        item.file = "src/transport/sctp_task.rs";
        item.line = 217;
        item.thread_id = 0x1A;
        item.seq = 42;
        item.indent = 2;
        item.at = chrono::Utc
            .with_ymd_and_hms(2026, 8, 30, 12, 0, 0)
            .single()
            .unwrap();
        item.text.push_str("association down");
        item
    }

    #[test]
    fn line_columns_are_fixed_width() {
        let line = format_line(&sample_item(), false);
        assert!(line.starts_with("000042 2026-08-30T12:00:00.000000Z 0000001A "));
        assert!(line.contains("MME  WARNI SCTP sctp_task.rs:0217"));
        assert!(line.ends_with("  association down\n"));
    }

    #[test]
    fn color_wraps_the_line() {
        let line = format_line(&sample_item(), true);
        assert!(line.starts_with(LogLevel::Warning.ansi_color()));
        assert!(line.ends_with("\x1b[0m\n"));
    }

    #[test]
    fn correlation_id_column_appears_when_set() {
        let mut item = sample_item();
        item.correlation_id = Some(0xBEEF);
        let line = format_line(&item, false);
        assert!(line.contains("[0000BEEF] "));
    }

    #[test]
    fn tcp_sink_connects_and_degrades() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut sink = TcpSink::new("127.0.0.1".to_owned(), port);
        assert_eq!(sink.state(), TcpState::NotConnected);
        sink.tick_connect();
        assert_eq!(sink.state(), TcpState::Connected);

        let (conn, _) = listener.accept().unwrap();
        sink.write_line("hello collector\n");
        assert_eq!(sink.state(), TcpState::Connected);

        // Peer gone: the write (or the one after, once the RST lands) must
        // downgrade to NotConnected rather than disable the sink.
        drop(conn);
        drop(listener);
        for _ in 0..10 {
            sink.write_line("after close\n");
            if sink.state() == TcpState::NotConnected {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(sink.state(), TcpState::NotConnected);
        assert_ne!(sink.state(), TcpState::Disabled);
    }

    #[test]
    fn tcp_sink_retries_on_next_tick() {
        // Port from a just-closed listener: connect should fail cleanly.
        let port = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap().port()
        };
        let mut sink = TcpSink::new("127.0.0.1".to_owned(), port);
        sink.tick_connect();
        assert_eq!(sink.state(), TcpState::NotConnected);

        let listener = std::net::TcpListener::bind(("127.0.0.1", port));
        if let Ok(listener) = listener {
            sink.tick_connect();
            assert_eq!(sink.state(), TcpState::Connected);
            drop(listener);
        }
    }
}
