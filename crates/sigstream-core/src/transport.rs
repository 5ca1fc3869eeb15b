//! Transport — frame sinks over TCP and UDP
//!
//! One send operation over two socket disciplines. The TCP sink plays the
//! server role: it binds, listens, waits for exactly one analyzer to
//! connect, then writes every frame reliably and in order onto that
//! single stream for the life of the process. The UDP sink is
//! fire-and-forget: each frame goes out as one independent datagram to a
//! fixed loopback destination, with no delivery guarantee and no feedback
//! on loss.
//!
//! Each sink tracks its lifecycle in an explicit state enum so that
//! "waiting for a peer" and "connection lost" are first-class, testable
//! transitions rather than implicit blocking calls.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sigstream_core::cancel::CancelToken;
//! use sigstream_core::transport::{FrameSink, TcpFrameSink};
//!
//! let mut sink = TcpFrameSink::new("0.0.0.0:5000");
//! let cancel = CancelToken::new();
//! sink.start(&cancel).unwrap(); // blocks until the analyzer connects
//! sink.send(&[0u8; 2048]).unwrap();
//! sink.close();
//! ```

use crate::cancel::CancelToken;
use crate::config::{NetworkConfig, TransportKind};
use std::fmt;
use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::time::Duration;

/// How often the accept wait polls for cancellation.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Error type for transport operations.
///
/// Connection loss is distinct from generic socket faults so the driver
/// can report "receiver disconnected" separately; cancellation is not a
/// fault at all, just a shutdown request observed mid-wait.
#[derive(Debug)]
pub enum TransportError {
    /// `send` called before a connection/socket exists.
    NotConnected,
    /// The wait for a peer was cancelled.
    Cancelled,
    /// The peer closed or reset the connection during a write. Terminal:
    /// there is no reconnection and no second accept.
    ConnectionLost(io::Error),
    /// Any other local socket fault.
    Io(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::NotConnected => write!(f, "transport not connected"),
            TransportError::Cancelled => write!(f, "cancelled while waiting for peer"),
            TransportError::ConnectionLost(e) => write!(f, "connection lost: {e}"),
            TransportError::Io(e) => write!(f, "socket error: {e}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::ConnectionLost(e) | TransportError::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Capability interface over both socket disciplines.
///
/// `start` acquires the socket resources (and, for TCP, waits for the
/// peer); `send` ships one whole frame; `close` releases everything and
/// is safe to call multiple times, in any state.
pub trait FrameSink: Send {
    /// Acquire socket resources. In TCP mode this blocks until a peer
    /// connects or the token is cancelled.
    fn start(&mut self, cancel: &CancelToken) -> Result<(), TransportError>;

    /// Send one frame. All-or-nothing per frame: either the full frame is
    /// handed to the OS or an error is returned.
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Release all socket resources. Idempotent.
    fn close(&mut self);
}

/// TCP sink lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TcpSinkState {
    Idle,
    Bound,
    Listening,
    Connected,
    Closed,
    Errored,
}

/// TCP frame sink (server role).
///
/// Supports at most one peer for the program's lifetime. A write failure
/// is terminal for the connection; the sink moves to `Errored` and stays
/// there until closed.
#[derive(Debug)]
pub struct TcpFrameSink {
    address: String,
    listener: Option<TcpListener>,
    stream: Option<TcpStream>,
    state: TcpSinkState,
}

impl TcpFrameSink {
    /// Create a sink that will bind to `address` ("host:port").
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            listener: None,
            stream: None,
            state: TcpSinkState::Idle,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TcpSinkState {
        self.state
    }

    /// Local address of the listening socket, once bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Bind and listen without waiting for a peer.
    ///
    /// `start` calls this implicitly; it is public so callers (and tests)
    /// can learn the bound port before the accept wait begins.
    pub fn bind(&mut self) -> Result<(), TransportError> {
        let listener = TcpListener::bind(&self.address).map_err(TransportError::Io)?;
        self.state = TcpSinkState::Bound;
        // Non-blocking accept so the wait for a peer can observe the
        // cancellation token.
        listener.set_nonblocking(true).map_err(TransportError::Io)?;
        self.listener = Some(listener);
        self.state = TcpSinkState::Listening;
        Ok(())
    }
}

impl FrameSink for TcpFrameSink {
    fn start(&mut self, cancel: &CancelToken) -> Result<(), TransportError> {
        if self.state == TcpSinkState::Idle {
            self.bind()?;
        }
        tracing::info!(address = %self.address, "tcp sink listening, waiting for receiver");

        loop {
            if cancel.is_cancelled() {
                self.listener = None;
                self.state = TcpSinkState::Closed;
                return Err(TransportError::Cancelled);
            }
            let accepted = match self.listener.as_ref() {
                Some(listener) => listener.accept(),
                None => return Err(TransportError::NotConnected),
            };
            match accepted {
                Ok((stream, peer)) => {
                    stream.set_nonblocking(false).map_err(TransportError::Io)?;
                    stream.set_nodelay(true).map_err(TransportError::Io)?;
                    tracing::info!(%peer, "receiver connected");
                    self.stream = Some(stream);
                    self.state = TcpSinkState::Connected;
                    return Ok(());
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    self.state = TcpSinkState::Errored;
                    return Err(TransportError::Io(e));
                }
            }
        }
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let stream = match self.stream.as_mut() {
            Some(s) => s,
            None => return Err(TransportError::NotConnected),
        };
        // write_all retries partial writes until the whole frame is
        // flushed to the OS or the connection fails.
        match stream.write_all(frame) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.stream = None;
                self.state = TcpSinkState::Errored;
                match e.kind() {
                    io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::WriteZero => Err(TransportError::ConnectionLost(e)),
                    _ => Err(TransportError::Io(e)),
                }
            }
        }
    }

    fn close(&mut self) {
        self.stream = None;
        self.listener = None;
        self.state = TcpSinkState::Closed;
    }
}

impl Drop for TcpFrameSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// UDP sink lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UdpSinkState {
    Idle,
    Ready,
    Sending,
}

/// UDP frame sink (fire-and-forget).
///
/// Each `send` transmits one independent datagram to the fixed loopback
/// destination. Delivery, ordering and duplication are unspecified, and
/// the sender never observes loss. Frames larger than the path MTU are
/// handed to the OS unchecked and may be fragmented or dropped by the
/// network stack.
#[derive(Debug)]
pub struct UdpFrameSink {
    dest: String,
    socket: Option<UdpSocket>,
    state: UdpSinkState,
    datagrams_sent: u64,
}

impl UdpFrameSink {
    /// Create a sink targeting 127.0.0.1 at the given port.
    pub fn new(port: u16) -> Self {
        Self {
            dest: format!("127.0.0.1:{port}"),
            socket: None,
            state: UdpSinkState::Idle,
            datagrams_sent: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> UdpSinkState {
        self.state
    }

    /// Datagrams handed to the OS so far.
    pub fn datagrams_sent(&self) -> u64 {
        self.datagrams_sent
    }
}

impl FrameSink for UdpFrameSink {
    fn start(&mut self, _cancel: &CancelToken) -> Result<(), TransportError> {
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(TransportError::Io)?;
        socket.set_nonblocking(true).map_err(TransportError::Io)?;
        tracing::info!(dest = %self.dest, "udp sink ready");
        self.socket = Some(socket);
        self.state = UdpSinkState::Ready;
        Ok(())
    }

    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        let socket = match self.socket.as_ref() {
            Some(s) => s,
            None => return Err(TransportError::NotConnected),
        };
        match socket.send_to(frame, &self.dest) {
            Ok(_) => {
                self.state = UdpSinkState::Sending;
                self.datagrams_sent += 1;
                Ok(())
            }
            // WouldBlock: full local buffer, datagram dropped.
            // ConnectionRefused: ICMP unreachable from a missing
            // receiver. Both are loss, and loss is unobservable here.
            Err(ref e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::ConnectionRefused =>
            {
                self.state = UdpSinkState::Sending;
                Ok(())
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn close(&mut self) {
        self.socket = None;
        self.state = UdpSinkState::Idle;
    }
}

impl Drop for UdpFrameSink {
    fn drop(&mut self) {
        self.close();
    }
}

/// Build the sink for the configured transport.
///
/// The transport kind is already a typed enum, so an invalid kind has
/// been rejected at configuration parse time, before any socket opens.
/// For UDP the configured host is ignored; datagrams always go to
/// loopback.
pub fn create_sink(network: &NetworkConfig) -> Box<dyn FrameSink> {
    match network.transport {
        TransportKind::Tcp => Box::new(TcpFrameSink::new(&format!(
            "{}:{}",
            network.host, network.port
        ))),
        TransportKind::Udp => Box::new(UdpFrameSink::new(network.port)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_tcp_initial_state() {
        let sink = TcpFrameSink::new("127.0.0.1:5000");
        assert_eq!(sink.state(), TcpSinkState::Idle);
        assert!(sink.local_addr().is_none());
    }

    #[test]
    fn test_tcp_bind_transitions_to_listening() {
        let mut sink = TcpFrameSink::new("127.0.0.1:0");
        sink.bind().unwrap();
        assert_eq!(sink.state(), TcpSinkState::Listening);
        assert!(sink.local_addr().is_some());
    }

    #[test]
    fn test_tcp_send_before_start() {
        let mut sink = TcpFrameSink::new("127.0.0.1:5000");
        let err = sink.send(&[0u8; 8]).unwrap_err();
        assert!(matches!(err, TransportError::NotConnected));
    }

    #[test]
    fn test_tcp_start_waits_for_peer_then_sends() {
        let mut sink = TcpFrameSink::new("127.0.0.1:0");
        sink.bind().unwrap();
        let addr = sink.local_addr().unwrap();

        let reader = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            let mut buf = vec![0u8; 2048];
            stream.read_exact(&mut buf).unwrap();
            buf
        });

        let cancel = CancelToken::new();
        sink.start(&cancel).unwrap();
        assert_eq!(sink.state(), TcpSinkState::Connected);

        let frame: Vec<u8> = (0..2048).map(|i| (i % 251) as u8).collect();
        sink.send(&frame).unwrap();
        sink.close();
        assert_eq!(sink.state(), TcpSinkState::Closed);

        let received = reader.join().unwrap();
        assert_eq!(received, frame);
    }

    #[test]
    fn test_tcp_start_cancelled_before_peer() {
        let mut sink = TcpFrameSink::new("127.0.0.1:0");
        sink.bind().unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = sink.start(&cancel).unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
        assert_eq!(sink.state(), TcpSinkState::Closed);
    }

    #[test]
    fn test_tcp_start_cancelled_mid_wait() {
        let mut sink = TcpFrameSink::new("127.0.0.1:0");
        sink.bind().unwrap();

        let cancel = CancelToken::new();
        let remote = cancel.clone();
        let canceller = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(100));
            remote.cancel();
        });

        let err = sink.start(&cancel).unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
        assert_eq!(sink.state(), TcpSinkState::Closed);
        canceller.join().unwrap();
    }

    #[test]
    fn test_tcp_connection_lost_during_send() {
        let mut sink = TcpFrameSink::new("127.0.0.1:0");
        sink.bind().unwrap();
        let addr = sink.local_addr().unwrap();

        let peer = std::thread::spawn(move || {
            // Connect, then drop the stream immediately
            let _stream = TcpStream::connect(addr).unwrap();
        });

        let cancel = CancelToken::new();
        sink.start(&cancel).unwrap();
        peer.join().unwrap();

        // The first writes may land in the socket buffer; keep writing
        // until the peer close surfaces.
        let frame = vec![0u8; 2048];
        let mut result = Ok(());
        for _ in 0..200 {
            result = sink.send(&frame);
            if result.is_err() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        let err = result.unwrap_err();
        assert!(
            matches!(err, TransportError::ConnectionLost(_)),
            "expected ConnectionLost, got {err:?}"
        );
        assert_eq!(sink.state(), TcpSinkState::Errored);

        // A sink in Errored state refuses further sends
        assert!(matches!(
            sink.send(&frame).unwrap_err(),
            TransportError::NotConnected
        ));
    }

    #[test]
    fn test_tcp_close_idempotent() {
        let mut sink = TcpFrameSink::new("127.0.0.1:0");
        sink.close();
        sink.close();
        assert_eq!(sink.state(), TcpSinkState::Closed);

        sink.bind().unwrap();
        sink.close();
        sink.close();
        assert_eq!(sink.state(), TcpSinkState::Closed);
    }

    #[test]
    fn test_udp_initial_state_and_send_before_start() {
        let mut sink = UdpFrameSink::new(5000);
        assert_eq!(sink.state(), UdpSinkState::Idle);
        assert!(matches!(
            sink.send(&[0u8; 8]).unwrap_err(),
            TransportError::NotConnected
        ));
    }

    #[test]
    fn test_udp_start_is_nonblocking_and_ready() {
        let mut sink = UdpFrameSink::new(5000);
        let cancel = CancelToken::new();
        let before = std::time::Instant::now();
        sink.start(&cancel).unwrap();
        assert!(before.elapsed() < Duration::from_millis(500));
        assert_eq!(sink.state(), UdpSinkState::Ready);
    }

    #[test]
    fn test_udp_send_delivers_datagram() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let port = receiver.local_addr().unwrap().port();

        let mut sink = UdpFrameSink::new(port);
        let cancel = CancelToken::new();
        sink.start(&cancel).unwrap();

        let frame: Vec<u8> = (0..2048).map(|i| (i % 13) as u8).collect();
        sink.send(&frame).unwrap();
        assert_eq!(sink.state(), UdpSinkState::Sending);
        assert_eq!(sink.datagrams_sent(), 1);

        let mut buf = vec![0u8; 4096];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..n], &frame[..]);
    }

    #[test]
    fn test_udp_send_to_absent_receiver_is_not_an_error() {
        // Nobody listens on port 1; every send must still succeed
        let mut sink = UdpFrameSink::new(1);
        let cancel = CancelToken::new();
        sink.start(&cancel).unwrap();
        for _ in 0..5 {
            sink.send(&[0u8; 64]).unwrap();
        }
    }

    #[test]
    fn test_udp_close_idempotent() {
        let mut sink = UdpFrameSink::new(5000);
        let cancel = CancelToken::new();
        sink.start(&cancel).unwrap();
        sink.close();
        sink.close();
        assert_eq!(sink.state(), UdpSinkState::Idle);
    }

    #[test]
    fn test_create_sink_dispatch() {
        let tcp = NetworkConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            transport: TransportKind::Tcp,
        };
        let udp = NetworkConfig {
            transport: TransportKind::Udp,
            ..tcp.clone()
        };
        // Both kinds construct without opening sockets
        let _tcp_sink = create_sink(&tcp);
        let _udp_sink = create_sink(&udp);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            TransportError::NotConnected.to_string(),
            "transport not connected"
        );
        let lost = TransportError::ConnectionLost(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "peer closed",
        ));
        assert!(lost.to_string().contains("connection lost"));
    }
}
