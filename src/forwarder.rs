use std::{
    io::{self, Write as _},
    net::{Ipv4Addr, SocketAddr, TcpStream, ToSocketAddrs as _, UdpSocket},
    time::Duration,
};

use thiserror::Error;

/// Errors that could occur while sending a signal to a remote daemon.
#[derive(Debug, Error)]
pub enum SendError {
    /// Failed to resolve the configured host.
    #[error("failed to resolve {host}:{port}: {source}")]
    Resolve {
        /// The configured hostname.
        host: String,

        /// The configured port.
        port: u16,

        /// The underlying resolution failure.
        #[source]
        source: io::Error,
    },

    /// The configured host resolved to no usable addresses.
    #[error("no addresses resolved for {host}:{port}")]
    NoAddresses {
        /// The configured hostname.
        host: String,

        /// The configured port.
        port: u16,
    },

    /// Failed to connect to the remote daemon.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// The resolved remote address.
        addr: SocketAddr,

        /// The underlying connection failure.
        #[source]
        source: io::Error,
    },

    /// Failed to write to an established connection.
    #[error("failed to write to {addr}: {source}")]
    Write {
        /// The resolved remote address.
        addr: SocketAddr,

        /// The underlying write failure.
        #[source]
        source: io::Error,
    },
}

impl SendError {
    /// Returns `true` if this error is a connect/write timeout.
    ///
    /// Write timeouts surface as `WouldBlock` on Unix and `TimedOut` on
    /// Windows, so both kinds classify as timeouts here.
    pub fn is_timeout(&self) -> bool {
        match self {
            SendError::Connect { source, .. } | SendError::Write { source, .. } => {
                matches!(source.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
            }
            _ => false,
        }
    }
}

/// Opens a transient TCP connection to `host:port`, writes `line` followed by
/// a single newline, and closes the connection.
///
/// `timeout` bounds both the connect and the write.
pub(crate) fn send_tcp_line(
    host: &str,
    port: u16,
    line: &str,
    timeout: Duration,
) -> Result<(), SendError> {
    let addr = resolve(host, port)?;

    let mut stream = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|source| SendError::Connect { addr, source })?;

    stream
        .set_write_timeout(Some(timeout))
        .and_then(|()| stream.write_all(line.as_bytes()))
        .and_then(|()| stream.write_all(b"\n"))
        .map_err(|source| SendError::Write { addr, source })
}

/// Sends `datagram` to `host:port` from an ephemeral socket.
///
/// Best-effort: the socket is unconnected, so delivery failures beyond the
/// local send are never observed.
pub(crate) fn send_udp_datagram(host: &str, port: u16, datagram: &str) -> io::Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.send_to(datagram.as_bytes(), (host, port))?;
    Ok(())
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, SendError> {
    let mut addrs = (host, port)
        .to_socket_addrs()
        .map_err(|source| SendError::Resolve { host: host.to_string(), port, source })?;

    addrs.next().ok_or_else(|| SendError::NoAddresses { host: host.to_string(), port })
}
