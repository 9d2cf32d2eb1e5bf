use std::io;
use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::dns_message::{build_query, parse_response, DnsResponse};
use crate::error::DnsError;

/// Largest reply this client reads from the resolver
pub const MAX_RESPONSE_SIZE: usize = 2048;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("response id {actual} does not match query id {expected}")]
    IdMismatch { expected: u16, actual: u16 },

    #[error(transparent)]
    Codec(#[from] DnsError),
}

/// Parameters of a single query
#[derive(Debug, Clone)]
pub struct LookupOptions {
    pub id: u16,
    pub qtype: u16,
    pub qclass: u16,
    pub timeout: Duration,
}

/// A parsed reply together with where it came from and its size on the wire
#[derive(Debug)]
pub struct Lookup {
    pub response: DnsResponse,
    pub source: SocketAddr,
    pub size: usize,
}

/// Send one query datagram to `resolver` and wait up to `options.timeout` for the reply
/// No retransmission: a lost datagram surfaces as `LookupError::Timeout`
pub fn lookup(
    resolver: SocketAddr,
    name: &str,
    options: &LookupOptions,
) -> Result<Lookup, LookupError> {
    // Encode first so an invalid name never reaches the network
    let query = build_query(options.id, name, options.qtype, options.qclass)?;

    let bind_addr: SocketAddr = if resolver.is_ipv4() {
        ([0, 0, 0, 0], 0).into()
    } else {
        ([0u16; 8], 0).into()
    };
    let socket = UdpSocket::bind(bind_addr)?;
    socket.set_read_timeout(Some(options.timeout))?;

    socket.send_to(&query, resolver)?;
    debug!(%resolver, len = query.len(), "sent query");

    // Owned by this call; the parsed response copies out of it
    let mut response_buf = vec![0u8; MAX_RESPONSE_SIZE];
    let (size, source) = match socket.recv_from(&mut response_buf) {
        Ok(received) => received,
        Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
            return Err(LookupError::Timeout(options.timeout));
        }
        Err(e) => return Err(e.into()),
    };
    debug!(%source, size, "received response");

    let response = parse_response(&response_buf[..size])?;
    if response.header.id != options.id {
        warn!(
            expected = options.id,
            actual = response.header.id,
            "response id does not match query"
        );
        return Err(LookupError::IdMismatch {
            expected: options.id,
            actual: response.header.id,
        });
    }

    Ok(Lookup {
        response,
        source,
        size,
    })
}
