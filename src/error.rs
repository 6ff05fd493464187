use std::io;
use std::time::Duration;

use thiserror::Error;

/// Everything that can go wrong while querying a UT2004 server.
///
/// Only the exchange itself is fallible: once the section buffers are in
/// hand, decoding degrades to sentinel values instead of erroring.
#[derive(Debug, Error)]
pub enum UtQueryError {
    /// Could not bind a local UDP socket for the exchange.
    #[error("failed to bind local socket: {0}")]
    FailedPortBind(#[source] io::Error),

    /// The query address did not resolve.
    #[error("unreachable host: {0}")]
    UnreachableHost(#[source] io::Error),

    /// The query address resolved to nothing at all.
    #[error("no address found for host: {0}")]
    InvalidHost(String),

    /// Sending a probe datagram failed.
    #[error("failed to send query: {0}")]
    SendError(#[source] io::Error),

    /// Receiving from the socket failed (distinct from a silent server).
    #[error("failed to receive response: {0}")]
    ReceiveError(#[source] io::Error),

    /// The server sent nothing within the receive window.
    #[error("no response from server within {0:?}")]
    NoResponse(Duration),

    /// The server went quiet before the terminating basic info section.
    #[error("incomplete response: server went quiet after {datagrams} datagram(s)")]
    Incomplete { datagrams: usize },

    /// A response datagram was shorter than the 5-byte section header.
    #[error("datagram too short for a section header: {0} byte(s)")]
    ShortDatagram(usize),

    /// The section tag byte named no known section.
    #[error("unknown section tag: {0:#04x}")]
    UnknownSectionTag(u8),
}
