//! Simulator link
//!
//! Encodes dataref requests for X-Plane, sends them over a datagram
//! transport and decodes the subscription responses. Subscription state is
//! not tracked here: whoever subscribes is responsible for unsubscribing.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use mcp_protocol::{decode_response, DatarefRequest, DatarefValue, EncodeCommand};
use tracing::{debug, info, trace};

use crate::error::LinkError;

/// Largest datagram accepted from the simulator
const MAX_DATAGRAM_LEN: usize = 2048;

/// Datagram channel to the simulator
pub trait DatagramTransport {
    /// Send one datagram
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Wait for one datagram
    ///
    /// `None` waits forever. An expired timeout yields
    /// [`LinkError::Timeout`].
    fn recv(&mut self, timeout: Option<Duration>) -> Result<Vec<u8>, LinkError>;

    /// Drop datagrams already waiting, without blocking
    ///
    /// Returns how many were dropped.
    fn discard_pending(&mut self) -> Result<usize, LinkError> {
        Ok(0)
    }
}

/// UDP socket bound locally and aimed at the simulator
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
    buffer: Vec<u8>,
}

impl UdpTransport {
    /// Bind a local socket for talking to `target`
    pub fn open(bind: impl ToSocketAddrs, target: SocketAddr) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind)?;
        info!(
            "Simulator link open on {} -> {}",
            socket.local_addr()?,
            target
        );

        Ok(Self {
            socket,
            target,
            buffer: vec![0; MAX_DATAGRAM_LEN],
        })
    }

    /// Simulator address datagrams are sent to
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Release the socket
    pub fn close(self) {
        debug!("Closing simulator link to {}", self.target);
    }
}

impl DatagramTransport for UdpTransport {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let sent = self.socket.send_to(data, self.target)?;
        if sent != data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("sent {} of {} bytes", sent, data.len()),
            ));
        }
        trace!("Sent {} bytes to {}", sent, self.target);
        Ok(())
    }

    fn recv(&mut self, timeout: Option<Duration>) -> Result<Vec<u8>, LinkError> {
        // A zero read timeout is rejected by the OS; treat it as "wait forever"
        let timeout = timeout.filter(|t| !t.is_zero());
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let expired = || LinkError::Timeout(timeout.unwrap_or_default());

        loop {
            let remaining = match deadline {
                Some(deadline) => {
                    let left = deadline.saturating_duration_since(Instant::now());
                    if left.is_zero() {
                        return Err(expired());
                    }
                    Some(left)
                }
                None => None,
            };
            self.socket.set_read_timeout(remaining)?;

            match self.socket.recv_from(&mut self.buffer) {
                Ok((n, from)) if from != self.target => {
                    debug!("Ignoring {} bytes from {} (not the simulator)", n, from);
                }
                Ok((n, from)) => {
                    trace!("Received {} bytes from {}: {:02X?}", n, from, &self.buffer[..n]);
                    return Ok(self.buffer[..n].to_vec());
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(expired());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn discard_pending(&mut self) -> Result<usize, LinkError> {
        self.socket.set_nonblocking(true)?;

        let mut dropped = 0;
        let result = loop {
            match self.socket.recv_from(&mut self.buffer) {
                Ok((n, from)) => {
                    debug!("Discarding stale {} bytes from {}", n, from);
                    dropped += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break Ok(dropped),
                Err(e) => break Err(e.into()),
            }
        };

        self.socket.set_nonblocking(false)?;
        result
    }
}

/// X-Plane dataref client over a datagram transport
pub struct SimulatorLink<T> {
    transport: T,
    datarefs: Vec<String>,
}

impl<T: DatagramTransport> SimulatorLink<T> {
    /// Create a link addressing datarefs by their position in `datarefs`
    pub fn new(transport: T, datarefs: Vec<String>) -> Self {
        Self {
            transport,
            datarefs,
        }
    }

    /// Write `value` to the dataref at `index`
    pub fn send_data(&mut self, index: usize, value: f32) -> Result<(), LinkError> {
        let path = self
            .datarefs
            .get(index)
            .ok_or(LinkError::UnknownDataref(index))?;
        let packet = DatarefRequest::set(path.as_str(), value).encode();

        debug!("DREF {} = {}", path, value);
        self.transport.send(&packet)?;
        Ok(())
    }

    /// Subscribe to the dataref at `index` at `frequency` reports per second
    ///
    /// The table index doubles as the subscription index. Frequency 0
    /// cancels the subscription.
    pub fn request_data(&mut self, index: usize, frequency: i32) -> Result<(), LinkError> {
        let path = self
            .datarefs
            .get(index)
            .ok_or(LinkError::UnknownDataref(index))?;
        let sub_index = i32::try_from(index).map_err(|_| LinkError::UnknownDataref(index))?;
        let packet = DatarefRequest::subscribe(path.as_str(), frequency, sub_index).encode();

        debug!("RREF {} at {} Hz (index {})", path, frequency, sub_index);
        self.transport.send(&packet)?;
        Ok(())
    }

    /// Wait for one subscription response and decode all its records
    pub fn receive_values(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<Vec<DatarefValue>, LinkError> {
        let data = self.transport.recv(timeout)?;
        let values = decode_response(&data)?;
        trace!("Decoded {} dataref value(s)", values.len());
        Ok(values)
    }

    /// Drop simulator datagrams that arrived before the next request
    pub fn discard_pending(&mut self) -> Result<usize, LinkError> {
        let dropped = self.transport.discard_pending()?;
        if dropped > 0 {
            debug!("Discarded {} stale simulator datagram(s)", dropped);
        }
        Ok(dropped)
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Consume the link, returning the transport
    pub fn into_transport(self) -> T {
        self.transport
    }
}
