//! Serial I/O for the panel connection

use std::io::{self, Read, Write};
use std::time::Duration;

use mcp_protocol::{LineCodec, ProtocolCodec};
use mcp_relay::PanelPort;
use serialport::SerialPort;
use tracing::{debug, info};

/// Serial connection to the panel
pub struct PanelConnection {
    /// Serial port
    port: Box<dyn SerialPort>,
    /// Line splitter
    codec: LineCodec,
    /// Read buffer
    buffer: Vec<u8>,
}

impl PanelConnection {
    /// Open the panel's serial port
    pub fn open(
        port_name: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Self, serialport::Error> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(read_timeout)
            .open()?;
        info!("Opened panel on {} at {} baud", port_name, baud_rate);

        Ok(Self::from_port(port))
    }

    /// Wrap an already opened port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self {
            port,
            codec: LineCodec::new(),
            buffer: vec![0; 256],
        }
    }

    /// Close the port
    pub fn close(self) {
        debug!("Closing panel port {:?}", self.port.name());
    }
}

impl PanelPort for PanelConnection {
    fn read_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        if let Some(line) = self.codec.next_command() {
            return Ok(Some(line));
        }

        match self.port.read(&mut self.buffer) {
            Ok(n) if n > 0 => {
                debug!("Read {} bytes from panel", n);
                self.codec.push_bytes(&self.buffer[..n]);
                Ok(self.codec.next_command())
            }
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        self.port.write_all(data)?;
        self.port.flush()?;
        debug!("Wrote {:?} to panel", String::from_utf8_lossy(data));
        Ok(())
    }
}
