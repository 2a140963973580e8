//! B737 MCP Relay Engine
//!
//! This crate connects the hardware panel to the simulator:
//!
//! - **Switches** and **push-buttons** become synthetic key presses bound in
//!   the simulator
//! - **Encoders** become X-Plane `DREF` writes
//! - The **query button** subscribes to a dataref, waits for one report,
//!   unsubscribes and writes the value back to the panel
//!
//! # Architecture
//!
//! [`PanelRelay`] is a single-threaded loop. It owns three capabilities,
//! each injected by the caller:
//!
//! - a [`PanelPort`] (serial line to the panel)
//! - a [`KeyInjector`] (OS keyboard input)
//! - a [`DatagramTransport`] (UDP to X-Plane), wrapped in a [`SimulatorLink`]
//!
//! # Example
//!
//! ```rust,no_run
//! use mcp_protocol::PanelLayout;
//! use mcp_relay::{KeyInjector, InjectError, PanelPort, PanelRelay, RelayConfig, UdpTransport};
//!
//! struct Stdin;
//! impl PanelPort for Stdin {
//!     fn read_line(&mut self) -> std::io::Result<Option<Vec<u8>>> {
//!         let mut line = String::new();
//!         std::io::stdin().read_line(&mut line)?;
//!         Ok(Some(line.into_bytes()))
//!     }
//!     fn write(&mut self, data: &[u8]) -> std::io::Result<()> {
//!         println!("{}", String::from_utf8_lossy(data));
//!         Ok(())
//!     }
//! }
//!
//! struct Print;
//! impl KeyInjector for Print {
//!     fn press(&mut self, key: char) -> Result<(), InjectError> {
//!         println!("press {key}");
//!         Ok(())
//!     }
//! }
//!
//! let udp = UdpTransport::open("0.0.0.0:0", "127.0.0.1:49000".parse().unwrap()).unwrap();
//! let mut relay = PanelRelay::new(Stdin, Print, udp, PanelLayout::b737_mcp(), RelayConfig::default());
//! relay.run().unwrap();
//! ```

pub mod engine;
pub mod error;
pub mod link;
pub mod ports;

pub use engine::{PanelRelay, RelayAction, RelayConfig};
pub use error::{Control, InjectError, LinkError, RelayError};
pub use link::{DatagramTransport, SimulatorLink, UdpTransport};
pub use ports::{KeyInjector, PanelPort};
