//! Panel relay engine
//!
//! Reads one panel record at a time and turns it into a key press, a
//! dataref write, or (for the query button) a dataref read-back written to
//! the panel. Everything runs on the caller's thread and blocks it.

use std::thread;
use std::time::Duration;

use mcp_protocol::{encode_value, DatarefValue, PanelEvent, PanelLayout};
use tracing::{debug, info, trace, warn};

use crate::error::{Control, LinkError, RelayError};
use crate::link::{DatagramTransport, SimulatorLink};
use crate::ports::{KeyInjector, PanelPort};

/// Relay configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Pause between the two presses of the double-press switch
    pub double_press_delay: Duration,
    /// How long the query button waits for the simulator (`None` = forever)
    pub query_timeout: Option<Duration>,
    /// Subscription rate requested by the query button
    pub query_frequency: i32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            double_press_delay: Duration::from_secs(2),
            query_timeout: Some(Duration::from_secs(2)),
            query_frequency: 1,
        }
    }
}

/// What the relay did with one record
#[derive(Debug, Clone, PartialEq)]
pub enum RelayAction {
    /// Blank line or unknown prefix
    Ignored,
    /// Key pressed for a switch or button
    KeyPressed { key: char, presses: u8 },
    /// Encoder delta forwarded to the simulator
    DatarefSet { index: usize, value: f32 },
    /// Query button pressed and its dataref value written to the panel
    Queried { key: char, value: f32 },
}

/// The panel relay
pub struct PanelRelay<P, K, T> {
    panel: P,
    keys: K,
    link: SimulatorLink<T>,
    layout: PanelLayout,
    config: RelayConfig,
}

impl<P, K, T> PanelRelay<P, K, T>
where
    P: PanelPort,
    K: KeyInjector,
    T: DatagramTransport,
{
    /// Create a relay for `layout`
    pub fn new(panel: P, keys: K, transport: T, layout: PanelLayout, config: RelayConfig) -> Self {
        let link = SimulatorLink::new(transport, layout.datarefs.clone());
        Self {
            panel,
            keys,
            link,
            layout,
            config,
        }
    }

    /// Relay records until the serial port fails
    pub fn run(&mut self) -> Result<(), RelayError> {
        info!("Relay running");
        loop {
            self.poll_once()?;
        }
    }

    /// Read and relay at most one record
    ///
    /// Only a serial read failure is returned as an error. Anything that
    /// goes wrong with the record itself is logged and the record dropped.
    pub fn poll_once(&mut self) -> Result<Option<RelayAction>, RelayError> {
        let Some(line) = self.panel.read_line().map_err(RelayError::Serial)? else {
            return Ok(None);
        };

        match self.handle_line(&line) {
            Ok(action) => Ok(Some(action)),
            Err(e) => {
                warn!("Dropping panel record {:02X?}: {}", line, e);
                Ok(None)
            }
        }
    }

    /// Parse and dispatch one raw record
    pub fn handle_line(&mut self, line: &[u8]) -> Result<RelayAction, RelayError> {
        trace!("Panel record {:?}", String::from_utf8_lossy(line));
        match PanelEvent::parse_line(line)? {
            Some(event) => self.dispatch(event),
            None => Ok(RelayAction::Ignored),
        }
    }

    /// Act on one panel event
    pub fn dispatch(&mut self, event: PanelEvent) -> Result<RelayAction, RelayError> {
        debug!("Dispatching {:?}", event);
        match event {
            PanelEvent::Switch(index) => self.on_switch(index),
            PanelEvent::Button(index) => self.on_button(index),
            PanelEvent::Encoder { index, delta } => self.on_encoder(index, delta),
        }
    }

    fn on_switch(&mut self, index: usize) -> Result<RelayAction, RelayError> {
        let key = self
            .layout
            .switch_key(index)
            .ok_or(RelayError::OutOfRange {
                control: Control::Switch,
                index,
                len: self.layout.switch_keys.len(),
            })?;

        self.keys.press(key)?;
        if !self.layout.is_double_press(index) {
            return Ok(RelayAction::KeyPressed { key, presses: 1 });
        }

        thread::sleep(self.config.double_press_delay);
        self.keys.press(key)?;
        Ok(RelayAction::KeyPressed { key, presses: 2 })
    }

    fn on_button(&mut self, index: usize) -> Result<RelayAction, RelayError> {
        let key = self
            .layout
            .button_key(index)
            .ok_or(RelayError::OutOfRange {
                control: Control::Button,
                index,
                len: self.layout.button_keys.len(),
            })?;

        let pressed = self.keys.press(key);
        if !self.layout.is_query(index) {
            pressed?;
            return Ok(RelayAction::KeyPressed { key, presses: 1 });
        }

        // The read-back does not depend on the key press
        if let Err(e) = pressed {
            warn!("{}", e);
        }
        let value = self.query_dataref(self.layout.query_dataref)?;
        Ok(RelayAction::Queried { key, value })
    }

    fn on_encoder(&mut self, index: usize, delta: f32) -> Result<RelayAction, RelayError> {
        if self.layout.dataref(index).is_none() {
            return Err(RelayError::OutOfRange {
                control: Control::Encoder,
                index,
                len: self.layout.datarefs.len(),
            });
        }

        self.link.send_data(index, delta)?;
        Ok(RelayAction::DatarefSet {
            index,
            value: delta,
        })
    }

    /// Subscribe, take one report, unsubscribe, and echo the value to the panel
    fn query_dataref(&mut self, index: usize) -> Result<f32, RelayError> {
        // Late replies to an earlier query must not be taken as this answer
        if let Err(e) = self.link.discard_pending() {
            warn!("Failed to flush simulator replies: {}", e);
        }
        self.link.request_data(index, self.config.query_frequency)?;
        let received = self.link.receive_values(self.config.query_timeout);

        // Unsubscribe even when nothing arrived
        if let Err(e) = self.link.request_data(index, 0) {
            warn!("Failed to unsubscribe dataref {}: {}", index, e);
        }

        let values = received?;
        let value = select_value(&values, index).ok_or(LinkError::EmptyResponse)?;

        self.panel
            .write(&encode_value(value))
            .map_err(RelayError::Serial)?;
        info!("Dataref {} = {} sent to panel", index, value);
        Ok(value)
    }

    /// Panel port
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Key injector
    pub fn keys(&self) -> &K {
        &self.keys
    }

    /// Simulator link
    pub fn link(&self) -> &SimulatorLink<T> {
        &self.link
    }

    /// Tear the relay down, returning its resources
    pub fn into_parts(self) -> (P, K, T) {
        (self.panel, self.keys, self.link.into_transport())
    }
}

/// Value reported for `index`, or the first record when none matches
fn select_value(values: &[DatarefValue], index: usize) -> Option<f32> {
    values
        .iter()
        .find(|v| usize::try_from(v.index).ok() == Some(index))
        .or_else(|| values.first())
        .map(|v| v.value)
}
