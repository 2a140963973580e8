//! Static panel layout
//!
//! The hardware reports positional indices. Each index space maps into one
//! of the tables below: switches and buttons to keyboard keys bound in the
//! simulator, encoders to dataref paths.

/// X-Plane datarefs driven by the encoders, indexed by encoder number
pub const DATAREFS: [&str; 9] = [
    "sim/cockpit2/radios/actuators/hsi_obs_deg_mag_pilot",
    "sim/cockpit/autopilot/airspeed",
    "sim/cockpit2/autopilot/airspeed_dial_kts_mach",
    "sim/cockpit/autopilot/heading_mag",
    "sim/cockpit/autopilot/altitude",
    "sim/cockpit2/autopilot/vvi_dial_fpm",
    "sim/cockpit/misc/barometer_setting",
    "sim/cockpit2/radios/actuators/com1_frequency_hz_833",
    "sim/cockpit/radios/nav1_freq_hz",
];

/// Keys pressed for each toggle switch
pub const SWITCH_KEYS: [char; 8] = ['z', 'x', 'c', 'v', 'b', 'n', 'm', ','];

/// Keys pressed for each push-button
pub const BUTTON_KEYS: [char; 14] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', '-', '=', '[', ']',
];

/// Switch whose simulator binding needs two presses
pub const DOUBLE_PRESS_SWITCH: usize = 3;

/// Button that reads a dataref back to the panel
pub const QUERY_BUTTON: usize = 10;

/// Dataref read back by the query button (vertical speed dial)
pub const QUERY_DATAREF: usize = 5;

/// Index tables and special controls of one panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelLayout {
    /// Key per switch index
    pub switch_keys: Vec<char>,
    /// Key per button index
    pub button_keys: Vec<char>,
    /// Dataref path per encoder index
    pub datarefs: Vec<String>,
    /// Switch that is pressed twice
    pub double_press_switch: Option<usize>,
    /// Button that triggers a dataref read-back
    pub query_button: Option<usize>,
    /// Dataref index read by the query button
    pub query_dataref: usize,
}

impl PanelLayout {
    /// The Boeing 737 MCP wiring
    pub fn b737_mcp() -> Self {
        Self {
            switch_keys: SWITCH_KEYS.to_vec(),
            button_keys: BUTTON_KEYS.to_vec(),
            datarefs: DATAREFS.iter().map(|s| s.to_string()).collect(),
            double_press_switch: Some(DOUBLE_PRESS_SWITCH),
            query_button: Some(QUERY_BUTTON),
            query_dataref: QUERY_DATAREF,
        }
    }

    /// Key bound to a switch, if the index is wired
    pub fn switch_key(&self, index: usize) -> Option<char> {
        self.switch_keys.get(index).copied()
    }

    /// Key bound to a button, if the index is wired
    pub fn button_key(&self, index: usize) -> Option<char> {
        self.button_keys.get(index).copied()
    }

    /// Dataref path for an encoder index
    pub fn dataref(&self, index: usize) -> Option<&str> {
        self.datarefs.get(index).map(String::as_str)
    }

    /// Whether this switch needs the double press
    pub fn is_double_press(&self, index: usize) -> bool {
        self.double_press_switch == Some(index)
    }

    /// Whether this button triggers the read-back
    pub fn is_query(&self, index: usize) -> bool {
        self.query_button == Some(index)
    }
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self::b737_mcp()
    }
}
