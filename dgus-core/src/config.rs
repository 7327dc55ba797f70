//! Driver configuration

use dgus_protocol::TouchLimits;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of received bytes processed per poll
pub const DEFAULT_RX_BUDGET: usize = 512;

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriverConfig {
    /// Padding for text VPs shorter than their declared width
    pub fill_char: u8,
    /// Send the display reset command from `init()`
    pub reset_on_init: bool,
    /// Upper bound on bytes drained from the transport in one `poll()`
    ///
    /// Keeps a chatty display from starving the host's main loop.
    pub rx_budget: usize,
    /// Bounds applied by `set_touch_configuration()`
    pub touch_limits: TouchLimits,
}

impl DriverConfig {
    /// Create the default configuration
    pub const fn new() -> Self {
        Self {
            fill_char: b' ',
            reset_on_init: true,
            rx_budget: DEFAULT_RX_BUDGET,
            touch_limits: TouchLimits::new(),
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}
