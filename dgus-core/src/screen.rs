//! Screen/session control
//!
//! Switching screens is a sequence: the screen-select write, then a refresh
//! of every VP shown on the new screen. Requests are collected in a
//! single-slot mailbox and applied from the driver's poll, one sequence at
//! a time:
//!
//! - A request made while a sequence is in flight (typically from an
//!   `on_write` accessor popping up a dialog) waits until that sequence has
//!   completed.
//! - Only the most recent waiting request survives; there is no queue of
//!   pop-ups.
//! - A sequence is never partially superseded: once started it runs to the
//!   end, even if that takes several polls under transmit backpressure.

/// Display screen (picture) number
pub type ScreenId = u16;

/// VPs shown on one screen
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScreenVps {
    /// Screen number
    pub screen: ScreenId,
    /// VPs refreshed when the screen is entered and on periodic updates
    pub vps: &'static [u16],
}

/// Host-supplied screen → VP table
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenLayout<'a> {
    screens: &'a [ScreenVps],
}

impl<'a> ScreenLayout<'a> {
    /// Wrap a layout table
    pub const fn new(screens: &'a [ScreenVps]) -> Self {
        Self { screens }
    }

    /// VPs shown on `screen`; empty for screens not in the table
    pub fn vps_for(&self, screen: ScreenId) -> &'static [u16] {
        self.screens
            .iter()
            .find(|entry| entry.screen == screen)
            .map(|entry| entry.vps)
            .unwrap_or(&[])
    }
}

/// Screen request mailbox and in-flight guard
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScreenController {
    /// Screen most recently selected on the display
    current: Option<ScreenId>,
    /// Waiting request (last write wins)
    pending: Option<ScreenId>,
    /// A screen-change sequence has started but not finished
    in_flight: bool,
    /// Next VP index to refresh on the current screen
    cursor: usize,
}

impl ScreenController {
    /// Create a controller with no screen selected
    pub const fn new() -> Self {
        Self {
            current: None,
            pending: None,
            in_flight: false,
            cursor: 0,
        }
    }

    /// Forget all screen state
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Request a switch to `screen`, replacing any request not yet started
    pub fn request(&mut self, screen: ScreenId) {
        self.pending = Some(screen);
    }

    /// Waiting request, if any
    pub fn pending(&self) -> Option<ScreenId> {
        self.pending
    }

    /// Screen most recently selected
    pub fn current(&self) -> Option<ScreenId> {
        self.current
    }

    /// Check if a screen-change sequence is running
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start the sequence for the waiting request
    ///
    /// Returns `None` while another sequence is in flight or when nothing is
    /// waiting. The caller must send the screen-select command for the
    /// returned screen, refresh its VPs, then call [`Self::finish`].
    pub fn begin(&mut self) -> Option<ScreenId> {
        if self.in_flight {
            return None;
        }
        let screen = self.pending.take()?;
        self.current = Some(screen);
        self.in_flight = true;
        self.cursor = 0;
        Some(screen)
    }

    /// Mark the running sequence complete
    pub fn finish(&mut self) {
        self.in_flight = false;
        self.cursor = 0;
    }

    /// Next VP index to refresh
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Move past a refreshed VP
    pub fn advance(&mut self) {
        self.cursor += 1;
    }

    /// Restart the refresh at the first VP
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

/// Context handed to every `on_write` accessor
///
/// Gives accessors running inside the driver's poll the one re-entrant
/// operation they are allowed: asking for another screen.
pub struct InputContext<'a> {
    screens: &'a mut ScreenController,
}

impl<'a> InputContext<'a> {
    /// Wrap the driver's screen controller
    pub fn new(screens: &'a mut ScreenController) -> Self {
        Self { screens }
    }

    /// Request a screen; applied after the current sequence completes
    pub fn request_screen(&mut self, screen: ScreenId) {
        self.screens.request(screen);
    }

    /// Screen most recently selected
    pub fn current_screen(&self) -> Option<ScreenId> {
        self.screens.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static LAYOUT: [ScreenVps; 2] = [
        ScreenVps {
            screen: 1,
            vps: &[0x1000, 0x1002],
        },
        ScreenVps {
            screen: 7,
            vps: &[0x2000],
        },
    ];

    #[test]
    fn test_layout_lookup() {
        let layout = ScreenLayout::new(&LAYOUT);
        assert_eq!(layout.vps_for(1), &[0x1000, 0x1002]);
        assert_eq!(layout.vps_for(7), &[0x2000]);
        assert!(layout.vps_for(3).is_empty());
    }

    #[test]
    fn test_last_request_wins() {
        let mut screens = ScreenController::new();
        screens.request(3);
        screens.request(5);
        assert_eq!(screens.begin(), Some(5));
        assert_eq!(screens.current(), Some(5));
        screens.finish();
        assert_eq!(screens.begin(), None);
    }

    #[test]
    fn test_request_deferred_while_in_flight() {
        let mut screens = ScreenController::new();
        screens.request(1);
        assert_eq!(screens.begin(), Some(1));

        // Requests arriving mid-sequence are held, newest only
        screens.request(2);
        screens.request(4);
        assert_eq!(screens.begin(), None);
        assert_eq!(screens.current(), Some(1));

        screens.finish();
        assert_eq!(screens.begin(), Some(4));
        assert_eq!(screens.pending(), None);
    }

    #[test]
    fn test_cursor() {
        let mut screens = ScreenController::new();
        screens.request(1);
        screens.begin();
        screens.advance();
        screens.advance();
        assert_eq!(screens.cursor(), 2);
        screens.rewind();
        assert_eq!(screens.cursor(), 0);
        screens.advance();
        screens.finish();
        assert_eq!(screens.cursor(), 0);
        assert!(!screens.is_in_flight());
    }

    #[test]
    fn test_input_context_requests_screen() {
        let mut screens = ScreenController::new();
        screens.request(9);
        screens.begin();

        let mut ctx = InputContext::new(&mut screens);
        assert_eq!(ctx.current_screen(), Some(9));
        ctx.request_screen(12);

        assert_eq!(screens.pending(), Some(12));
    }
}
