//! Driver error type

use dgus_protocol::FrameError;

/// Errors returned by driver operations
///
/// None of these are fatal: the display is best-effort relative to the
/// rest of the firmware, and every operation may simply be retried later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DgusError {
    /// Transmit queue cannot hold the whole frame; nothing was queued
    TxBufferFull,
    /// No descriptor registered for this VP
    UnknownVariable(u16),
    /// Descriptor has no `on_poll` accessor
    NotReadable(u16),
    /// `on_poll` produced a value wider or narrower than the VP
    SizeMismatch(u16),
    /// Frame could not be built
    Frame(FrameError),
}

impl From<FrameError> for DgusError {
    fn from(e: FrameError) -> Self {
        DgusError::Frame(e)
    }
}
