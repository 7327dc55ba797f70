//! Dispatch engine
//!
//! Inbound: a complete frame from the display is resolved through the
//! registry and handed to the VP's `on_write` accessor.
//!
//! Outbound: a VP's `on_poll` accessor is asked for its current value and
//! the result is wrapped in a write frame for the codec.

use dgus_protocol::{Command, Frame};

use crate::error::DgusError;
use crate::registry::{VpData, VpRegistry};
use crate::screen::InputContext;

/// What happened to an inbound frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchOutcome {
    /// Display acknowledged one of our writes
    Acknowledged,
    /// Data delivered to the VP's `on_write` accessor
    Delivered(u16),
    /// VP not in the registry
    UnknownVariable(u16),
    /// VP registered without an `on_write` accessor
    ReadOnly(u16),
    /// Read frame carrying no data
    Ignored(u16),
}

/// Extract the VP data carried by a display-originated frame
///
/// Read frames (auto-upload, or the answer to a read request) carry a word
/// count followed by the data; the count is trusted only as far as bytes
/// actually arrived. Write frames carry the data directly.
fn uploaded_data(frame: &Frame) -> Option<&[u8]> {
    match frame.command {
        Command::Write => Some(frame.payload.as_slice()),
        Command::Read => {
            let (&words, data) = frame.payload.split_first()?;
            let len = data.len().min(words as usize * 2);
            Some(&data[..len])
        }
    }
}

/// Deliver an inbound frame to its accessor
pub fn dispatch(
    registry: &VpRegistry<'_>,
    frame: &Frame,
    ctx: &mut InputContext<'_>,
) -> DispatchOutcome {
    if frame.is_ack() {
        return DispatchOutcome::Acknowledged;
    }

    let Some(data) = uploaded_data(frame) else {
        return DispatchOutcome::Ignored(frame.address);
    };

    let Some(var) = registry.find(frame.address) else {
        return DispatchOutcome::UnknownVariable(frame.address);
    };

    match var.on_write {
        Some(handler) => {
            handler.on_write(var, data, ctx);
            DispatchOutcome::Delivered(var.vp)
        }
        None => DispatchOutcome::ReadOnly(var.vp),
    }
}

/// Build the write frame carrying the current value of `vp`
///
/// Text VPs are padded with `fill` (or truncated) to their declared size,
/// and anything from a NUL terminator onwards becomes `fill` too. Numeric
/// VPs must come out exactly as wide as declared; anything else would spill
/// into the neighbouring display slot.
pub fn render(registry: &VpRegistry<'_>, vp: u16, fill: u8) -> Result<Frame, DgusError> {
    let var = registry.find(vp).ok_or(DgusError::UnknownVariable(vp))?;
    let handler = var.on_poll.ok_or(DgusError::NotReadable(vp))?;

    let mut data = VpData::new();
    handler.on_poll(var, &mut data);

    let size = usize::from(var.size);
    if var.is_text {
        if let Some(end) = data.iter().position(|&b| b == 0) {
            data[end..].fill(fill);
        }
        // Registry guarantees size <= MAX_VP_SIZE
        let _ = data.resize(size, fill);
    } else if data.len() != size {
        return Err(DgusError::SizeMismatch(vp));
    }

    Ok(Frame::write(vp, &data)?)
}
