//! Generic accessors bridging firmware getters/setters to VPs
//!
//! Many VPs differ only in which quantity they show (which axis, which
//! heater) and how wide they are on the wire. Instead of one handler per
//! VP, a single getter or setter is registered together with a selector and
//! a [`WireType`]; both are fixed when the table is built.
//!
//! ```ignore
//! fn probe_offset(axis: Axis) -> f32 { /* ... */ }
//!
//! static Z_OFFSET: Mirror<Axis> = Mirror::new(probe_offset, Axis::Z, WireType::Fixed { decimals: 2 });
//! static VARS: [VpVariable; 1] = [VpVariable::new(0x1024, 2).with_output(&Z_OFFSET)];
//! ```

use dgus_protocol::WireType;

use super::variable::{DisplayInput, DisplayOutput, VpData, VpVariable};
use crate::screen::InputContext;

/// Firmware getter → display
#[derive(Debug, Clone, Copy)]
pub struct Mirror<T> {
    getter: fn(T) -> f32,
    selector: T,
    wire: WireType,
}

impl<T> Mirror<T> {
    /// Send `getter(selector)` encoded as `wire`
    pub const fn new(getter: fn(T) -> f32, selector: T, wire: WireType) -> Self {
        Self {
            getter,
            selector,
            wire,
        }
    }
}

impl<T: Copy + Sync> DisplayOutput for Mirror<T> {
    fn on_poll(&self, _var: &VpVariable, out: &mut VpData) {
        let value = (self.getter)(self.selector);
        // At most four bytes, well under MAX_VP_SIZE
        let _ = out.extend_from_slice(&self.wire.encode(value));
    }
}

/// Display → firmware setter
#[derive(Debug, Clone, Copy)]
pub struct Control<T> {
    setter: fn(f32, T),
    selector: T,
    wire: WireType,
}

impl<T> Control<T> {
    /// Decode the upload as `wire` and pass it to `setter(value, selector)`
    pub const fn new(setter: fn(f32, T), selector: T, wire: WireType) -> Self {
        Self {
            setter,
            selector,
            wire,
        }
    }
}

impl<T: Copy + Sync> DisplayInput for Control<T> {
    fn on_write(&self, _var: &VpVariable, data: &[u8], _ctx: &mut InputContext<'_>) {
        // Short uploads are dropped rather than guessed at
        if let Some(value) = self.wire.decode(data) {
            (self.setter)(value, self.selector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::ScreenController;
    use core::sync::atomic::{AtomicI32, AtomicU8, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Heater {
        Bed,
        Hotend,
    }

    fn target_temp(heater: Heater) -> f32 {
        match heater {
            Heater::Bed => 60.0,
            Heater::Hotend => 215.0,
        }
    }

    static LAST_VALUE: AtomicI32 = AtomicI32::new(0);
    static LAST_HEATER: AtomicU8 = AtomicU8::new(0xFF);

    fn set_target(value: f32, heater: Heater) {
        LAST_VALUE.store(value as i32, Ordering::SeqCst);
        LAST_HEATER.store(heater as u8, Ordering::SeqCst);
    }

    #[test]
    fn test_mirror_uses_selector_and_width() {
        let var = VpVariable::new(0x1000, 2);
        let mut out = VpData::new();
        Mirror::new(target_temp, Heater::Hotend, WireType::U16).on_poll(&var, &mut out);
        assert_eq!(&out[..], &215u16.to_be_bytes());

        let mut out = VpData::new();
        Mirror::new(target_temp, Heater::Bed, WireType::Fixed { decimals: 1 }).on_poll(&var, &mut out);
        assert_eq!(&out[..], &600i16.to_be_bytes());
    }

    #[test]
    fn test_control_decodes_and_calls_setter() {
        let var = VpVariable::new(0x1002, 2);
        let mut screens = ScreenController::new();
        let mut ctx = InputContext::new(&mut screens);

        let control = Control::new(set_target, Heater::Bed, WireType::U16);
        control.on_write(&var, &[0x00, 0x46], &mut ctx);
        assert_eq!(LAST_VALUE.load(Ordering::SeqCst), 70);
        assert_eq!(LAST_HEATER.load(Ordering::SeqCst), Heater::Bed as u8);

        // Too short: setter not called
        let control = Control::new(set_target, Heater::Hotend, WireType::U16);
        control.on_write(&var, &[0x01], &mut ctx);
        assert_eq!(LAST_HEATER.load(Ordering::SeqCst), Heater::Bed as u8);
    }
}
