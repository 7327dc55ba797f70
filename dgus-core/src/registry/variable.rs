//! VP descriptors and accessor traits

use core::fmt;

use heapless::Vec;

use crate::screen::InputContext;

/// Largest VP the registry accepts, in bytes
pub const MAX_VP_SIZE: usize = 64;

/// Raw VP contents produced by an [`DisplayOutput`] accessor
pub type VpData = Vec<u8, MAX_VP_SIZE>;

/// Accessor invoked when the display uploads a new value for a VP
///
/// This is where display input turns into firmware state. Implementations
/// convert the raw wire bytes themselves and are responsible for any range
/// checking; they must not panic on short or malformed data.
///
/// Plain functions and non-capturing closures with the matching signature
/// implement this trait, so `&my_handler` can go straight into a table.
pub trait DisplayInput: Sync {
    /// Handle `data` written by the display to `var`
    fn on_write(&self, var: &VpVariable, data: &[u8], ctx: &mut InputContext<'_>);
}

/// Accessor invoked to compute the value pushed to the display for a VP
pub trait DisplayOutput: Sync {
    /// Append the current value of `var` to `out`
    fn on_poll(&self, var: &VpVariable, out: &mut VpData);
}

impl<F> DisplayInput for F
where
    F: Fn(&VpVariable, &[u8], &mut InputContext<'_>) + Sync,
{
    fn on_write(&self, var: &VpVariable, data: &[u8], ctx: &mut InputContext<'_>) {
        self(var, data, ctx)
    }
}

impl<F> DisplayOutput for F
where
    F: Fn(&VpVariable, &mut VpData) + Sync,
{
    fn on_poll(&self, var: &VpVariable, out: &mut VpData) {
        self(var, out)
    }
}

/// Registry entry binding a VP address to its wire shape and accessors
#[derive(Clone, Copy)]
pub struct VpVariable {
    /// Wire address
    pub vp: u16,
    /// Bytes on the wire
    pub size: u8,
    /// Payload is a padded character string rather than a number
    pub is_text: bool,
    /// Display → firmware accessor
    pub on_write: Option<&'static dyn DisplayInput>,
    /// Firmware → display accessor
    pub on_poll: Option<&'static dyn DisplayOutput>,
}

impl VpVariable {
    /// Numeric VP without accessors
    pub const fn new(vp: u16, size: u8) -> Self {
        Self {
            vp,
            size,
            is_text: false,
            on_write: None,
            on_poll: None,
        }
    }

    /// Text VP of `size` characters without accessors
    pub const fn text(vp: u16, size: u8) -> Self {
        Self {
            is_text: true,
            ..Self::new(vp, size)
        }
    }

    /// Attach the display → firmware accessor
    pub const fn with_input(self, handler: &'static dyn DisplayInput) -> Self {
        Self {
            on_write: Some(handler),
            ..self
        }
    }

    /// Attach the firmware → display accessor
    pub const fn with_output(self, handler: &'static dyn DisplayOutput) -> Self {
        Self {
            on_poll: Some(handler),
            ..self
        }
    }
}

impl Default for VpVariable {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl fmt::Debug for VpVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VpVariable")
            .field("vp", &self.vp)
            .field("size", &self.size)
            .field("is_text", &self.is_text)
            .field("on_write", &self.on_write.is_some())
            .field("on_poll", &self.on_poll.is_some())
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for VpVariable {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "VpVariable[{=u16:#06x}, {} bytes, text={}, in={}, out={}]",
            self.vp,
            self.size,
            self.is_text,
            self.on_write.is_some(),
            self.on_poll.is_some()
        );
    }
}
