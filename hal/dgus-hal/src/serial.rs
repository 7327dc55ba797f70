//! Serial transport abstractions
//!
//! Both directions are non-blocking: the driver is polled from the host's
//! main loop and must never stall it waiting for the wire.

/// Serial receiver
pub trait SerialRx {
    /// Error type for receive operations
    type Error;

    /// Copy bytes that have already arrived into `buf`
    ///
    /// Returns the number of bytes copied. `Ok(0)` means nothing is pending;
    /// implementations must not wait for data.
    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Serial transmitter
pub trait SerialTx {
    /// Error type for transmit operations
    type Error;

    /// Queue as much of `data` as the hardware currently accepts
    ///
    /// Returns the number of bytes taken, which may be less than
    /// `data.len()` (including zero) under backpressure.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Number of bytes the transmitter can take right now without blocking
    fn free_tx_space(&self) -> usize;
}

/// Combined serial interface
///
/// For transports that provide both directions on a single peripheral.
pub trait Serial: SerialTx + SerialRx {}

// Blanket implementation
impl<T: SerialTx + SerialRx> Serial for T {}
