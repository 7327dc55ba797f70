//! Adapter for `embedded-io` byte streams
//!
//! Lets any UART exposing the blocking `embedded-io` traits together with
//! their readiness companions (`ReadReady`, `WriteReady`) act as a
//! non-blocking display transport. Reads and writes are only issued when the
//! peripheral reports it can complete them without waiting.

use embedded_io::{Read, ReadReady, Write, WriteReady};

use crate::serial::{SerialRx, SerialTx};

/// Non-blocking wrapper around an `embedded-io` serial port
pub struct IoSerial<T> {
    inner: T,
    /// Bytes the peripheral's transmit FIFO/ring buffer can hold
    tx_capacity: usize,
}

impl<T> IoSerial<T> {
    /// Wrap a serial port whose transmit buffer holds `tx_capacity` bytes
    pub fn new(inner: T, tx_capacity: usize) -> Self {
        Self {
            inner,
            tx_capacity,
        }
    }

    /// Get a mutable reference to the wrapped port
    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Release the wrapped port
    pub fn release(self) -> T {
        self.inner
    }
}

impl<T: Read + ReadReady> SerialRx for IoSerial<T> {
    type Error = T::Error;

    fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.inner.read_ready()? {
            return Ok(0);
        }
        self.inner.read(buf)
    }
}

impl<T: Write + WriteReady> SerialTx for IoSerial<T> {
    type Error = T::Error;

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        if data.is_empty() {
            return Ok(0);
        }
        if !self.inner.write_ready()? {
            return Ok(0);
        }
        let chunk = data.len().min(self.tx_capacity);
        self.inner.write(&data[..chunk])
    }

    /// Upper bound only; `embedded-io` cannot report the exact free space,
    /// so [`SerialTx::write`] checks readiness before every write.
    fn free_tx_space(&self) -> usize {
        self.tx_capacity
    }
}
