//! Polling loop for embassy executors
//!
//! Wraps [`DgusDisplay::poll`] in a ticker so the display can live in its
//! own task:
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn display_task(display: &'static mut DgusDisplay<'static, Uart>) -> ! {
//!     poll_forever(display, Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)).await
//! }
//! ```

use dgus_hal::{SerialRx, SerialTx};
use embassy_time::{Duration, Ticker};

use crate::driver::DgusDisplay;

/// Poll interval that keeps a 115200 baud link drained
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Poll `display` every `period`, forever
pub async fn poll_forever<T: SerialRx + SerialTx>(
    display: &mut DgusDisplay<'_, T>,
    period: Duration,
) -> ! {
    #[cfg(feature = "defmt")]
    defmt::info!("DGUS: polling every {} ms", period.as_millis());

    let mut ticker = Ticker::every(period);
    loop {
        ticker.next().await;
        display.poll();
    }
}
