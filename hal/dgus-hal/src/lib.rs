//! DGUS display transport abstraction
//!
//! The display driver never opens or configures the serial port itself. The
//! host brings the UART up and hands the driver something implementing the
//! traits in this crate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  dgus-core (driver, registry, screens)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dgus-hal (this crate - traits)         │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  IoSerial<T>  │       │ host-specific │
//! │ (embedded-io) │       │   UART glue   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`serial::SerialRx`] - non-blocking drain of received bytes
//! - [`serial::SerialTx`] - non-blocking, possibly partial, transmit

#![no_std]
#![deny(unsafe_code)]

pub mod serial;

#[cfg(feature = "embedded-io")]
pub mod io;

pub use serial::{Serial, SerialRx, SerialTx};

#[cfg(feature = "embedded-io")]
pub use io::IoSerial;
