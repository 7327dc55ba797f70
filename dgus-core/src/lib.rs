//! Controller-side driver for DGUS serial touchscreens
//!
//! This crate contains everything between the raw serial port and the
//! firmware's own state:
//!
//! - Variable registry mapping VP addresses to typed accessors
//! - Dispatch of display uploads to firmware setters
//! - Rendering of firmware getters into outgoing writes
//! - Screen switching with a single-slot, last-write-wins request mailbox
//! - The polled, non-blocking [`DgusDisplay`] driver tying it together
//!
//! # Architecture
//!
//! ```text
//!  host main loop ──poll()──► DgusDisplay ──► FrameParser ──► dispatch ──► on_write
//!                                  │                                          │
//!                                  │◄──────── InputContext::request_screen ◄──┘
//!                                  ▼
//!                         ScreenController ──► render ◄── on_poll
//!                                  │
//!                                  ▼
//!                              tx queue ──► SerialTx
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod registry;
pub mod screen;

#[cfg(feature = "embassy")]
pub mod runner;

#[cfg(feature = "embassy")]
pub use runner::poll_forever;

pub use config::DriverConfig;
pub use dispatch::DispatchOutcome;
pub use driver::{DgusDisplay, TX_BUFFER_SIZE};
pub use error::DgusError;
pub use registry::{
    Control, DisplayInput, DisplayOutput, Mirror, RegistryError, VpData, VpRegistry, VpVariable,
    MAX_VP_SIZE,
};
pub use screen::{InputContext, ScreenController, ScreenId, ScreenLayout, ScreenVps};
