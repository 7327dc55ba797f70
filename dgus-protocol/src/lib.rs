//! DGUS Display Wire Protocol
//!
//! This crate implements the byte-level protocol spoken by DGUS-class serial
//! touchscreens. The display exposes a 16-bit address space of variables
//! ("VPs"); the controller writes VPs to update what is shown and the display
//! uploads VPs when the user touches a control.
//!
//! # Frame Format
//!
//! ```text
//! ┌──────┬──────┬─────┬─────┬─────────┬─────────┬─────────────┐
//! │ HDR1 │ HDR2 │ LEN │ CMD │ ADDR_HI │ ADDR_LO │ PAYLOAD     │
//! │ 0x5A │ 0xA5 │ 1B  │ 1B  │ 1B      │ 1B      │ 0–249B      │
//! └──────┴──────┴─────┴─────┴─────────┴─────────┴─────────────┘
//! ```
//!
//! `LEN` counts everything after itself (`3 + payload`). There is no
//! checksum; the receiver resynchronises on the two header bytes.

#![no_std]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod value;

pub use frame::{
    Command, Frame, FrameError, FrameParser, Frames, HEADER1, HEADER2, MAX_DATAGRAM_LEN,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE,
};
pub use messages::{SystemCommand, TouchConfig, TouchLimits};
pub use value::{pow10, WireBytes, WireType};
