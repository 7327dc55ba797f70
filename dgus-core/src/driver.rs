//! DGUS display driver
//!
//! [`DgusDisplay`] owns the serial transport, the receive state machine and
//! a transmit queue. The host calls [`DgusDisplay::poll`] from its main
//! loop; every other operation only queues frames and returns.
//!
//! # Backpressure
//!
//! Frames are queued whole or not at all. When the queue cannot hold a
//! frame the write fails with [`DgusError::TxBufferFull`] and nothing is
//! sent, so the display never sees half a datagram. Callers planning a
//! burst of writes can check [`DgusDisplay::free_tx_buffer`] first. Queued
//! bytes move to the transport as fast as it accepts them, possibly across
//! several polls. A frame the transport has started on is always finished,
//! even across [`DgusDisplay::reset`].

use heapless::{Deque, Vec};

use dgus_hal::{SerialRx, SerialTx};
use dgus_protocol::{
    Frame, FrameError, FrameParser, SystemCommand, TouchConfig, WireType, MAX_PAYLOAD_SIZE,
};

use crate::config::DriverConfig;
use crate::dispatch::{self, DispatchOutcome};
use crate::error::DgusError;
use crate::registry::VpRegistry;
use crate::screen::{InputContext, ScreenController, ScreenId, ScreenLayout};

/// Transmit queue size in bytes
pub const TX_BUFFER_SIZE: usize = 512;

/// Bytes read from the transport per call
const RX_CHUNK_SIZE: usize = 32;

/// Encoded length of the screen-select command
const SHOW_SCREEN_FRAME_LEN: usize = 10;

/// Driver for one DGUS display on one serial port
pub struct DgusDisplay<'a, T> {
    transport: T,
    registry: VpRegistry<'a>,
    layout: ScreenLayout<'a>,
    config: DriverConfig,
    parser: FrameParser,
    tx: Deque<u8, TX_BUFFER_SIZE>,
    /// Bytes of the frame at the head of `tx` still owed to the transport;
    /// zero when the head is a frame boundary
    tx_frame_remaining: usize,
    screens: ScreenController,
    initialized: bool,
}

impl<'a, T: SerialRx + SerialTx> DgusDisplay<'a, T> {
    /// Create a driver over an already opened transport
    ///
    /// Nothing is sent until [`Self::init`] is called.
    pub fn new(
        transport: T,
        registry: VpRegistry<'a>,
        layout: ScreenLayout<'a>,
        config: DriverConfig,
    ) -> Self {
        Self {
            transport,
            registry,
            layout,
            config,
            parser: FrameParser::new(),
            tx: Deque::new(),
            tx_frame_remaining: 0,
            screens: ScreenController::new(),
            initialized: false,
        }
    }

    /// Start talking to the display
    ///
    /// Clears all driver state and, unless disabled in [`DriverConfig`],
    /// reboots the display. The driver counts as initialized once the
    /// display sends its first datagram; until then [`Self::is_initialized`]
    /// stays false and the host may call `init()` again at its own pace.
    pub fn init(&mut self) -> Result<(), DgusError> {
        if self.config.reset_on_init {
            self.reset()
        } else {
            self.clear_state();
            Ok(())
        }
    }

    /// Reboot the display and reinitialise the driver
    pub fn reset(&mut self) -> Result<(), DgusError> {
        self.clear_state();
        self.send_command(SystemCommand::Reset)
    }

    fn clear_state(&mut self) {
        self.parser.reset();
        self.discard_unsent();
        self.screens.reset();
        self.initialized = false;
    }

    /// Check if the display has answered since the last init/reset
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Free bytes in the transmit queue
    pub fn free_tx_buffer(&self) -> usize {
        self.tx.capacity() - self.tx.len()
    }

    /// Registry this driver dispatches through
    pub fn registry(&self) -> &VpRegistry<'a> {
        &self.registry
    }

    /// Screen most recently selected
    pub fn current_screen(&self) -> Option<ScreenId> {
        self.screens.current()
    }

    /// Get a reference to the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn release(self) -> T {
        self.transport
    }

    /// Periodic work: receive and dispatch, apply screen requests, transmit
    pub fn poll(&mut self) {
        self.receive();
        self.service_screen_requests();
        self.flush();
    }

    /// Drain pending input through the parser and dispatch complete frames
    fn receive(&mut self) {
        let mut buf = [0u8; RX_CHUNK_SIZE];
        let mut budget = self.config.rx_budget;

        while budget > 0 {
            let want = budget.min(RX_CHUNK_SIZE);
            let n = match self.transport.read_available(&mut buf[..want]) {
                Ok(n) => n.min(want),
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("DGUS: serial read failed");
                    break;
                }
            };
            if n == 0 {
                break;
            }
            budget -= n;

            for &byte in &buf[..n] {
                match self.parser.feed(byte) {
                    Ok(Some(datagram)) => self.handle_datagram(&datagram),
                    Ok(None) => {}
                    Err(_e) => {
                        #[cfg(feature = "defmt")]
                        defmt::trace!("DGUS: datagram dropped: {:?}", _e);
                    }
                }
            }
        }
    }

    fn handle_datagram(&mut self, datagram: &[u8]) {
        if !self.initialized {
            #[cfg(feature = "defmt")]
            defmt::info!("DGUS: display answered");
            self.initialized = true;
        }

        let frame = match Frame::from_datagram(datagram) {
            Ok(frame) => frame,
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::trace!("DGUS: bad datagram: {:?}", _e);
                return;
            }
        };

        let mut ctx = InputContext::new(&mut self.screens);
        match dispatch::dispatch(&self.registry, &frame, &mut ctx) {
            DispatchOutcome::UnknownVariable(_vp) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("DGUS: no VP registered at {=u16:#x}", _vp);
            }
            _outcome => {
                #[cfg(feature = "defmt")]
                defmt::trace!("DGUS: {:?}", _outcome);
            }
        }
    }

    /// Push queued bytes into the transport
    ///
    /// Returns the number of bytes the transport accepted. Whatever it did
    /// not take stays queued for the next call.
    pub fn flush(&mut self) -> usize {
        let mut total = 0;

        while !self.tx.is_empty() {
            let room = self.transport.free_tx_space();
            if room == 0 {
                break;
            }
            let (front, _) = self.tx.as_slices();
            let chunk = &front[..front.len().min(room)];
            let written = match self.transport.write(chunk) {
                Ok(n) => n.min(chunk.len()),
                Err(_) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("DGUS: serial write failed");
                    break;
                }
            };
            if written == 0 {
                break;
            }
            self.consume(written);
            total += written;
        }

        total
    }

    /// Drop `count` transmitted bytes from the head of the queue
    fn consume(&mut self, count: usize) {
        for _ in 0..count {
            if self.tx_frame_remaining == 0 {
                self.tx_frame_remaining = self.head_frame_len();
            }
            self.tx_frame_remaining = self.tx_frame_remaining.saturating_sub(1);
            self.tx.pop_front();
        }
    }

    /// Encoded length of the frame starting at the head of the queue
    fn head_frame_len(&self) -> usize {
        // Queue holds whole frames: HDR1 HDR2 LEN, then LEN bytes
        self.tx.iter().nth(2).map_or(1, |&len| usize::from(len) + 3)
    }

    /// Drop queued frames the transport has not started on
    ///
    /// The tail of a partly transmitted frame is kept so the display's
    /// parser stays in step with the next frame.
    fn discard_unsent(&mut self) {
        while self.tx.len() > self.tx_frame_remaining {
            self.tx.pop_back();
        }
        if self.tx.is_empty() {
            self.tx_frame_remaining = 0;
        }
    }

    /// Queue a complete frame, all or nothing
    fn send(&mut self, frame: &Frame) -> Result<(), DgusError> {
        let bytes = frame.encode_to_vec()?;
        if bytes.len() > self.free_tx_buffer() {
            #[cfg(feature = "defmt")]
            defmt::debug!(
                "DGUS: tx queue full, {} bytes for {=u16:#x} not sent",
                bytes.len(),
                frame.address
            );
            return Err(DgusError::TxBufferFull);
        }
        for byte in bytes {
            // Space checked above
            let _ = self.tx.push_back(byte);
        }
        self.flush();
        Ok(())
    }

    fn send_command(&mut self, command: SystemCommand) -> Result<(), DgusError> {
        self.send(&command.to_frame()?)
    }

    /// Write raw bytes to a VP
    ///
    /// For text (`is_text`), `values` is the full declared width of the VP;
    /// everything from the first NUL byte onwards is replaced by `fill`.
    pub fn write_variable(
        &mut self,
        vp: u16,
        values: &[u8],
        is_text: bool,
        fill: u8,
    ) -> Result<(), DgusError> {
        let mut payload: Vec<u8, MAX_PAYLOAD_SIZE> =
            Vec::from_slice(values).map_err(|_| FrameError::PayloadTooLarge)?;
        if is_text {
            if let Some(end) = payload.iter().position(|&b| b == 0) {
                payload[end..].fill(fill);
            }
        }
        self.send(&Frame::write(vp, &payload)?)
    }

    /// Write a string to a text VP `width` characters wide
    ///
    /// Shorter strings are padded with the configured fill character,
    /// longer ones truncated.
    pub fn write_text(&mut self, vp: u16, text: &str, width: usize) -> Result<(), DgusError> {
        if width > MAX_PAYLOAD_SIZE {
            return Err(DgusError::Frame(FrameError::PayloadTooLarge));
        }
        let bytes = text.as_bytes();
        let mut payload: Vec<u8, MAX_PAYLOAD_SIZE> = Vec::new();
        // Both bounded by width <= MAX_PAYLOAD_SIZE
        let _ = payload.extend_from_slice(&bytes[..bytes.len().min(width)]);
        let _ = payload.resize(width, self.config.fill_char);
        self.send(&Frame::write(vp, &payload)?)
    }

    /// Write an unsigned byte
    pub fn write_u8(&mut self, vp: u16, value: u8) -> Result<(), DgusError> {
        self.write_variable(vp, &[value], false, 0)
    }

    /// Write a signed byte
    pub fn write_i8(&mut self, vp: u16, value: i8) -> Result<(), DgusError> {
        self.write_variable(vp, &value.to_be_bytes(), false, 0)
    }

    /// Write an unsigned 16-bit word
    pub fn write_u16(&mut self, vp: u16, value: u16) -> Result<(), DgusError> {
        self.write_variable(vp, &value.to_be_bytes(), false, 0)
    }

    /// Write a signed 16-bit word
    pub fn write_i16(&mut self, vp: u16, value: i16) -> Result<(), DgusError> {
        self.write_variable(vp, &value.to_be_bytes(), false, 0)
    }

    /// Write a signed 32-bit double word
    pub fn write_i32(&mut self, vp: u16, value: i32) -> Result<(), DgusError> {
        self.write_variable(vp, &value.to_be_bytes(), false, 0)
    }

    /// Write an IEEE-754 float
    pub fn write_f32(&mut self, vp: u16, value: f32) -> Result<(), DgusError> {
        self.write_value(vp, value, WireType::Float)
    }

    /// Write `value * 10^decimals` as a signed 16-bit word
    pub fn write_fixed(&mut self, vp: u16, value: f32, decimals: u8) -> Result<(), DgusError> {
        self.write_value(vp, value, WireType::Fixed { decimals })
    }

    /// Write a value using an explicit wire representation
    pub fn write_value(&mut self, vp: u16, value: f32, wire: WireType) -> Result<(), DgusError> {
        self.write_variable(vp, &wire.encode(value), false, 0)
    }

    /// Change the colour of the control whose description pointer is `sp`
    pub fn set_variable_display_color(&mut self, sp: u16, color: u16) -> Result<(), DgusError> {
        self.send_command(SystemCommand::SetColor { sp, color })
    }

    /// Ask the display for the current value of a VP
    ///
    /// The answer arrives later through [`Self::poll`] and is dispatched to
    /// the VP's `on_write` accessor.
    pub fn read_variable(&mut self, vp: u16) -> Result<(), DgusError> {
        self.send(&Frame::read(vp, 1))
    }

    /// Configure touch sound, standby and backlight in one write
    pub fn set_touch_configuration(&mut self, config: &TouchConfig) -> Result<(), DgusError> {
        self.send_command(SystemCommand::Touch {
            config: *config,
            limits: self.config.touch_limits,
        })
    }

    /// Request a switch to `screen`
    ///
    /// Applied by the next [`Self::poll`]. A later request made before then
    /// replaces this one.
    pub fn request_screen(&mut self, screen: ScreenId) {
        self.screens.request(screen);
    }

    /// Send the current value of one VP
    pub fn refresh_vp(&mut self, vp: u16) -> Result<(), DgusError> {
        let frame = dispatch::render(&self.registry, vp, self.config.fill_char)?;
        self.send(&frame)
    }

    /// Refresh the VPs of the current screen
    ///
    /// Returns true once every VP has been queued. Returns false if the
    /// transmit queue filled up; the next call resumes where this one
    /// stopped.
    pub fn update_screen_vars(&mut self) -> bool {
        if self.screens.is_in_flight() {
            self.service_screen_requests();
            return !self.screens.is_in_flight();
        }
        self.refresh_screen_vps()
    }

    /// Run screen-change sequences until done or blocked on the tx queue
    fn service_screen_requests(&mut self) {
        loop {
            if self.screens.is_in_flight() {
                if !self.refresh_screen_vps() {
                    return;
                }
                self.screens.finish();
            }

            if self.screens.pending().is_none() {
                return;
            }
            self.flush();
            if self.free_tx_buffer() < SHOW_SCREEN_FRAME_LEN {
                return;
            }
            let Some(screen) = self.screens.begin() else {
                return;
            };

            #[cfg(feature = "defmt")]
            defmt::debug!("DGUS: switching to screen {}", screen);
            if let Err(_e) = self.send_command(SystemCommand::ShowScreen(screen)) {
                #[cfg(feature = "defmt")]
                defmt::warn!("DGUS: screen select not sent: {:?}", _e);
            }
        }
    }

    /// Queue the current screen's VPs starting at the controller's cursor
    fn refresh_screen_vps(&mut self) -> bool {
        let Some(screen) = self.screens.current() else {
            return true;
        };
        let vps = self.layout.vps_for(screen);

        while let Some(&vp) = vps.get(self.screens.cursor()) {
            match dispatch::render(&self.registry, vp, self.config.fill_char) {
                Ok(frame) => {
                    if frame.encoded_len() > self.free_tx_buffer() {
                        self.flush();
                    }
                    if self.send(&frame).is_err() {
                        return false;
                    }
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("DGUS: skipping {=u16:#x}: {:?}", vp, _e);
                }
            }
            self.screens.advance();
        }

        self.screens.rewind();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{VpData, VpVariable};
    use crate::screen::ScreenVps;
    use core::convert::Infallible;

    /// Loopback-free transport with a bounded sink
    struct Sink {
        rx: &'static [u8],
        sent: Vec<u8, 1024>,
        room: usize,
    }

    impl Sink {
        fn new(rx: &'static [u8]) -> Self {
            Self {
                rx,
                sent: Vec::new(),
                room: usize::MAX,
            }
        }
    }

    impl SerialRx for Sink {
        type Error = Infallible;

        fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let n = buf.len().min(self.rx.len());
            buf[..n].copy_from_slice(&self.rx[..n]);
            self.rx = &self.rx[n..];
            Ok(n)
        }
    }

    impl SerialTx for Sink {
        type Error = Infallible;

        fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
            let n = data.len().min(self.room).min(self.sent.capacity() - self.sent.len());
            let _ = self.sent.extend_from_slice(&data[..n]);
            self.room -= n;
            Ok(n)
        }

        fn free_tx_space(&self) -> usize {
            self.room
        }
    }

    fn bed_temp(_var: &VpVariable, out: &mut VpData) {
        let _ = out.extend_from_slice(&60u16.to_be_bytes());
    }

    static VARS: [VpVariable; 1] = [VpVariable::new(0x1000, 2).with_output(&bed_temp)];
    static LAYOUT: [ScreenVps; 1] = [ScreenVps {
        screen: 3,
        vps: &[0x1000],
    }];

    fn display(rx: &'static [u8]) -> DgusDisplay<'static, Sink> {
        DgusDisplay::new(
            Sink::new(rx),
            VpRegistry::new(&VARS).unwrap(),
            ScreenLayout::new(&LAYOUT),
            DriverConfig::default(),
        )
    }

    #[test]
    fn test_write_u16_bytes() {
        let mut display = display(&[]);
        display.write_u16(0x1000, 1234).unwrap();
        assert_eq!(
            &display.transport().sent[..],
            &[0x5A, 0xA5, 0x05, 0x82, 0x10, 0x00, 0x04, 0xD2]
        );
    }

    #[test]
    fn test_read_variable_bytes() {
        let mut display = display(&[]);
        display.read_variable(0x1000).unwrap();
        assert_eq!(
            &display.transport().sent[..],
            &[0x5A, 0xA5, 0x04, 0x83, 0x10, 0x00, 0x01]
        );
    }

    #[test]
    fn test_write_variable_text_fill() {
        let mut display = display(&[]);
        display
            .write_variable(0x2000, b"ab\0zz", true, b'-')
            .unwrap();
        assert_eq!(&display.transport().sent[6..], b"ab---");
    }

    #[test]
    fn test_write_text_pads_and_truncates() {
        let mut display = display(&[]);
        display.write_text(0x2000, "Hi", 4).unwrap();
        display.write_text(0x2100, "Printing", 3).unwrap();
        let sent = &display.transport().sent;
        assert_eq!(&sent[6..10], b"Hi  ");
        assert_eq!(sent[12], 0x06);
        assert_eq!(&sent[16..], b"Pri");
    }

    #[test]
    fn test_initialized_after_first_datagram() {
        static ACK: [u8; 6] = [0x5A, 0xA5, 0x03, 0x82, 0x4F, 0x4B];
        let mut display = display(&ACK);
        display.init().unwrap();
        assert!(!display.is_initialized());
        display.poll();
        assert!(display.is_initialized());
        display.reset().unwrap();
        assert!(!display.is_initialized());
    }

    #[test]
    fn test_request_screen_applied_on_poll() {
        let mut display = display(&[]);
        display.request_screen(3);
        assert!(display.transport().sent.is_empty());
        display.poll();

        let sent = &display.transport().sent;
        // Screen select followed by the screen's only VP
        assert_eq!(
            &sent[..10],
            &[0x5A, 0xA5, 0x07, 0x82, 0x00, 0x84, 0x5A, 0x01, 0x00, 0x03]
        );
        assert_eq!(&sent[10..], &[0x5A, 0xA5, 0x05, 0x82, 0x10, 0x00, 0x00, 0x3C]);
        assert_eq!(display.current_screen(), Some(3));
    }

    #[test]
    fn test_reset_finishes_partly_sent_frame() {
        let mut display = display(&[]);
        display.transport_mut().room = 3;
        display.write_u16(0x1000, 1234).unwrap();
        display.write_u16(0x1002, 1).unwrap();
        assert_eq!(display.transport().sent.len(), 3);

        display.reset().unwrap();
        display.transport_mut().room = usize::MAX;
        display.flush();

        let sent = &display.transport().sent;
        assert_eq!(&sent[..8], &[0x5A, 0xA5, 0x05, 0x82, 0x10, 0x00, 0x04, 0xD2]);
        assert_eq!(
            &sent[8..],
            &[0x5A, 0xA5, 0x07, 0x82, 0x00, 0x04, 0x55, 0xAA, 0x5A, 0xA5]
        );
        assert_eq!(display.free_tx_buffer(), TX_BUFFER_SIZE);
    }

    #[test]
    fn test_tx_queue_full_is_all_or_nothing() {
        let mut display = display(&[]);
        display.transport_mut().room = 0;

        let mut queued = 0;
        while display.write_u16(0x1000, 1).is_ok() {
            queued += 1;
        }
        assert_eq!(queued, TX_BUFFER_SIZE / 8);
        assert_eq!(display.write_u16(0x1000, 1), Err(DgusError::TxBufferFull));
        assert_eq!(display.free_tx_buffer(), TX_BUFFER_SIZE % 8);

        display.transport_mut().room = 12;
        assert_eq!(display.flush(), 12);
        assert_eq!(display.free_tx_buffer(), TX_BUFFER_SIZE % 8 + 12);
    }
}
