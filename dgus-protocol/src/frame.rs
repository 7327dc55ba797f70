//! Frame encoding and decoding for the DGUS protocol.
//!
//! Frame format:
//! - HDR1 (1 byte): 0x5A synchronization byte
//! - HDR2 (1 byte): 0xA5 synchronization byte
//! - LEN (1 byte): number of bytes that follow (command + address + payload)
//! - CMD (1 byte): 0x82 write variable, 0x83 read variable
//! - ADDR (2 bytes): VP address, big-endian
//! - PAYLOAD (0-249 bytes): command-specific data
//!
//! Everything after LEN is called the datagram. [`FrameParser`] recovers
//! datagrams from the byte stream; [`Frame::from_datagram`] interprets them.

use heapless::Vec;

/// First header byte
pub const HEADER1: u8 = 0x5A;

/// Second header byte
pub const HEADER2: u8 = 0xA5;

/// Write variable command
pub const CMD_WRITE_VAR: u8 = 0x82;

/// Read variable command (also used by the display for auto-upload)
pub const CMD_READ_VAR: u8 = 0x83;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 249;

/// Maximum datagram length (CMD + ADDR + MAX_PAYLOAD), i.e. the largest LEN
pub const MAX_DATAGRAM_LEN: usize = 3 + MAX_PAYLOAD_SIZE;

/// Maximum complete frame size (HDR1 + HDR2 + LEN + datagram)
pub const MAX_FRAME_SIZE: usize = 3 + MAX_DATAGRAM_LEN;

/// Address field of the display's write acknowledgement ("OK")
pub const ACK_ADDRESS: u16 = u16::from_be_bytes(*b"OK");

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Declared LEN exceeds the receive buffer; datagram dropped
    DatagramTooLarge,
    /// Datagram too short to hold a command and an address
    Truncated,
    /// Command byte is neither read nor write
    UnknownCommand(u8),
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// Frame command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Read variable (0x83)
    Read,
    /// Write variable (0x82)
    Write,
}

impl Command {
    /// Parse a command from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_READ_VAR => Some(Command::Read),
            CMD_WRITE_VAR => Some(Command::Write),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            Command::Read => CMD_READ_VAR,
            Command::Write => CMD_WRITE_VAR,
        }
    }
}

/// A parsed or constructed frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// VP address
    pub address: u16,
    /// Read or write
    pub command: Command,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a new frame
    pub fn new(command: Command, address: u16, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self {
            address,
            command,
            payload,
        })
    }

    /// Create a write-variable frame
    pub fn write(address: u16, payload: &[u8]) -> Result<Self, FrameError> {
        Self::new(Command::Write, address, payload)
    }

    /// Create a read-variable request for `words` 16-bit words
    pub fn read(address: u16, words: u8) -> Self {
        let mut payload = Vec::new();
        // Capacity is far above one byte
        let _ = payload.push(words);
        Self {
            address,
            command: Command::Read,
            payload,
        }
    }

    /// Interpret a datagram (the LEN bytes following the header)
    pub fn from_datagram(datagram: &[u8]) -> Result<Self, FrameError> {
        if datagram.len() < 3 {
            return Err(FrameError::Truncated);
        }
        let command = Command::from_byte(datagram[0]).ok_or(FrameError::UnknownCommand(datagram[0]))?;
        let address = u16::from_be_bytes([datagram[1], datagram[2]]);
        Self::new(command, address, &datagram[3..])
    }

    /// Whether this is the display's acknowledgement of a write
    ///
    /// The display answers every write with `5A A5 03 82 4F 4B`.
    pub fn is_ack(&self) -> bool {
        self.command == Command::Write && self.address == ACK_ADDRESS && self.payload.is_empty()
    }

    /// Value of the LEN byte for this frame
    pub fn datagram_len(&self) -> usize {
        3 + self.payload.len()
    }

    /// Total number of bytes [`Frame::encode`] produces
    pub fn encoded_len(&self) -> usize {
        3 + self.datagram_len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let [addr_hi, addr_lo] = self.address.to_be_bytes();
        buffer[0] = HEADER1;
        buffer[1] = HEADER2;
        buffer[2] = self.datagram_len() as u8;
        buffer[3] = self.command.to_byte();
        buffer[4] = addr_hi;
        buffer[5] = addr_lo;
        buffer[6..frame_len].copy_from_slice(&self.payload);

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

/// Receive state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Waiting for HDR1
    Idle,
    /// Got HDR1, waiting for HDR2
    Header1Seen,
    /// Got both header bytes, waiting for LEN
    Header2Seen,
    /// Collecting the datagram
    AwaitingPayload {
        /// Bytes still missing
        remaining: u8,
    },
}

/// State machine for parsing incoming datagrams
///
/// Driven one byte at a time; it never waits for input and keeps its state
/// between calls, so a datagram may be split across any number of polls.
/// `N` bounds the datagram length that will be accepted. A LEN above `N`
/// abandons the datagram before any payload byte is stored.
#[derive(Debug, Clone)]
pub struct FrameParser<const N: usize = MAX_DATAGRAM_LEN> {
    state: ParseState,
    buffer: Vec<u8, N>,
}

impl<const N: usize> Default for FrameParser<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameParser<N> {
    /// Create a new frame parser
    pub const fn new() -> Self {
        Self {
            state: ParseState::Idle,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::Idle;
        self.buffer.clear();
    }

    /// Current receive state
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(datagram))` when a complete datagram has been
    /// collected, `Ok(None)` when more bytes are needed, or
    /// `Err(FrameError::DatagramTooLarge)` when an oversize LEN was seen.
    /// The parser is back in [`ParseState::Idle`] after every `Some` or `Err`.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Vec<u8, N>>, FrameError> {
        match self.state {
            ParseState::Idle => {
                if byte == HEADER1 {
                    self.state = ParseState::Header1Seen;
                }
                // Silently ignore anything else while waiting
                Ok(None)
            }
            ParseState::Header1Seen => {
                self.state = if byte == HEADER2 {
                    ParseState::Header2Seen
                } else {
                    ParseState::Idle
                };
                Ok(None)
            }
            ParseState::Header2Seen => {
                if byte as usize > N {
                    self.reset();
                    return Err(FrameError::DatagramTooLarge);
                }
                self.buffer.clear();
                if byte == 0 {
                    self.state = ParseState::Idle;
                    return Ok(Some(Vec::new()));
                }
                self.state = ParseState::AwaitingPayload { remaining: byte };
                Ok(None)
            }
            ParseState::AwaitingPayload { remaining } => {
                // Cannot fail: LEN was checked against N
                let _ = self.buffer.push(byte);
                if remaining > 1 {
                    self.state = ParseState::AwaitingPayload {
                        remaining: remaining - 1,
                    };
                    return Ok(None);
                }
                self.state = ParseState::Idle;
                Ok(Some(core::mem::take(&mut self.buffer)))
            }
        }
    }

    /// Feed a single byte and interpret a completed datagram as a [`Frame`]
    pub fn feed_frame(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.feed(byte)? {
            Some(datagram) => Frame::from_datagram(&datagram).map(Some),
            None => Ok(None),
        }
    }

    /// Iterate over the frames contained in `bytes`
    ///
    /// Every byte is consumed; a datagram left incomplete at the end stays
    /// buffered for the next call.
    pub fn frames<'p, 'b>(&'p mut self, bytes: &'b [u8]) -> Frames<'p, 'b, N> {
        Frames {
            parser: self,
            bytes: bytes.iter(),
        }
    }
}

/// Iterator returned by [`FrameParser::frames`]
pub struct Frames<'p, 'b, const N: usize> {
    parser: &'p mut FrameParser<N>,
    bytes: core::slice::Iter<'b, u8>,
}

impl<const N: usize> Iterator for Frames<'_, '_, N> {
    type Item = Result<Frame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            match self.parser.feed_frame(byte) {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
