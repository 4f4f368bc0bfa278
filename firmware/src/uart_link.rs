//! UART link to the wireless bridge.

use defmt::Format;
use embassy_rp::uart::{Async, Error as UartError, UartRx, UartTx};
use heapless::Vec;
use servo_core::servo_proto::MAX_FRAME_LENGTH;

/// Error type for the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum LinkError {
    /// UART I/O error.
    Io,
    /// Frame longer than [`MAX_FRAME_LENGTH`].
    BufferOverflow,
    /// UART framing error.
    Framing,
}

/// Reads newline-terminated frames from the bridge.
///
/// Each line is one frame from one client: a JSON object or a bare command.
/// The trailing `\r`, if any, is left to the decoder.
///
/// # Pins
///
/// Uses UART1:
/// - GPIO 8: TX
/// - GPIO 9: RX
pub struct FrameReader<'d> {
    rx: UartRx<'d, Async>,
    buffer: Vec<u8, MAX_FRAME_LENGTH>,
}

impl<'d> FrameReader<'d> {
    pub fn new(rx: UartRx<'d, Async>) -> Self {
        Self {
            rx,
            buffer: Vec::new(),
        }
    }

    /// Wait for the next complete frame.
    ///
    /// If a line exceeds the buffer capacity, the rest of the line is
    /// discarded so the next frame starts clean.
    pub async fn read_frame(&mut self) -> Result<&[u8], LinkError> {
        self.buffer.clear();

        loop {
            let mut byte = [0u8; 1];
            self.rx.read(&mut byte).await?;

            if byte[0] == b'\n' {
                return Ok(&self.buffer);
            }

            if self.buffer.push(byte[0]).is_err() {
                loop {
                    self.rx.read(&mut byte).await?;
                    if byte[0] == b'\n' {
                        break;
                    }
                }
                return Err(LinkError::BufferOverflow);
            }
        }
    }
}

/// Writes newline-terminated frames to the bridge.
pub struct FrameWriter<'d> {
    tx: UartTx<'d, Async>,
}

impl<'d> FrameWriter<'d> {
    pub fn new(tx: UartTx<'d, Async>) -> Self {
        Self { tx }
    }

    /// Write `payload` followed by `\n`.
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<(), LinkError> {
        self.tx.write(payload).await?;
        self.tx.write(b"\n").await?;
        Ok(())
    }
}

impl From<UartError> for LinkError {
    fn from(e: UartError) -> Self {
        match e {
            UartError::Framing => LinkError::Framing,
            UartError::Overrun => LinkError::BufferOverflow,
            _ => LinkError::Io,
        }
    }
}
