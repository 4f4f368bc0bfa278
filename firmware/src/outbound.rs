//! Outbound queue between the engine task and the UART writer task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender, TrySendError};
use servo_core::servo_proto::{Serialize, MAX_SNAPSHOT_SIZE};
use servo_core::{Ack, OutputError, Snapshot, SnapshotSink};

/// Depth of the outbound queue. A full queue drops new snapshots.
pub const OUTBOUND_QUEUE_DEPTH: usize = 8;

/// Largest outbound text frame, excluding the newline.
pub const MAX_OUTBOUND_LEN: usize = MAX_SNAPSHOT_SIZE;

/// Message waiting to be written to the bridge.
///
/// Snapshot lines are JSON objects and go to every client. Ack lines are
/// plain text; the bridge routes them to the client whose frame it forwarded
/// last, which is the command's sender since frames are applied one at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outbound {
    /// Broadcast to every client.
    Snapshot(Snapshot),
    /// Reply to the client that issued a command.
    Ack(Ack),
}

impl Outbound {
    /// Render the message into `buf`, returning the number of bytes written.
    pub fn render(&self, buf: &mut [u8; MAX_OUTBOUND_LEN]) -> Result<usize, OutputError> {
        let text = match self {
            Outbound::Ack(ack) => ack.as_str(),
            Outbound::Snapshot(snapshot) => {
                return snapshot.serialize(buf).map_err(|_| OutputError::Dropped);
            }
        };
        let len = text.len().min(buf.len());
        buf[..len].copy_from_slice(&text.as_bytes()[..len]);
        Ok(len)
    }
}

pub type OutboundChannel = Channel<CriticalSectionRawMutex, Outbound, OUTBOUND_QUEUE_DEPTH>;

/// Snapshot sink that queues broadcasts for the writer task.
pub struct QueueSink {
    sender: Sender<'static, CriticalSectionRawMutex, Outbound, OUTBOUND_QUEUE_DEPTH>,
}

impl QueueSink {
    pub fn new(channel: &'static OutboundChannel) -> Self {
        Self {
            sender: channel.sender(),
        }
    }

    /// Queue an acknowledgement for the sender of a command.
    pub fn ack(&mut self, ack: Ack) -> Result<(), OutputError> {
        self.push(Outbound::Ack(ack))
    }

    fn push(&mut self, message: Outbound) -> Result<(), OutputError> {
        self.sender
            .try_send(message)
            .map_err(|TrySendError::Full(_)| OutputError::Dropped)
    }
}

impl SnapshotSink for QueueSink {
    fn publish(&mut self, snapshot: &Snapshot) -> Result<(), OutputError> {
        self.push(Outbound::Snapshot(*snapshot))
    }
}
