//! Message port abstraction
//!
//! The postMessage-equivalent channel the bridge posts through. The
//! production embedding binds this to the real browser channel; tests and
//! in-process embeddings use [`ChannelPort`].

use crate::error::{BridgeError, BridgeResult};
use shared::BridgeMessage;
use tokio::sync::mpsc;

/// One-directional message sink
pub trait MessagePort: Send + Sync + std::fmt::Debug {
    fn post(&self, message: &BridgeMessage) -> BridgeResult<()>;
}

/// In-memory port backed by an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelPort {
    tx: mpsc::UnboundedSender<BridgeMessage>,
}

impl ChannelPort {
    /// Create a port and the receiving end for the peer
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BridgeMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl MessagePort for ChannelPort {
    fn post(&self, message: &BridgeMessage) -> BridgeResult<()> {
        self.tx
            .send(message.clone())
            .map_err(|_| BridgeError::ChannelClosed)
    }
}
