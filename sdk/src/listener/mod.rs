//! # Listener Module
//!
//! Routes the node's push messages to typed per-address streams and
//! correlates announced transactions with their outcome.
//!
//! ## Architecture
//!
//! ```text
//! channel.rs    - Channel names and `name/ADDRESS` subscription keys
//! message.rs    - Classified events on the bus (blocks, transactions, status)
//! dto.rs        - Serde mappings from push JSON into the model
//! transport.rs  - The outbound collaborator: connect, (un)subscribe, close
//! router.rs     - Listener: session state, classification, derived streams
//! filter.rs     - Which transactions involve an address
//! correlator.rs - First of confirmed-or-status for one hash
//! error.rs      - Listener, transport and correlation errors
//! ```
//!
//! ## Usage
//!
//! The transport's reader task hands every inbound frame to
//! [`Listener::handle_text`]. Application code opens the listener, announces
//! a signed transaction elsewhere, and awaits
//! [`Listener::confirmed_with_hash`].

pub mod channel;
pub mod correlator;
pub mod dto;
pub mod error;
pub mod filter;
pub mod message;
pub mod router;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use channel::{ChannelKey, ListenerChannel};
pub use correlator::Correlation;
pub use error::{CorrelationError, ListenerError, TransportError};
pub use filter::transaction_from_address;
pub use message::{BlockInfo, ListenerMessage, ListenerPayload, TransactionStatusError};
pub use router::{ConnectionState, Listener, Subscription};
pub use transport::{
    subscribe_frame, unsubscribe_frame, ListenerTransport, QueuedTransport, TransportCommand,
};
