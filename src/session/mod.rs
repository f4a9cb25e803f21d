//! Agent session protocol
//!
//! Every interaction with an agent follows the same short-lived protocol:
//! create a session, post one message, poll the session's message list for
//! the agent's reply, then delete the session.
//!
//! - `SessionClient` - runs the protocol (`exchange`)
//! - `SessionTransport` - the four HTTP operations, behind a trait
//! - `PollPolicy` - poll interval and deadline

pub mod client;
pub mod metadata;
pub mod poll;
pub mod transport;
pub mod types;

pub use client::{ExchangeRequest, SessionClient};
pub use metadata::SessionMetadata;
pub use poll::PollPolicy;
pub use transport::{HttpSessionTransport, SessionTransport, TransportError};
pub use types::{latest_reply, Session, SessionMessage};
