//! Network layer for the remote console.
//!
//! # Data Flow
//! ```text
//! Console connects over TCP
//!     → listener.rs (bind with address reuse, accept)
//!     → connection.rs (one session: drain queue to the socket, watch for hangup)
//!     → session ends → forwarder returns to accepting
//! ```
//!
//! # Design Decisions
//! - Exactly one console is served at a time; others wait in the backlog
//! - Anything the console sends is read and discarded

pub mod connection;
pub mod listener;

pub use connection::{ClientSession, ConnectionId, SessionEnd};
pub use listener::{ConsoleListener, ListenerError};
