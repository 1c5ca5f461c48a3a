//! WebSocket support for real-time analysis
//!
//! Clients stream video frames and chat messages over `/ws` and receive
//! analysis results as they are produced. Frames from one client are
//! handled in arrival order.

pub mod handlers;
pub mod protocol;
pub mod registry;

pub use handlers::{Reply, dispatch, handle_text, websocket_handler};
pub use protocol::{ClientEvent, ProtocolError, WsEnvelope, client_events, server_events};
pub use registry::{ClientId, ClientRegistry, ClientSession, RegistryError, StreamKind};
