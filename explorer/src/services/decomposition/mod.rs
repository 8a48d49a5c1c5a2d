//! # Decomposition
//!
//! Single-flight access to the external seasonal/trend decomposition engine.
//!
//! ```text
//! decomposition/
//! ├── channel.rs    - DecompositionChannel (one request outstanding at a time)
//! ├── codec.rs      - Request encoding, response decoding and rounding
//! ├── fixture.rs    - Offline engine (canned or echo)
//! └── websocket.rs  - Live engine over a WebSocket session
//! ```

pub mod channel;
pub mod codec;
pub mod fixture;
pub mod websocket;

pub use channel::DecompositionChannel;
pub use codec::{decode_response, decode_values, encode_request, Decomposition, SEASONAL_POINTS};
pub use fixture::FixtureEngine;
pub use websocket::WebSocketEngine;
