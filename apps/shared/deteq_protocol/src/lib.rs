//! Detection Equipment definition API protocol
//!
//! Shared between the registry mod and its clients: the discovery messages,
//! the named endpoint contract and the definition byte format.

pub mod channel;
pub mod codec;
pub mod endpoint;
pub mod error;
pub mod message;

pub use channel::ModChannel;
pub use codec::{decode_definition, encode_definition};
pub use endpoint::{
    EXPECTED_ENDPOINTS, Endpoint, EndpointMap, EndpointSignature, UpdateCallback, UpdateKind,
};
pub use error::{ApiError, ProtocolError, Result};
pub use message::{API_CHANNEL, API_VERSION, ENDPOINT_REQUEST, EndpointPayload, ModMessage};
