//! Discovery channel messages

use std::any::Any;
use std::fmt;

use crate::endpoint::EndpointMap;

/// Expected API version. Endpoint names and shapes are the real contract;
/// a different version only produces a warning.
pub const API_VERSION: i32 = 2;

/// Well-known channel shared by the registry mod and its clients
pub const API_CHANNEL: i64 = 8754;

/// Sentinel a client broadcasts to ask for the endpoint map
pub const ENDPOINT_REQUEST: &str = "ApiEndpointRequest";

/// Versioned endpoint map sent by the registry mod.
///
/// `endpoints` is `None` when the registry is unloading.
#[derive(Debug, Clone)]
pub struct EndpointPayload {
    pub version: i32,
    pub endpoints: Option<EndpointMap>,
}

/// Anything that can arrive on a mod channel
pub enum ModMessage {
    /// Plain text, including the endpoint request sentinel
    Text(String),
    Endpoints(EndpointPayload),
    /// Traffic from unrelated mods sharing the channel
    Opaque(Box<dyn Any>),
}

impl ModMessage {
    pub fn endpoint_request() -> Self {
        ModMessage::Text(ENDPOINT_REQUEST.to_string())
    }

    pub fn endpoints(version: i32, endpoints: EndpointMap) -> Self {
        ModMessage::Endpoints(EndpointPayload {
            version,
            endpoints: Some(endpoints),
        })
    }

    /// Registry teardown notice
    pub fn unload(version: i32) -> Self {
        ModMessage::Endpoints(EndpointPayload {
            version,
            endpoints: None,
        })
    }

    pub fn is_endpoint_request(&self) -> bool {
        matches!(self, ModMessage::Text(text) if text == ENDPOINT_REQUEST)
    }
}

impl fmt::Debug for ModMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModMessage::Text(text) => f.debug_tuple("Text").field(text).finish(),
            ModMessage::Endpoints(payload) => f.debug_tuple("Endpoints").field(payload).finish(),
            ModMessage::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_request_detection() {
        assert!(ModMessage::endpoint_request().is_endpoint_request());
        assert!(!ModMessage::Text("hello".to_string()).is_endpoint_request());
        assert!(!ModMessage::unload(API_VERSION).is_endpoint_request());
        assert!(!ModMessage::Opaque(Box::new(42u8)).is_endpoint_request());
    }
}
