use thiserror::Error;

use crate::endpoint::EndpointSignature;

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Integration errors between cooperating mods.
///
/// These indicate a build mismatch and are never swallowed by the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{mod_name}: DefinitionApi.init() should not be called multiple times!")]
    AlreadyInitialized { mod_name: String },

    #[error("Method {name} type mismatch! [MapMethod: {found} | ApiMethod: {expected}]")]
    SignatureMismatch {
        name: String,
        expected: EndpointSignature,
        found: EndpointSignature,
    },
}
