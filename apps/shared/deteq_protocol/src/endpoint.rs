//! Endpoint contract
//!
//! The registry mod exposes its functions as a map of named endpoints. Each
//! endpoint is tagged with its call shape so a client can check it once when
//! binding instead of on every call.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use deteq_schema::{DefinitionKind, DelegateSet};

pub const REGISTER_DEFINITION: &str = "RegisterDefinition";
pub const GET_DEFINITION: &str = "GetDefinition";
pub const GET_DEFINITIONS_OF_TYPE: &str = "GetDefinitionsOfType";
pub const REMOVE_DEFINITION: &str = "RemoveDefinition";
pub const HAS_DEFINITION: &str = "HasDefinition";
pub const REGISTER_DELEGATES: &str = "RegisterDelegates";
pub const GET_DELEGATES: &str = "GetDelegates";
pub const REGISTER_ON_UPDATE: &str = "RegisterOnUpdate";
pub const UNREGISTER_ON_UPDATE: &str = "UnregisterOnUpdate";
pub const LOG_DEBUG: &str = "LogDebug";
pub const LOG_INFO: &str = "LogInfo";

/// Every endpoint a client binds, with the shape it must have.
///
/// Changing this list without bumping the API version silently breaks older peers.
pub const EXPECTED_ENDPOINTS: [(&str, EndpointSignature); 11] = [
    (REGISTER_DEFINITION, EndpointSignature::DefinitionWrite),
    (GET_DEFINITION, EndpointSignature::DefinitionRead),
    (GET_DEFINITIONS_OF_TYPE, EndpointSignature::DefinitionList),
    (REMOVE_DEFINITION, EndpointSignature::DefinitionAction),
    (HAS_DEFINITION, EndpointSignature::DefinitionQuery),
    (REGISTER_DELEGATES, EndpointSignature::DelegateWrite),
    (GET_DELEGATES, EndpointSignature::DelegateRead),
    (REGISTER_ON_UPDATE, EndpointSignature::UpdateSubscription),
    (UNREGISTER_ON_UPDATE, EndpointSignature::UpdateSubscription),
    (LOG_DEBUG, EndpointSignature::Log),
    (LOG_INFO, EndpointSignature::Log),
];

/// Change reported to update subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKind {
    Updated = 0,
    Removed = 1,
    DelegatesUpdated = 2,
}

/// Subscriber called with (definition id, change)
pub type UpdateCallback = Rc<dyn Fn(&str, UpdateKind)>;

pub type DefinitionWriteFn = dyn Fn(&str, DefinitionKind, &[u8]);
pub type DefinitionReadFn = dyn Fn(&str, DefinitionKind) -> Option<Vec<u8>>;
pub type DefinitionListFn = dyn Fn(DefinitionKind) -> Vec<String>;
pub type DefinitionActionFn = dyn Fn(&str, DefinitionKind);
pub type DefinitionQueryFn = dyn Fn(&str, DefinitionKind) -> bool;
pub type DelegateWriteFn = dyn Fn(&str, DefinitionKind, DelegateSet);
pub type DelegateReadFn = dyn Fn(&str, DefinitionKind) -> Option<DelegateSet>;
pub type UpdateSubscriptionFn = dyn Fn(DefinitionKind, UpdateCallback);
pub type LogFn = dyn Fn(&str);

/// Call shapes an endpoint can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointSignature {
    DefinitionWrite,
    DefinitionRead,
    DefinitionList,
    DefinitionAction,
    DefinitionQuery,
    DelegateWrite,
    DelegateRead,
    UpdateSubscription,
    Log,
}

impl fmt::Display for EndpointSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            EndpointSignature::DefinitionWrite => "Fn(&str, DefinitionKind, &[u8])",
            EndpointSignature::DefinitionRead => "Fn(&str, DefinitionKind) -> Option<Vec<u8>>",
            EndpointSignature::DefinitionList => "Fn(DefinitionKind) -> Vec<String>",
            EndpointSignature::DefinitionAction => "Fn(&str, DefinitionKind)",
            EndpointSignature::DefinitionQuery => "Fn(&str, DefinitionKind) -> bool",
            EndpointSignature::DelegateWrite => "Fn(&str, DefinitionKind, DelegateSet)",
            EndpointSignature::DelegateRead => "Fn(&str, DefinitionKind) -> Option<DelegateSet>",
            EndpointSignature::UpdateSubscription => "Fn(DefinitionKind, UpdateCallback)",
            EndpointSignature::Log => "Fn(&str)",
        };
        f.write_str(shape)
    }
}

/// A callable endpoint of any supported shape
#[derive(Clone)]
pub enum Endpoint {
    DefinitionWrite(Rc<DefinitionWriteFn>),
    DefinitionRead(Rc<DefinitionReadFn>),
    DefinitionList(Rc<DefinitionListFn>),
    DefinitionAction(Rc<DefinitionActionFn>),
    DefinitionQuery(Rc<DefinitionQueryFn>),
    DelegateWrite(Rc<DelegateWriteFn>),
    DelegateRead(Rc<DelegateReadFn>),
    UpdateSubscription(Rc<UpdateSubscriptionFn>),
    Log(Rc<LogFn>),
}

impl Endpoint {
    pub fn signature(&self) -> EndpointSignature {
        match self {
            Endpoint::DefinitionWrite(_) => EndpointSignature::DefinitionWrite,
            Endpoint::DefinitionRead(_) => EndpointSignature::DefinitionRead,
            Endpoint::DefinitionList(_) => EndpointSignature::DefinitionList,
            Endpoint::DefinitionAction(_) => EndpointSignature::DefinitionAction,
            Endpoint::DefinitionQuery(_) => EndpointSignature::DefinitionQuery,
            Endpoint::DelegateWrite(_) => EndpointSignature::DelegateWrite,
            Endpoint::DelegateRead(_) => EndpointSignature::DelegateRead,
            Endpoint::UpdateSubscription(_) => EndpointSignature::UpdateSubscription,
            Endpoint::Log(_) => EndpointSignature::Log,
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Endpoint({:?})", self.signature())
    }
}

/// Named endpoints supplied by the registry mod in one message
pub type EndpointMap = HashMap<String, Endpoint>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_signature_tag() {
        let endpoint = Endpoint::Log(Rc::new(|_text: &str| {}));
        assert_eq!(endpoint.signature(), EndpointSignature::Log);
        assert_eq!(format!("{:?}", endpoint), "Endpoint(Log)");
    }
}
