//! Definition API client
//!
//! A client mod asks the registry mod for its endpoint map over the shared
//! channel, binds whatever endpoints it understands and then forwards
//! definition calls through them. Until the map arrives every call is a no-op.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use deteq_protocol::endpoint::{
    DefinitionActionFn, DefinitionListFn, DefinitionQueryFn, DefinitionReadFn,
    DefinitionWriteFn, DelegateReadFn, DelegateWriteFn, GET_DEFINITION, GET_DEFINITIONS_OF_TYPE,
    GET_DELEGATES, HAS_DEFINITION, LOG_DEBUG, LOG_INFO, LogFn, REGISTER_DEFINITION,
    REGISTER_DELEGATES, REGISTER_ON_UPDATE, REMOVE_DEFINITION, UNREGISTER_ON_UPDATE,
    UpdateSubscriptionFn,
};
use deteq_protocol::{
    API_CHANNEL, API_VERSION, ApiError, EXPECTED_ENDPOINTS, Endpoint, EndpointMap,
    EndpointPayload, ModChannel, ModMessage, ProtocolError, UpdateCallback, decode_definition,
    encode_definition,
};
use deteq_schema::{Definition, DelegateSet};

use crate::console::ModConsole;

/// Called after each successful bind. Errors are reported, never propagated.
pub type ReadyCallback = Box<dyn FnMut(&DefinitionApi) -> Result<(), Box<dyn Error>>>;

/// Connection state of a [`DefinitionApi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiState {
    Unregistered,
    AwaitingEndpoints,
    Bound,
    Unloaded,
}

/// Resolved endpoints; `None` is inert
#[derive(Default, Clone)]
struct Endpoints {
    register_definition: Option<Rc<DefinitionWriteFn>>,
    get_definition: Option<Rc<DefinitionReadFn>>,
    get_definitions_of_type: Option<Rc<DefinitionListFn>>,
    remove_definition: Option<Rc<DefinitionActionFn>>,
    has_definition: Option<Rc<DefinitionQueryFn>>,
    register_delegates: Option<Rc<DelegateWriteFn>>,
    get_delegates: Option<Rc<DelegateReadFn>>,
    register_on_update: Option<Rc<UpdateSubscriptionFn>>,
    unregister_on_update: Option<Rc<UpdateSubscriptionFn>>,
    log_debug: Option<Rc<LogFn>>,
    log_info: Option<Rc<LogFn>>,
}

macro_rules! bind {
    ($map:expr, $name:expr, $variant:ident) => {
        match $map.get($name) {
            Some(Endpoint::$variant(f)) => Some(f.clone()),
            _ => None,
        }
    };
}

impl Endpoints {
    /// Resolve every expected endpoint present in `map`.
    ///
    /// All shapes are checked before anything is bound, so a mismatch leaves
    /// the client untouched.
    fn resolve(map: &EndpointMap) -> Result<Self, ApiError> {
        for (name, expected) in EXPECTED_ENDPOINTS {
            if let Some(endpoint) = map.get(name) {
                let found = endpoint.signature();
                if found != expected {
                    return Err(ApiError::SignatureMismatch {
                        name: name.to_string(),
                        expected,
                        found,
                    });
                }
            }
        }

        Ok(Self {
            register_definition: bind!(map, REGISTER_DEFINITION, DefinitionWrite),
            get_definition: bind!(map, GET_DEFINITION, DefinitionRead),
            get_definitions_of_type: bind!(map, GET_DEFINITIONS_OF_TYPE, DefinitionList),
            remove_definition: bind!(map, REMOVE_DEFINITION, DefinitionAction),
            has_definition: bind!(map, HAS_DEFINITION, DefinitionQuery),
            register_delegates: bind!(map, REGISTER_DELEGATES, DelegateWrite),
            get_delegates: bind!(map, GET_DELEGATES, DelegateRead),
            register_on_update: bind!(map, REGISTER_ON_UPDATE, UpdateSubscription),
            unregister_on_update: bind!(map, UNREGISTER_ON_UPDATE, UpdateSubscription),
            log_debug: bind!(map, LOG_DEBUG, Log),
            log_info: bind!(map, LOG_INFO, Log),
        })
    }

    fn bound_count(&self) -> usize {
        [
            self.register_definition.is_some(),
            self.get_definition.is_some(),
            self.get_definitions_of_type.is_some(),
            self.remove_definition.is_some(),
            self.has_definition.is_some(),
            self.register_delegates.is_some(),
            self.get_delegates.is_some(),
            self.register_on_update.is_some(),
            self.unregister_on_update.is_some(),
            self.log_debug.is_some(),
            self.log_info.is_some(),
        ]
        .into_iter()
        .filter(|bound| *bound)
        .count()
    }
}

/// Client side of the definition API, owned by one mod
pub struct DefinitionApi {
    mod_name: String,
    channel: Option<Rc<dyn ModChannel>>,
    state: ApiState,
    framework_version: i32,
    endpoints: Endpoints,
    on_ready: Option<ReadyCallback>,
}

impl fmt::Debug for DefinitionApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefinitionApi")
            .field("mod_name", &self.mod_name)
            .field("state", &self.state)
            .field("framework_version", &self.framework_version)
            .field("bound_endpoints", &self.endpoints.bound_count())
            .finish()
    }
}

impl DefinitionApi {
    pub fn new(mod_name: impl Into<String>) -> Self {
        Self {
            mod_name: mod_name.into(),
            channel: None,
            state: ApiState::Unregistered,
            framework_version: -1,
            endpoints: Endpoints::default(),
            on_ready: None,
        }
    }

    pub fn mod_name(&self) -> &str {
        &self.mod_name
    }

    pub fn state(&self) -> ApiState {
        self.state
    }

    /// True while an endpoint map is bound
    pub fn is_ready(&self) -> bool {
        self.state == ApiState::Bound
    }

    /// Version reported by the registry mod in the last bind, -1 before
    pub fn framework_version(&self) -> i32 {
        self.framework_version
    }

    /// Subscribe to the API channel and ask the registry mod for its endpoints.
    ///
    /// `on_ready` runs after every successful bind. Can be called again only
    /// after [`DefinitionApi::unload`].
    pub fn init(
        &mut self,
        channel: Rc<dyn ModChannel>,
        on_ready: Option<ReadyCallback>,
    ) -> Result<(), ApiError> {
        if matches!(self.state, ApiState::AwaitingEndpoints | ApiState::Bound) {
            return Err(ApiError::AlreadyInitialized {
                mod_name: self.mod_name.clone(),
            });
        }

        channel.register_handler(API_CHANNEL);
        channel.send(API_CHANNEL, ModMessage::endpoint_request());
        ModConsole::debug(&self.mod_name, "Requested definition API endpoints");

        self.channel = Some(channel);
        self.on_ready = on_ready;
        self.state = ApiState::AwaitingEndpoints;
        Ok(())
    }

    /// Unsubscribe and drop every endpoint. Safe to call repeatedly.
    pub fn unload(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.unregister_handler(API_CHANNEL);
        }
        self.endpoints = Endpoints::default();
        self.on_ready = None;
        if self.state != ApiState::Unregistered {
            self.state = ApiState::Unloaded;
        }
    }

    /// Process one message received on the API channel.
    ///
    /// Only endpoint payloads are acted on. A signature mismatch is returned
    /// as an error; faults in the ready callback are reported and swallowed.
    pub fn handle_message(&mut self, message: &ModMessage) -> Result<(), ApiError> {
        if !matches!(self.state, ApiState::AwaitingEndpoints | ApiState::Bound) {
            return Ok(());
        }

        // Our own request comes back on a shared channel
        let ModMessage::Endpoints(payload) = message else {
            return Ok(());
        };

        match payload {
            EndpointPayload {
                endpoints: None, ..
            } => {
                self.endpoints = Endpoints::default();
                if self.state == ApiState::Bound {
                    ModConsole::debug(&self.mod_name, "Definition API endpoints withdrawn");
                }
                self.state = ApiState::AwaitingEndpoints;
                Ok(())
            }
            EndpointPayload {
                version,
                endpoints: Some(map),
            } => {
                if self.state == ApiState::Bound {
                    return Ok(());
                }
                self.bind(*version, map)
            }
        }
    }

    fn bind(&mut self, version: i32, map: &EndpointMap) -> Result<(), ApiError> {
        if version != API_VERSION {
            ModConsole::warn(
                &self.mod_name,
                &format!(
                    "Expected API version ({}) differs from received API version {}; errors may occur.",
                    API_VERSION, version
                ),
            );
        }

        self.endpoints = Endpoints::resolve(map)?;
        self.framework_version = version;
        self.state = ApiState::Bound;

        ModConsole::debug(
            &self.mod_name,
            &format!(
                "Bound {}/{} definition API endpoints",
                self.endpoints.bound_count(),
                EXPECTED_ENDPOINTS.len()
            ),
        );
        self.log_info(&format!("Definition API v{} loaded!", API_VERSION));

        self.notify_ready();
        Ok(())
    }

    /// Run the ready callback; errors and panics are reported, never propagated.
    fn notify_ready(&mut self) {
        let Some(mut callback) = self.on_ready.take() else {
            return;
        };

        let api = &*self;
        match panic::catch_unwind(AssertUnwindSafe(|| callback(api))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => self.report_fault(&e.to_string()),
            Err(payload) => self.report_fault(&panic_message(payload.as_ref())),
        }

        if self.on_ready.is_none() {
            self.on_ready = Some(callback);
        }
    }

    fn report_fault(&self, fault: &str) {
        ModConsole::error(&self.mod_name, &format!("Exception in DefinitionApi! {}", fault));
        if let Some(channel) = &self.channel {
            channel.show_message(&self.mod_name, &format!("Exception in DefinitionApi!\n{}", fault));
        }
        self.log_info(fault);
    }

    /// Register or replace the definition stored under `id`
    pub fn register_definition<T: Definition>(
        &self,
        id: &str,
        definition: &T,
    ) -> Result<(), ProtocolError> {
        let Some(endpoint) = &self.endpoints.register_definition else {
            return Ok(());
        };
        let data = encode_definition(definition)?;
        endpoint(id, T::KIND, &data);
        Ok(())
    }

    /// Fetch a registered definition. Delegates are not included.
    pub fn get_definition<T: Definition>(&self, id: &str) -> Result<Option<T>, ProtocolError> {
        let Some(endpoint) = &self.endpoints.get_definition else {
            return Ok(None);
        };
        match endpoint(id, T::KIND) {
            Some(data) => Ok(Some(decode_definition(&data)?)),
            None => Ok(None),
        }
    }

    /// Ids of every registered definition of kind `T`
    pub fn get_definitions_of_type<T: Definition>(&self) -> Vec<String> {
        self.endpoints
            .get_definitions_of_type
            .as_ref()
            .map(|endpoint| endpoint(T::KIND))
            .unwrap_or_default()
    }

    pub fn remove_definition<T: Definition>(&self, id: &str) {
        if let Some(endpoint) = &self.endpoints.remove_definition {
            endpoint(id, T::KIND);
        }
    }

    pub fn has_definition<T: Definition>(&self, id: &str) -> bool {
        self.endpoints
            .has_definition
            .as_ref()
            .is_some_and(|endpoint| endpoint(id, T::KIND))
    }

    /// Attach delegates to the definition stored under `id`
    pub fn register_delegates<T: Definition>(&self, id: &str, delegates: DelegateSet) {
        if let Some(endpoint) = &self.endpoints.register_delegates {
            endpoint(id, T::KIND, delegates);
        }
    }

    pub fn get_delegates<T: Definition>(&self, id: &str) -> Option<DelegateSet> {
        self.endpoints
            .get_delegates
            .as_ref()
            .and_then(|endpoint| endpoint(id, T::KIND))
    }

    /// Be notified when any definition of kind `T` changes
    pub fn register_on_update<T: Definition>(&self, callback: UpdateCallback) {
        if let Some(endpoint) = &self.endpoints.register_on_update {
            endpoint(T::KIND, callback);
        }
    }

    /// Remove a callback previously passed to [`DefinitionApi::register_on_update`]
    pub fn unregister_on_update<T: Definition>(&self, callback: &UpdateCallback) {
        if let Some(endpoint) = &self.endpoints.unregister_on_update {
            endpoint(T::KIND, callback.clone());
        }
    }

    /// Write to the registry mod's debug log
    pub fn log_debug(&self, text: &str) {
        if let Some(endpoint) = &self.endpoints.log_debug {
            endpoint(&format!("[{}] {}", self.mod_name, text));
        }
    }

    /// Write to the registry mod's info log
    pub fn log_info(&self, text: &str) {
        if let Some(endpoint) = &self.endpoints.log_info {
            endpoint(&format!("[{}] {}", self.mod_name, text));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panic: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panic: {}", message)
    } else {
        "panic with unknown payload".to_string()
    }
}
