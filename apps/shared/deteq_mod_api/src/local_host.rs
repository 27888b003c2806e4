//! In-process registry host
//!
//! Implements the registry side of the endpoint contract entirely in memory,
//! together with a loopback channel that queues messages until the host pumps
//! them. Useful when both sides run in one process and for exercising clients
//! without the game engine.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::rc::Rc;

use deteq_protocol::endpoint::{
    GET_DEFINITION, GET_DEFINITIONS_OF_TYPE, GET_DELEGATES, HAS_DEFINITION, LOG_DEBUG, LOG_INFO,
    REGISTER_DEFINITION, REGISTER_DELEGATES, REGISTER_ON_UPDATE, REMOVE_DEFINITION,
    UNREGISTER_ON_UPDATE,
};
use deteq_protocol::{
    API_CHANNEL, API_VERSION, ApiError, Endpoint, EndpointMap, ModChannel, ModMessage,
    UpdateCallback, UpdateKind,
};
use deteq_schema::{DefinitionKind, DelegateSet};
use tracing::{debug, info};

type Key = (DefinitionKind, String);

#[derive(Default)]
struct RegistryState {
    definitions: BTreeMap<Key, Vec<u8>>,
    delegates: HashMap<Key, DelegateSet>,
    subscribers: HashMap<DefinitionKind, Vec<UpdateCallback>>,
    log: Vec<String>,
}

/// Registry mod running in the same process as its clients
#[derive(Clone)]
pub struct LocalHost {
    state: Rc<RefCell<RegistryState>>,
    version: i32,
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalHost {
    pub fn new() -> Self {
        Self::with_version(API_VERSION)
    }

    /// Host advertising a specific API version
    pub fn with_version(version: i32) -> Self {
        Self {
            state: Rc::new(RefCell::new(RegistryState::default())),
            version,
        }
    }

    /// Full endpoint map backed by this host
    pub fn endpoint_map(&self) -> EndpointMap {
        let mut map = EndpointMap::new();

        let state = self.state.clone();
        map.insert(
            REGISTER_DEFINITION.to_string(),
            Endpoint::DefinitionWrite(Rc::new(move |id: &str, kind: DefinitionKind, data: &[u8]| {
                state
                    .borrow_mut()
                    .definitions
                    .insert((kind, id.to_string()), data.to_vec());
                notify(&state, kind, id, UpdateKind::Updated);
            })),
        );

        let state = self.state.clone();
        map.insert(
            GET_DEFINITION.to_string(),
            Endpoint::DefinitionRead(Rc::new(move |id: &str, kind: DefinitionKind| {
                state.borrow().definitions.get(&(kind, id.to_string())).cloned()
            })),
        );

        let state = self.state.clone();
        map.insert(
            GET_DEFINITIONS_OF_TYPE.to_string(),
            Endpoint::DefinitionList(Rc::new(move |kind: DefinitionKind| {
                state
                    .borrow()
                    .definitions
                    .keys()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, id)| id.clone())
                    .collect()
            })),
        );

        let state = self.state.clone();
        map.insert(
            REMOVE_DEFINITION.to_string(),
            Endpoint::DefinitionAction(Rc::new(move |id: &str, kind: DefinitionKind| {
                let key = (kind, id.to_string());
                let removed = {
                    let mut registry = state.borrow_mut();
                    registry.delegates.remove(&key);
                    registry.definitions.remove(&key).is_some()
                };
                if removed {
                    notify(&state, kind, id, UpdateKind::Removed);
                }
            })),
        );

        let state = self.state.clone();
        map.insert(
            HAS_DEFINITION.to_string(),
            Endpoint::DefinitionQuery(Rc::new(move |id: &str, kind: DefinitionKind| {
                state.borrow().definitions.contains_key(&(kind, id.to_string()))
            })),
        );

        let state = self.state.clone();
        map.insert(
            REGISTER_DELEGATES.to_string(),
            Endpoint::DelegateWrite(Rc::new(move |id: &str, kind: DefinitionKind, delegates: DelegateSet| {
                state
                    .borrow_mut()
                    .delegates
                    .insert((kind, id.to_string()), delegates);
                notify(&state, kind, id, UpdateKind::DelegatesUpdated);
            })),
        );

        let state = self.state.clone();
        map.insert(
            GET_DELEGATES.to_string(),
            Endpoint::DelegateRead(Rc::new(move |id: &str, kind: DefinitionKind| {
                state.borrow().delegates.get(&(kind, id.to_string())).cloned()
            })),
        );

        let state = self.state.clone();
        map.insert(
            REGISTER_ON_UPDATE.to_string(),
            Endpoint::UpdateSubscription(Rc::new(move |kind: DefinitionKind, callback: UpdateCallback| {
                state
                    .borrow_mut()
                    .subscribers
                    .entry(kind)
                    .or_default()
                    .push(callback);
            })),
        );

        let state = self.state.clone();
        map.insert(
            UNREGISTER_ON_UPDATE.to_string(),
            Endpoint::UpdateSubscription(Rc::new(move |kind: DefinitionKind, callback: UpdateCallback| {
                if let Some(subscribers) = state.borrow_mut().subscribers.get_mut(&kind) {
                    subscribers.retain(|existing| !Rc::ptr_eq(existing, &callback));
                }
            })),
        );

        let state = self.state.clone();
        map.insert(
            LOG_DEBUG.to_string(),
            Endpoint::Log(Rc::new(move |text: &str| {
                debug!("{}", text);
                state.borrow_mut().log.push(text.to_string());
            })),
        );

        let state = self.state.clone();
        map.insert(
            LOG_INFO.to_string(),
            Endpoint::Log(Rc::new(move |text: &str| {
                info!("{}", text);
                state.borrow_mut().log.push(text.to_string());
            })),
        );

        map
    }

    /// Answer to an endpoint request
    pub fn discovery_response(&self) -> ModMessage {
        ModMessage::endpoints(self.version, self.endpoint_map())
    }

    /// Notice sent when the registry unloads
    pub fn unload_message(&self) -> ModMessage {
        ModMessage::unload(self.version)
    }

    /// Deliver everything queued on `channel`.
    ///
    /// Channel traffic is broadcast, so the subscriber sees its own requests
    /// too. Each endpoint request is answered with a discovery response.
    /// Returns the number of messages delivered.
    pub fn pump<F>(&self, channel: &LoopbackChannel, mut deliver: F) -> Result<usize, ApiError>
    where
        F: FnMut(&ModMessage) -> Result<(), ApiError>,
    {
        let mut delivered = 0;
        for (id, message) in channel.take_outbox() {
            if id != API_CHANNEL || !channel.is_subscribed(id) {
                continue;
            }

            deliver(&message)?;
            delivered += 1;

            if message.is_endpoint_request() {
                deliver(&self.discovery_response())?;
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    pub fn definition_count(&self) -> usize {
        self.state.borrow().definitions.len()
    }

    pub fn has_delegates(&self, kind: DefinitionKind, id: &str) -> bool {
        self.state.borrow().delegates.contains_key(&(kind, id.to_string()))
    }

    pub fn subscriber_count(&self, kind: DefinitionKind) -> usize {
        self.state
            .borrow()
            .subscribers
            .get(&kind)
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Lines written through the log endpoints
    pub fn log_lines(&self) -> Vec<String> {
        self.state.borrow().log.clone()
    }
}

/// Call subscribers without holding the registry borrow, so they may call back in.
fn notify(state: &Rc<RefCell<RegistryState>>, kind: DefinitionKind, id: &str, update: UpdateKind) {
    let subscribers = state
        .borrow()
        .subscribers
        .get(&kind)
        .cloned()
        .unwrap_or_default();
    for subscriber in subscribers {
        subscriber(id, update);
    }
}

/// Channel that queues sent messages until a host pumps them
#[derive(Default)]
pub struct LoopbackChannel {
    subscriptions: RefCell<HashSet<i64>>,
    outbox: RefCell<VecDeque<(i64, ModMessage)>>,
    shown: RefCell<Vec<(String, String)>>,
}

impl LoopbackChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_subscribed(&self, channel: i64) -> bool {
        self.subscriptions.borrow().contains(&channel)
    }

    pub fn pending(&self) -> usize {
        self.outbox.borrow().len()
    }

    pub fn take_outbox(&self) -> Vec<(i64, ModMessage)> {
        self.outbox.borrow_mut().drain(..).collect()
    }

    /// Messages shown to the player as (sender, text)
    pub fn shown_messages(&self) -> Vec<(String, String)> {
        self.shown.borrow().clone()
    }
}

impl ModChannel for LoopbackChannel {
    fn register_handler(&self, channel: i64) {
        self.subscriptions.borrow_mut().insert(channel);
    }

    fn unregister_handler(&self, channel: i64) {
        self.subscriptions.borrow_mut().remove(&channel);
    }

    fn send(&self, channel: i64, message: ModMessage) {
        self.outbox.borrow_mut().push_back((channel, message));
    }

    fn show_message(&self, sender: &str, text: &str) {
        self.shown
            .borrow_mut()
            .push((sender.to_string(), text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn call_write(map: &EndpointMap, id: &str, kind: DefinitionKind, data: &[u8]) {
        match map.get(REGISTER_DEFINITION) {
            Some(Endpoint::DefinitionWrite(f)) => f(id, kind, data),
            other => panic!("unexpected endpoint {:?}", other),
        }
    }

    #[test]
    fn test_endpoint_map_is_complete() {
        let map = LocalHost::new().endpoint_map();
        for (name, signature) in deteq_protocol::EXPECTED_ENDPOINTS {
            assert_eq!(map.get(name).map(|e| e.signature()), Some(signature), "{}", name);
        }
    }

    #[test]
    fn test_store_and_notify() {
        let host = LocalHost::new();
        let map = host.endpoint_map();

        let updates = Rc::new(Cell::new(0));
        let seen = updates.clone();
        let callback: UpdateCallback = Rc::new(move |_id: &str, kind: UpdateKind| {
            assert_eq!(kind, UpdateKind::Updated);
            seen.set(seen.get() + 1);
        });
        match map.get(REGISTER_ON_UPDATE) {
            Some(Endpoint::UpdateSubscription(f)) => f(DefinitionKind::Sensor, callback),
            other => panic!("unexpected endpoint {:?}", other),
        }

        call_write(&map, "Radar", DefinitionKind::Sensor, &[1, 2, 3]);
        call_write(&map, "Jammer", DefinitionKind::Countermeasure, &[4]);

        assert_eq!(host.definition_count(), 2);
        assert_eq!(updates.get(), 1);
    }

    #[test]
    fn test_pump_answers_requests_on_subscribed_channel() {
        let host = LocalHost::new();
        let channel = LoopbackChannel::new();
        channel.register_handler(API_CHANNEL);
        channel.send(API_CHANNEL, ModMessage::endpoint_request());
        channel.send(API_CHANNEL + 1, ModMessage::endpoint_request());

        let mut kinds = Vec::new();
        let delivered = host
            .pump(&channel, |message| {
                kinds.push(matches!(message, ModMessage::Endpoints(_)));
                Ok(())
            })
            .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(kinds, vec![false, true]);
        assert_eq!(channel.pending(), 0);
    }

    #[test]
    fn test_pump_skips_unsubscribed_channel() {
        let host = LocalHost::new();
        let channel = LoopbackChannel::new();
        channel.send(API_CHANNEL, ModMessage::endpoint_request());

        let delivered = host.pump(&channel, |_| Ok(())).unwrap();
        assert_eq!(delivered, 0);
    }
}
