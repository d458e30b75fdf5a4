//! Per-event subscriber registry and dispatch.
//!
//! At most one active subscriber per event name; registering again
//! replaces the previous callback. The `connect`/`disconnect` lifecycle
//! pair is synthesized by the state machine rather than forwarded from
//! the wire, and starts out as built-in no-ops so lifecycle transitions
//! never go unhandled.

use foreman_protocol::{
    event_names, LineEvent, LoginEvent, LogoutEvent, OfflineEvent,
    OnlineEvent, RconRunningEvent, StartingEvent, StatusEvent, StoppingEvent,
};
use serde_json::Value;

/// Lifecycle callback: receives the authentication failure reason, or
/// `None` on success.
pub(crate) type ConnectFn = Box<dyn FnMut(Option<&str>) + Send>;
/// Lifecycle callback for link loss.
pub(crate) type DisconnectFn = Box<dyn FnMut() + Send>;
/// Typed event callback: server identifier plus the decoded payload.
pub(crate) type EventFn<T> = Box<dyn FnMut(&str, T) + Send>;
/// Catch-all callback: server identifier, raw event name, raw payload.
pub(crate) type AnyFn = Box<dyn FnMut(&str, &str, &Value) + Send>;

/// The subscriber table. One slot per member of the closed event set.
pub(crate) struct EventHandlers {
    pub(crate) connect: ConnectFn,
    pub(crate) disconnect: DisconnectFn,
    pub(crate) status: Option<EventFn<StatusEvent>>,
    pub(crate) starting: Option<EventFn<StartingEvent>>,
    pub(crate) online: Option<EventFn<OnlineEvent>>,
    pub(crate) stopping: Option<EventFn<StoppingEvent>>,
    pub(crate) offline: Option<EventFn<OfflineEvent>>,
    pub(crate) login: Option<EventFn<LoginEvent>>,
    pub(crate) logout: Option<EventFn<LogoutEvent>>,
    pub(crate) line: Option<EventFn<LineEvent>>,
    pub(crate) rcon_running: Option<EventFn<RconRunningEvent>>,
    pub(crate) any: Option<AnyFn>,
}

impl Default for EventHandlers {
    fn default() -> Self {
        Self {
            connect: Box::new(|_| {}),
            disconnect: Box::new(|| {}),
            status: None,
            starting: None,
            online: None,
            stopping: None,
            offline: None,
            login: None,
            logout: None,
            line: None,
            rcon_running: None,
            any: None,
        }
    }
}

impl EventHandlers {
    /// Fires the synthesized `connect` lifecycle event.
    pub(crate) fn fire_connect(&mut self, error: Option<&str>) {
        (self.connect)(error);
    }

    /// Fires the synthesized `disconnect` lifecycle event.
    pub(crate) fn fire_disconnect(&mut self) {
        (self.disconnect)();
    }

    /// Routes one pushed notification.
    ///
    /// An event with a dedicated subscriber goes to it; everything else
    /// (unsubscribed members of the event set and unknown names alike)
    /// falls through to the catch-all `any` subscriber.
    pub(crate) fn dispatch(&mut self, server_id: &str, name: &str, data: &Value) {
        match name {
            event_names::STATUS if self.status.is_some() => {
                deliver(&mut self.status, server_id, name, data);
            }
            event_names::STARTING if self.starting.is_some() => {
                deliver(&mut self.starting, server_id, name, data);
            }
            event_names::ONLINE if self.online.is_some() => {
                deliver(&mut self.online, server_id, name, data);
            }
            event_names::STOPPING if self.stopping.is_some() => {
                deliver(&mut self.stopping, server_id, name, data);
            }
            event_names::OFFLINE if self.offline.is_some() => {
                deliver(&mut self.offline, server_id, name, data);
            }
            event_names::LOGIN if self.login.is_some() => {
                deliver(&mut self.login, server_id, name, data);
            }
            event_names::LOGOUT if self.logout.is_some() => {
                deliver(&mut self.logout, server_id, name, data);
            }
            event_names::LINE if self.line.is_some() => {
                deliver(&mut self.line, server_id, name, data);
            }
            event_names::RCON_RUNNING if self.rcon_running.is_some() => {
                deliver(&mut self.rcon_running, server_id, name, data);
            }
            _ => match self.any.as_mut() {
                Some(cb) => cb(server_id, name, data),
                None => {
                    tracing::debug!(%server_id, %name, "event with no subscriber");
                }
            },
        }
    }
}

/// Decodes the payload and invokes the subscriber. An undecodable payload
/// is logged and dropped; it never reaches a typed callback.
fn deliver<T: serde::de::DeserializeOwned>(
    slot: &mut Option<EventFn<T>>,
    server_id: &str,
    name: &str,
    data: &Value,
) {
    let Some(cb) = slot.as_mut() else { return };
    match serde_json::from_value::<T>(data.clone()) {
        Ok(payload) => cb(server_id, payload),
        Err(e) => {
            tracing::warn!(%name, error = %e, "dropping undecodable event payload");
        }
    }
}
