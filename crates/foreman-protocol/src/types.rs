//! Core protocol types for Foreman's wire format.
//!
//! Every type here gets serialized to bytes, sent over the persistent
//! connection to the supervising daemon, and deserialized on the other
//! side. Client-bound and server-bound shapes live together so both ends
//! of the test harness can speak the protocol.

use serde::{Deserialize, Serialize};

use std::fmt;

/// The acknowledgment value that marks a credential handshake as accepted.
///
/// Authentication succeeds only when the supervisor replies with exactly
/// this string — a merely truthy acknowledgment is a failure.
pub const AUTH_OK: &str = "authenticated";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Correlation token matching an emitted command to its acknowledgment.
///
/// Allocated by the client, monotonically increasing, unique for the
/// lifetime of a client handle. `#[serde(transparent)]` keeps it a plain
/// number on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Server status
// ---------------------------------------------------------------------------

/// Lifecycle stage of a managed game-server process.
///
/// Closed enumeration; there is no Unknown/Error member. Whether a server
/// exists at all is the application's concern, not the client's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Process is not running.
    Offline,
    /// Process is booting and not yet accepting players.
    Starting,
    /// Process is up and accepting players.
    Online,
    /// Process is shutting down.
    Stopping,
}

impl fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Offline => "offline",
            Self::Starting => "starting",
            Self::Online => "online",
            Self::Stopping => "stopping",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Whitelist
// ---------------------------------------------------------------------------

/// One whitelist entry as reported by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    /// Stable player identifier.
    pub uuid: String,
    /// Player display name.
    pub name: String,
}

/// A whitelist mutation or query.
///
/// The username travels inside the `Add`/`Remove` variants so an action
/// that needs one cannot be built without it. On the wire this flattens to
/// `action` plus an optional `player` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum WhitelistAction {
    /// Fetch the current entries.
    List,
    /// Add a player by name.
    Add {
        /// Name of the player to add.
        player: String,
    },
    /// Remove a player by name.
    Remove {
        /// Name of the player to remove.
        player: String,
    },
}

// ---------------------------------------------------------------------------
// Client → server
// ---------------------------------------------------------------------------

/// A server-bound command, one per direct request channel.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "Start", "server_id": "mc1" }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Credential handshake. Acknowledged with [`AUTH_OK`] on success and
    /// the raw refusal reason otherwise.
    Authenticate {
        /// Display name identifying this client.
        name: String,
        /// Secret credential.
        key: String,
    },

    /// Start the given server process.
    Start {
        /// Target server identifier.
        server_id: String,
    },

    /// Stop the given server process.
    Stop {
        /// Target server identifier.
        server_id: String,
    },

    /// Feed one line to the server console.
    Console {
        /// Target server identifier.
        server_id: String,
        /// The console line, without a trailing newline.
        line: String,
    },

    /// Query the names of players currently online.
    OnlinePlayers {
        /// Target server identifier.
        server_id: String,
    },

    /// Query the server's lifecycle status.
    Status {
        /// Target server identifier.
        server_id: String,
    },

    /// Query or mutate the server's whitelist.
    Whitelist {
        /// Target server identifier.
        server_id: String,
        /// The action, flattened into this object on the wire.
        #[serde(flatten)]
        action: WhitelistAction,
    },
}

/// The top-level client-bound-to-server-bound wrapper: a command plus the
/// correlation token its acknowledgment must echo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Correlation token echoed by the acknowledgment.
    pub id: RequestId,
    /// The command itself.
    pub command: Command,
}

// ---------------------------------------------------------------------------
// Server → client
// ---------------------------------------------------------------------------

/// A frame delivered by the supervisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// The single reply to an emitted command.
    ///
    /// A present, non-empty `error` always wins: the result is discarded
    /// and the pending request rejects with the error string.
    Ack {
        /// Correlation token of the request being acknowledged.
        id: RequestId,
        /// Operation-specific result, decoded by the caller.
        #[serde(default)]
        result: serde_json::Value,
        /// Failure reason, if the command did not take effect.
        #[serde(default)]
        error: Option<String>,
    },

    /// A pushed notification.
    ///
    /// `name` prefixes the push channels so they are distinguishable from
    /// the direct request channels; `data` stays raw until dispatch so the
    /// catch-all subscriber can observe the verbatim payload.
    Event {
        /// Which managed server the notification concerns.
        server_id: String,
        /// Event name, a member of [`event_names`].
        name: String,
        /// Type-specific payload.
        #[serde(default)]
        data: serde_json::Value,
    },
}

// ---------------------------------------------------------------------------
// Pushed-event payloads
// ---------------------------------------------------------------------------

/// Names of the server-pushed notification channels.
pub mod event_names {
    /// Status transition for a managed server.
    pub const STATUS: &str = "status";
    /// The process began booting.
    pub const STARTING: &str = "starting";
    /// The process is up and accepting players.
    pub const ONLINE: &str = "online";
    /// The process began shutting down.
    pub const STOPPING: &str = "stopping";
    /// The process exited.
    pub const OFFLINE: &str = "offline";
    /// A player joined.
    pub const LOGIN: &str = "login";
    /// A player left.
    pub const LOGOUT: &str = "logout";
    /// One raw console output line.
    pub const LINE: &str = "line";
    /// The server's RCON listener came up.
    pub const RCON_RUNNING: &str = "rconRunning";
}

/// Payload of a `status` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// The status the server transitioned to.
    pub status: ServerStatus,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Payload of a `starting` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Payload of an `online` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Payload of a `stopping` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoppingEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Payload of an `offline` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineEvent {
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Whether the process exited without being asked to stop.
    #[serde(default)]
    pub crashed: bool,
}

/// Payload of a `login` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginEvent {
    /// Name of the player who joined.
    pub player: String,
    /// Remote address the player connected from, when the supervisor
    /// reports it.
    #[serde(default)]
    pub address: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Payload of a `logout` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutEvent {
    /// Name of the player who left.
    pub player: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

/// Payload of a `line` event. The server identifier rides on the frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineEvent {
    /// One console output line, without a trailing newline.
    pub text: String,
}

/// Payload of a `rconRunning` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RconRunningEvent {
    /// Port the RCON listener bound, when the supervisor reports it.
    #[serde(default)]
    pub port: Option<u16>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire format is the contract with the supervisor. These tests
    //! pin the exact JSON shapes our serde attributes produce, because a
    //! mismatch means the daemon can't parse our frames.

    use super::*;

    // =====================================================================
    // RequestId
    // =====================================================================

    #[test]
    fn test_request_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&RequestId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_request_id_display() {
        assert_eq!(RequestId(7).to_string(), "req-7");
    }

    // =====================================================================
    // ServerStatus
    // =====================================================================

    #[test]
    fn test_server_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ServerStatus::Online).unwrap(),
            "\"online\""
        );
        assert_eq!(
            serde_json::to_string(&ServerStatus::Stopping).unwrap(),
            "\"stopping\""
        );
    }

    #[test]
    fn test_server_status_deserializes_from_lowercase() {
        let status: ServerStatus = serde_json::from_str("\"starting\"").unwrap();
        assert_eq!(status, ServerStatus::Starting);
    }

    #[test]
    fn test_server_status_rejects_unknown_value() {
        let result: Result<ServerStatus, _> = serde_json::from_str("\"exploded\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_server_status_display_matches_wire_form() {
        assert_eq!(ServerStatus::Offline.to_string(), "offline");
        assert_eq!(ServerStatus::Online.to_string(), "online");
    }

    // =====================================================================
    // Command — JSON shapes
    // =====================================================================

    #[test]
    fn test_command_authenticate_json_format() {
        let cmd = Command::Authenticate {
            name: "srv-a".into(),
            key: "hunter2".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "Authenticate");
        assert_eq!(json["name"], "srv-a");
        assert_eq!(json["key"], "hunter2");
    }

    #[test]
    fn test_command_start_json_format() {
        let cmd = Command::Start {
            server_id: "mc1".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "Start");
        assert_eq!(json["server_id"], "mc1");
    }

    #[test]
    fn test_command_console_round_trip() {
        let cmd = Command::Console {
            server_id: "mc1".into(),
            line: "say hi".into(),
        };
        let bytes = serde_json::to_vec(&cmd).unwrap();
        let decoded: Command = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(cmd, decoded);
    }

    #[test]
    fn test_command_whitelist_add_flattens_action_and_player() {
        let cmd = Command::Whitelist {
            server_id: "mc1".into(),
            action: WhitelistAction::Add {
                player: "Steve".into(),
            },
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "Whitelist");
        assert_eq!(json["server_id"], "mc1");
        assert_eq!(json["action"], "add");
        assert_eq!(json["player"], "Steve");
    }

    #[test]
    fn test_command_whitelist_list_carries_no_player() {
        let cmd = Command::Whitelist {
            server_id: "mc1".into(),
            action: WhitelistAction::List,
        };
        let json: serde_json::Value = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["action"], "list");
        assert!(json.get("player").is_none());
    }

    #[test]
    fn test_command_whitelist_round_trip() {
        let cmd = Command::Whitelist {
            server_id: "mc1".into(),
            action: WhitelistAction::Remove {
                player: "Alex".into(),
            },
        };
        let bytes = serde_json::to_vec(&cmd).unwrap();
        let decoded: Command = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(cmd, decoded);
    }

    #[test]
    fn test_decode_unknown_command_type_returns_error() {
        let unknown = r#"{"type": "Reboot", "server_id": "mc1"}"#;
        let result: Result<Command, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    // =====================================================================
    // Request
    // =====================================================================

    #[test]
    fn test_request_round_trip() {
        let req = Request {
            id: RequestId(9),
            command: Command::Status {
                server_id: "mc1".into(),
            },
        };
        let bytes = serde_json::to_vec(&req).unwrap();
        let decoded: Request = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(req, decoded);
    }

    // =====================================================================
    // ServerFrame
    // =====================================================================

    #[test]
    fn test_ack_json_format() {
        let frame = ServerFrame::Ack {
            id: RequestId(3),
            result: serde_json::json!(true),
            error: None,
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "Ack");
        assert_eq!(json["id"], 3);
        assert_eq!(json["result"], true);
        assert!(json["error"].is_null());
    }

    #[test]
    fn test_ack_result_defaults_to_null_when_missing() {
        // An ack that only reports an error omits the result entirely.
        let json = r#"{"type": "Ack", "id": 1, "error": "server offline"}"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        match frame {
            ServerFrame::Ack { result, error, .. } => {
                assert!(result.is_null());
                assert_eq!(error.as_deref(), Some("server offline"));
            }
            other => panic!("expected Ack, got {other:?}"),
        }
    }

    #[test]
    fn test_ack_error_defaults_to_none_when_missing() {
        let json = r#"{"type": "Ack", "id": 1, "result": "authenticated"}"#;
        let frame: ServerFrame = serde_json::from_str(json).unwrap();
        match frame {
            ServerFrame::Ack { result, error, .. } => {
                assert_eq!(result, serde_json::json!(AUTH_OK));
                assert!(error.is_none());
            }
            other => panic!("expected Ack, got {other:?}"),
        }
    }

    #[test]
    fn test_event_frame_json_format() {
        let frame = ServerFrame::Event {
            server_id: "mc1".into(),
            name: event_names::LINE.into(),
            data: serde_json::json!({ "text": "Done (3.2s)!" }),
        };
        let json: serde_json::Value = serde_json::to_value(&frame).unwrap();

        assert_eq!(json["type"], "Event");
        assert_eq!(json["server_id"], "mc1");
        assert_eq!(json["name"], "line");
        assert_eq!(json["data"]["text"], "Done (3.2s)!");
    }

    #[test]
    fn test_event_frame_round_trip() {
        let frame = ServerFrame::Event {
            server_id: "mc1".into(),
            name: event_names::STATUS.into(),
            data: serde_json::json!({ "status": "online", "timestamp": 1500 }),
        };
        let bytes = serde_json::to_vec(&frame).unwrap();
        let decoded: ServerFrame = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(frame, decoded);
    }

    // =====================================================================
    // Pushed-event payloads
    // =====================================================================

    #[test]
    fn test_status_event_decodes() {
        let ev: StatusEvent = serde_json::from_str(
            r#"{"status": "online", "timestamp": 1500}"#,
        )
        .unwrap();
        assert_eq!(ev.status, ServerStatus::Online);
        assert_eq!(ev.timestamp, 1500);
    }

    #[test]
    fn test_offline_event_crashed_defaults_false() {
        let ev: OfflineEvent = serde_json::from_str(r#"{"timestamp": 9}"#).unwrap();
        assert!(!ev.crashed);

        let ev: OfflineEvent =
            serde_json::from_str(r#"{"timestamp": 9, "crashed": true}"#).unwrap();
        assert!(ev.crashed);
    }

    #[test]
    fn test_login_event_address_is_optional() {
        let ev: LoginEvent = serde_json::from_str(
            r#"{"player": "Steve", "timestamp": 100}"#,
        )
        .unwrap();
        assert_eq!(ev.player, "Steve");
        assert!(ev.address.is_none());

        let ev: LoginEvent = serde_json::from_str(
            r#"{"player": "Steve", "address": "203.0.113.9", "timestamp": 100}"#,
        )
        .unwrap();
        assert_eq!(ev.address.as_deref(), Some("203.0.113.9"));
    }

    #[test]
    fn test_rcon_running_event_port_is_optional() {
        let ev: RconRunningEvent =
            serde_json::from_str(r#"{"timestamp": 4}"#).unwrap();
        assert!(ev.port.is_none());

        let ev: RconRunningEvent =
            serde_json::from_str(r#"{"port": 25575, "timestamp": 4}"#).unwrap();
        assert_eq!(ev.port, Some(25575));
    }

    #[test]
    fn test_whitelist_entry_round_trip() {
        let entry = WhitelistEntry {
            uuid: "u1".into(),
            name: "Steve".into(),
        };
        let bytes = serde_json::to_vec(&entry).unwrap();
        let decoded: WhitelistEntry = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(entry, decoded);
    }

    // =====================================================================
    // Error cases — malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ServerFrame, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_wrong_shape_returns_error() {
        let wrong = r#"{"name": "hello"}"#;
        let result: Result<ServerFrame, _> = serde_json::from_str(wrong);
        assert!(result.is_err());
    }
}
