//! Server-level runtime commands
//!
//! The projection of a domain/host update onto one running server process.
//! The kernel only produces these values; shipping them to the process is
//! the transport layer's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::{ContentHash, InterfaceSpec, PathSpec, SocketBinding, SubsystemConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum ServerUpdate {
    /// Apply one subsystem attribute change to the running server
    ///
    /// A `null` value undefines the attribute.
    WriteSubsystemAttribute {
        subsystem: String,
        attribute: String,
        value: Value,
    },

    AddSubsystem {
        subsystem: SubsystemConfig,
    },

    RemoveSubsystem {
        subsystem: String,
    },

    /// Set or clear (`None`) a system property on the running server
    SetSystemProperty {
        name: String,
        value: Option<String>,
    },

    SetPath {
        path: PathSpec,
    },

    RemovePath {
        name: String,
    },

    SetInterface {
        interface: InterfaceSpec,
    },

    RemoveInterface {
        name: String,
    },

    SetSocketBinding {
        binding: SocketBinding,
    },

    RemoveSocketBinding {
        name: String,
    },

    /// Push deployment content (by hash) and start it if `start`
    Deploy {
        name: String,
        runtime_name: String,
        hash: ContentHash,
        start: bool,
    },

    Undeploy {
        name: String,
    },

    /// Replace already-deployed content in place
    Redeploy {
        name: String,
        runtime_name: String,
        hash: ContentHash,
    },

    AddExtension {
        module: String,
    },

    RemoveExtension {
        module: String,
    },

    /// The change cannot take effect until the server restarts
    ///
    /// Emitted for rewires (profile ref, socket-binding-group ref, port
    /// offset, group membership) so the controller can mark the server's
    /// running configuration as stale.
    RestartRequired,
}
