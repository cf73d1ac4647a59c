//! Command and event naming.
//!
//! Commands addressed to a capability namespace follow the
//! `plugin:<namespace>|<action>` form; bare names are reserved for host
//! built-ins. Event names under the `host://` scheme are emitted by the host
//! itself and never by guests.

/// Subscribe to an event stream.
pub const EVENT_LISTEN: &str = "plugin:event|listen";
/// Retire one subscription by token.
pub const EVENT_UNLISTEN: &str = "plugin:event|unlisten";
/// Broadcast an event to every listener.
pub const EVENT_EMIT: &str = "plugin:event|emit";
/// Emit an event to one addressed target.
pub const EVENT_EMIT_TO: &str = "plugin:event|emit-to";

/// Formats a namespaced command name.
pub fn plugin(namespace: &str, action: &str) -> String {
    format!("plugin:{namespace}|{action}")
}

/// Event names published by the host about its own contexts.
pub mod host_event {
    pub const CREATED: &str = "host://created";
    pub const DESTROYED: &str = "host://destroyed";
    pub const FOCUS: &str = "host://focus";
    pub const BLUR: &str = "host://blur";
    pub const RESIZED: &str = "host://resize";
    pub const MOVED: &str = "host://move";
    pub const CLOSE_REQUESTED: &str = "host://close-requested";
    pub const THEME_CHANGED: &str = "host://theme-changed";
    pub const DRAG_ENTER: &str = "host://drag-enter";
    pub const DRAG_OVER: &str = "host://drag-over";
    pub const DRAG_DROP: &str = "host://drag-drop";
    pub const DRAG_LEAVE: &str = "host://drag-leave";
}
