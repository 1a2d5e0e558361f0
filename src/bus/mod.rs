//=========================================================================
// Broadcast Bus
//=========================================================================
//
// In-process stand-in for the same-origin broadcast channel shared by all
// tabs of one application instance ("origin" = process).
//
// The hub fans string payloads out to every member of a named channel.
// Delivery is strictly best-effort: bounded queues, drop-on-full,
// prune-on-disconnect, no ordering guarantee across members.
//
//=========================================================================

//=== Module Declarations =================================================

mod hub;

//=== Public API ==========================================================

pub use hub::{BroadcastHub, BusChannel, BusError};
