//=========================================================================
// Tab Ownership
//=========================================================================
//
// Cross-tab leader election: identity, wire codec, and the coordinator
// state machine. One coordinator per tab; tabs exchange fire-and-forget
// broadcasts on a single well-known channel.
//
//=========================================================================

//=== Module Declarations =================================================

mod coordinator;
mod message;
mod tab_id;

//=== Public API ==========================================================

pub use coordinator::{
    OwnershipState, TabOwnershipCoordinator, CHANNEL_NAME, DEFAULT_REQUEST_TIMEOUT,
};
pub use message::{MessageKind, OwnershipMessage};
pub use tab_id::{MemorySessionStore, SessionStore, TabId, TAB_ID_KEY};
