//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use render_governor::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Governor facade
pub use crate::governor::{GovernorBuilder, RenderGovernor};

// Tab ownership
pub use crate::ownership::{
    MemorySessionStore, OwnershipState, SessionStore, TabId, TabOwnershipCoordinator,
};

// Particle budget
pub use crate::budget::{ParticleBudgetAllocator, ParticleCategory, GLOBAL_PARTICLE_CEILING};

// Broadcast transport
pub use crate::bus::{BroadcastHub, BusChannel, BusError};

// Platform adapter
pub use crate::platform::visibility_hint;
