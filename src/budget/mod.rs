//=========================================================================
// Particle Budget
//=========================================================================
//
// Shared concurrent-particle ledger for one tab: six effect categories
// with a strict priority order, nominal per-category budgets, and a
// global ceiling of 250 live particles. High-priority requests reclaim
// capacity from lower-priority categories rather than being refused.
//
//=========================================================================

//=== Module Declarations =================================================

mod allocator;
mod category;

//=== Public API ==========================================================

pub use allocator::ParticleBudgetAllocator;
pub use category::{ParticleCategory, GLOBAL_PARTICLE_CEILING};
