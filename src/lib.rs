//=========================================================================
// Render Governor — Library Root
//
// This crate defines the public API surface of the rendering-resource
// governor.
//
// Responsibilities:
// - Expose the per-tab service object (`RenderGovernor`)
// - Group the two coordination mechanisms into their subsystems
//   (`ownership` for cross-tab election, `budget` for the particle
//   ledger) with the in-process broadcast transport in `bus`
// - Keep the winit adapter thin and separate in `platform`
//
// Typical usage:
// ```no_run
// use render_governor::RenderGovernor;
//
// let mut governor = RenderGovernor::builder().build();
// governor.initialize();
// governor.set_visible(true);
// loop {
//     governor.poll();
//     if !governor.should_pause_animations() {
//         // advance physics, draw
//     }
// #   break;
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `ownership` and `budget` hold the two coordination mechanisms; both are
// independently usable leaves. `bus` is the broadcast transport the
// ownership protocol rides on; `platform` maps winit events to the
// coordinator's visibility input.
//
pub mod budget;
pub mod bus;
pub mod ownership;
pub mod platform;

pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `governor` defines the facade tying one coordinator and one allocator
// to a session lifetime; only its types are part of the public surface.
//
mod governor;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the facade as the main entry point, so users can simply
// `use render_governor::RenderGovernor;` without knowing the internal
// module structure.
//
pub use governor::{GovernorBuilder, RenderGovernor};
