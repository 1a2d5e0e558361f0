//=========================================================================
// Platform Visibility Adapter
//=========================================================================
//
// Maps winit window events to the coordinator's visibility input.
//
// Visibility is owned by the platform; the governor only consumes it.
// Embedders forward each hint to `set_visible`:
//
//   if let Some(visible) = visibility_hint(&event) {
//       governor.set_visible(visible);
//   }
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::event::WindowEvent;

//=== Public API ==========================================================

/// Extracts a visibility edge from a window event, if it carries one.
///
/// An occluded window is treated as hidden. Events without visibility
/// meaning yield `None` and must leave the governor untouched.
pub fn visibility_hint(event: &WindowEvent) -> Option<bool> {
    match event {
        WindowEvent::Occluded(occluded) => Some(!occluded),
        _ => None,
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
