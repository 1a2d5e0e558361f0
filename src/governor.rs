//=========================================================================
// Render Governor
//
// Main entry point: one explicitly constructed service object per tab,
// owning the two coordination mechanisms.
//
// Architecture:
// ```text
//     GovernorBuilder  ──build()──>  RenderGovernor
//         │                             ├─ ownership: TabOwnershipCoordinator
//         ├─ with_hub()                 └─ particles: ParticleBudgetAllocator
//         ├─ with_tab_id()
//         └─ with_request_timeout()
// ```
//
// The governor replaces the module-level singleton pattern: its lifetime
// is tied to the owning session, and consumers receive it by reference.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::info;

//=== Internal Dependencies ===============================================

use crate::budget::ParticleBudgetAllocator;
use crate::bus::BroadcastHub;
use crate::ownership::{TabId, TabOwnershipCoordinator, DEFAULT_REQUEST_TIMEOUT};

//=== GovernorBuilder =====================================================

/// Builder for configuring and constructing a [`RenderGovernor`].
///
/// # Default Values
///
/// - **Hub**: a fresh [`BroadcastHub`] (single-tab; share one hub across
///   governors to let tabs see each other)
/// - **Tab identity**: freshly generated (pass one loaded through
///   [`TabId::load_or_generate`] to survive re-initialization)
/// - **Request timeout**: 1000 ms
///
/// # Examples
///
/// ```
/// use render_governor::RenderGovernor;
///
/// let mut governor = RenderGovernor::builder().build();
/// governor.initialize();
/// governor.set_visible(true);
///
/// // Once per frame:
/// governor.poll();
/// if !governor.should_pause_animations() {
///     // advance physics, draw
/// }
/// ```
///
/// Sibling tabs share one hub:
/// ```
/// use render_governor::bus::BroadcastHub;
/// use render_governor::RenderGovernor;
///
/// let hub = BroadcastHub::new();
/// let tab_a = RenderGovernor::builder().with_hub(hub.clone()).build();
/// let tab_b = RenderGovernor::builder().with_hub(hub).build();
/// # let _ = (tab_a, tab_b);
/// ```
pub struct GovernorBuilder {
    hub: BroadcastHub,
    tab_id: Option<TabId>,
    request_timeout: Duration,
}

impl GovernorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            hub: BroadcastHub::new(),
            tab_id: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Sets the broadcast hub shared with sibling tabs.
    ///
    /// Pass [`BroadcastHub::disabled`] to model an environment without
    /// cross-tab messaging; the coordinator then fails open.
    pub fn with_hub(mut self, hub: BroadcastHub) -> Self {
        self.hub = hub;
        self
    }

    /// Sets this tab's identity instead of generating a fresh one.
    pub fn with_tab_id(mut self, tab_id: TabId) -> Self {
        self.tab_id = Some(tab_id);
        self
    }

    /// Sets the window a request waits for a grant before the tab claims
    /// ownership unilaterally.
    ///
    /// # Panics
    ///
    /// Panics if `timeout` is zero.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "Request timeout must be positive");
        self.request_timeout = timeout;
        self
    }

    /// Constructs the governor.
    pub fn build(self) -> RenderGovernor {
        let tab_id = self.tab_id.unwrap_or_else(TabId::generate);
        info!(target: "governor", "governor built for {}", tab_id);

        RenderGovernor {
            ownership: TabOwnershipCoordinator::new(tab_id, self.hub, self.request_timeout),
            particles: ParticleBudgetAllocator::new(),
        }
    }
}

impl Default for GovernorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== RenderGovernor ======================================================

/// Per-tab rendering-resource governor.
///
/// Owns the two coordination mechanisms; neither depends on the other.
/// Animation drivers pump [`poll`] and check [`should_pause_animations`]
/// each frame; particle producers go straight to [`particles`].
///
/// [`poll`]: RenderGovernor::poll
/// [`should_pause_animations`]: RenderGovernor::should_pause_animations
/// [`particles`]: RenderGovernor::particles
pub struct RenderGovernor {
    /// Cross-tab animation ownership.
    pub ownership: TabOwnershipCoordinator,

    /// Shared particle-budget ledger.
    pub particles: ParticleBudgetAllocator,
}

impl RenderGovernor {
    /// Creates a governor with default settings.
    pub fn new() -> Self {
        GovernorBuilder::new().build()
    }

    /// Returns a builder for custom configuration.
    pub fn builder() -> GovernorBuilder {
        GovernorBuilder::new()
    }

    //--- Per-Frame API ----------------------------------------------------

    /// Pumps the ownership protocol; call once per frame.
    pub fn poll(&mut self) {
        self.ownership.poll();
    }

    /// `true` whenever continuous animation/physics work must be skipped.
    pub fn should_pause_animations(&self) -> bool {
        self.ownership.should_pause_animations()
    }

    /// Feeds a visibility edge from the platform.
    pub fn set_visible(&mut self, visible: bool) {
        self.ownership.set_visible(visible);
    }

    //--- Lifecycle --------------------------------------------------------

    /// Joins the ownership channel; idempotent.
    pub fn initialize(&mut self) {
        self.ownership.initialize();
    }

    /// Leaves the channel and clears the particle ledger.
    pub fn teardown(&mut self) {
        self.ownership.teardown();
        self.particles.reset();
    }
}

impl Default for RenderGovernor {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::ParticleCategory;
    use crate::ownership::OwnershipState;
    use std::time::Instant;

    //=====================================================================
    // GovernorBuilder Tests
    //=====================================================================

    #[test]
    fn builder_defaults() {
        let builder = GovernorBuilder::new();
        assert_eq!(builder.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert!(builder.tab_id.is_none());
    }

    #[test]
    fn builder_with_request_timeout() {
        let builder = GovernorBuilder::new().with_request_timeout(Duration::from_millis(50));
        assert_eq!(builder.request_timeout, Duration::from_millis(50));
    }

    #[test]
    #[should_panic(expected = "Request timeout must be positive")]
    fn builder_with_request_timeout_panics_on_zero() {
        GovernorBuilder::new().with_request_timeout(Duration::ZERO);
    }

    #[test]
    fn builder_with_tab_id() {
        let governor = GovernorBuilder::new()
            .with_tab_id(TabId::from("tab-7-testing"))
            .build();

        assert_eq!(governor.ownership.tab_id().as_str(), "tab-7-testing");
    }

    #[test]
    fn builder_fluent_api_chaining() {
        let governor = RenderGovernor::builder()
            .with_hub(BroadcastHub::new())
            .with_tab_id(TabId::from("tab-1-chained"))
            .with_request_timeout(Duration::from_millis(250))
            .build();

        assert_eq!(governor.ownership.tab_id().as_str(), "tab-1-chained");
    }

    //=====================================================================
    // RenderGovernor Tests
    //=====================================================================

    #[test]
    fn governor_wires_both_mechanisms() {
        let mut governor = RenderGovernor::new();
        governor.initialize();
        governor.set_visible(true);

        governor
            .ownership
            .poll_at(Instant::now() + DEFAULT_REQUEST_TIMEOUT + Duration::from_millis(10));
        assert!(!governor.should_pause_animations());

        assert!(governor.particles.allocate(ParticleCategory::Fireworks, 30));
        assert_eq!(governor.particles.total_usage(), 30);
    }

    #[test]
    fn teardown_pauses_and_clears_the_ledger() {
        let mut governor = RenderGovernor::new();
        governor.initialize();
        governor.set_visible(true);
        assert!(governor.particles.allocate(ParticleCategory::Theme, 10));

        governor.teardown();

        assert_eq!(governor.ownership.state(), OwnershipState::Paused);
        assert!(governor.should_pause_animations());
        assert_eq!(governor.particles.total_usage(), 0);
    }

    #[test]
    fn governors_sharing_a_hub_see_each_other() {
        let hub = BroadcastHub::new();
        let timeout = Duration::from_millis(100);
        let mut a = RenderGovernor::builder()
            .with_hub(hub.clone())
            .with_request_timeout(timeout)
            .build();
        let mut b = RenderGovernor::builder()
            .with_hub(hub)
            .with_request_timeout(timeout)
            .build();
        a.initialize();
        b.initialize();

        a.set_visible(true);
        a.ownership
            .poll_at(Instant::now() + timeout + Duration::from_millis(10));
        assert_eq!(a.ownership.state(), OwnershipState::Owner);

        // A hides and relinquishes; B claims through its own timeout.
        b.set_visible(true);
        a.poll();
        a.set_visible(false);
        b.ownership
            .poll_at(Instant::now() + timeout + Duration::from_millis(10));

        assert!(a.should_pause_animations());
        assert!(!b.should_pause_animations());
    }
}
