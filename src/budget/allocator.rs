//=========================================================================
// Particle Budget Allocator
//=========================================================================
//
// Ledger of concurrent-particle capacity shared by every visual effect
// producer in one tab.
//
// Architecture:
//   producers → allocate(category, n) ──► nominal path (headroom + ceiling)
//                        │
//                        └─ priority path (UiCritical, EmotesLegendary):
//                           plan reclaim lowest-priority-first, commit
//                           only if the plan covers the whole shortfall
//
// Failure is a boolean, never an error: producers respond by spawning
// fewer or zero particles. Reclaim is transactional: a failed request
// leaves every category's usage untouched.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, trace, warn};

//=== Internal Dependencies ===============================================

use super::category::{ParticleCategory, CATEGORY_COUNT, GLOBAL_PARTICLE_CEILING};

//=== ParticleBudgetAllocator =============================================

/// Arbitrates the shared particle budget across effect categories.
///
/// Purely synchronous in-memory state; one instance per tab, pumped from
/// the tab's single event loop. Usage is mutated only by [`allocate`],
/// [`deallocate`], and [`reset`].
///
/// A priority category's usage may legitimately exceed its nominal budget
/// after a reclaim (`UiCritical` has a nominal budget of 0 and borrows
/// everything it holds).
///
/// [`allocate`]: ParticleBudgetAllocator::allocate
/// [`deallocate`]: ParticleBudgetAllocator::deallocate
/// [`reset`]: ParticleBudgetAllocator::reset
pub struct ParticleBudgetAllocator {
    usage: [u32; CATEGORY_COUNT],
}

impl ParticleBudgetAllocator {
    //--- Construction -----------------------------------------------------

    /// Creates an allocator with every category's usage at zero.
    pub fn new() -> Self {
        Self {
            usage: [0; CATEGORY_COUNT],
        }
    }

    //--- Allocation -------------------------------------------------------

    /// Requests capacity for `count` particles in `category`.
    ///
    /// Succeeds on the nominal path when the category's own headroom and
    /// the global ceiling both admit the request. When nominal headroom is
    /// insufficient, priority categories reclaim the shortfall from
    /// strictly lower-priority categories, lowest first; non-priority
    /// categories simply fail.
    ///
    /// Returns `false` with no state change when the request cannot be
    /// satisfied. Callers degrade (spawn fewer or zero particles) rather
    /// than retry. `count == 0` is a successful no-op.
    pub fn allocate(&mut self, category: ParticleCategory, count: u32) -> bool {
        if count == 0 {
            return true;
        }

        let headroom = self.available(category);
        if count <= headroom && self.total_usage() + count <= GLOBAL_PARTICLE_CEILING {
            self.usage[category.index()] += count;
            trace!(
                target: "governor::budget",
                "allocated {} to {} (usage {})",
                count,
                category.as_str(),
                self.usage[category.index()]
            );
            return true;
        }

        if !category.is_priority() {
            debug!(
                target: "governor::budget",
                "refused {} for {}: headroom {}",
                count,
                category.as_str(),
                headroom
            );
            return false;
        }

        self.allocate_with_reclaim(category, count, headroom)
    }

    /// Priority path: plan a reclaim covering the shortfall, then commit.
    ///
    /// The plan is computed without mutating usage so a failed request
    /// leaves the ledger exactly as it was. Victims are raided lowest
    /// priority first, each losing at most its current usage; categories
    /// at or above the requester's rank are never touched.
    fn allocate_with_reclaim(
        &mut self,
        category: ParticleCategory,
        count: u32,
        headroom: u32,
    ) -> bool {
        let mut shortfall = count - headroom;
        let mut plan: [u32; CATEGORY_COUNT] = [0; CATEGORY_COUNT];

        for victim in ParticleCategory::RECLAIM_ORDER {
            if shortfall == 0 {
                break;
            }
            if victim.rank() >= category.rank() {
                continue;
            }
            let take = self.usage[victim.index()].min(shortfall);
            plan[victim.index()] = take;
            shortfall -= take;
        }

        if shortfall > 0 {
            debug!(
                target: "governor::budget",
                "refused {} for {}: {} short even after reclaim",
                count,
                category.as_str(),
                shortfall
            );
            return false;
        }

        for victim in ParticleCategory::RECLAIM_ORDER {
            let take = plan[victim.index()];
            if take > 0 {
                self.usage[victim.index()] -= take;
                warn!(
                    target: "governor::budget",
                    "reclaimed {} from {} for {}",
                    take,
                    victim.as_str(),
                    category.as_str()
                );
            }
        }
        self.usage[category.index()] += count;
        true
    }

    /// Returns `count` particles in `category`; saturates at zero and
    /// never fails.
    pub fn deallocate(&mut self, category: ParticleCategory, count: u32) {
        let usage = &mut self.usage[category.index()];
        *usage = usage.saturating_sub(count);
    }

    //--- Observation ------------------------------------------------------

    /// Nominal headroom for `category`.
    ///
    /// Reflects the category's own budget only; it says nothing about
    /// borrowing potential, and the global ceiling may further constrain
    /// an actual allocation.
    pub fn available(&self, category: ParticleCategory) -> u32 {
        category.budget().saturating_sub(self.usage[category.index()])
    }

    /// Current usage for `category`.
    pub fn usage(&self, category: ParticleCategory) -> u32 {
        self.usage[category.index()]
    }

    /// Sum of all categories' usage.
    pub fn total_usage(&self) -> u32 {
        self.usage.iter().sum()
    }

    //--- Lifecycle --------------------------------------------------------

    /// Zeroes every category's usage; budgets are unchanged.
    pub fn reset(&mut self) {
        self.usage = [0; CATEGORY_COUNT];
        debug!(target: "governor::budget", "ledger reset");
    }
}

impl Default for ParticleBudgetAllocator {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
