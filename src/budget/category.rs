//=========================================================================
// Particle Category
//=========================================================================
//
// The six fixed effect categories sharing the particle budget, with a
// strict total priority order:
//
//   UiCritical > EmotesLegendary > Fireworks > Drops > Emotes > Theme
//
// Nominal budgets: the four non-priority categories sum to the global
// ceiling (250); both priority categories carry a nominal budget of 0
// and exist only to borrow live capacity from below on demand.
//
//=========================================================================

//=== Constants ===========================================================

/// Global ceiling on concurrently live decorative particles per tab.
pub const GLOBAL_PARTICLE_CEILING: u32 = 250;

/// Number of particle categories.
pub(crate) const CATEGORY_COUNT: usize = 6;

//=== ParticleCategory ====================================================

/// A visual effect producer class competing for the particle budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleCategory {
    /// Score-celebration and other must-show UI feedback.
    UiCritical,

    /// Legendary emote bursts.
    EmotesLegendary,

    /// Firework shows.
    Fireworks,

    /// Drop-pop effects.
    Drops,

    /// Ordinary emote glyphs.
    Emotes,

    /// Ambient theme particles.
    Theme,
}

impl ParticleCategory {
    /// Every category, highest priority first.
    pub const ALL: [Self; CATEGORY_COUNT] = [
        Self::UiCritical,
        Self::EmotesLegendary,
        Self::Fireworks,
        Self::Drops,
        Self::Emotes,
        Self::Theme,
    ];

    /// Reclaim candidates in the order they are raided: lowest priority
    /// first. Priority categories are never victims.
    pub(crate) const RECLAIM_ORDER: [Self; 4] =
        [Self::Theme, Self::Drops, Self::Emotes, Self::Fireworks];

    //--- Queries ----------------------------------------------------------

    /// Priority rank; strictly higher means more important.
    pub fn rank(self) -> u8 {
        match self {
            Self::UiCritical => 5,
            Self::EmotesLegendary => 4,
            Self::Fireworks => 3,
            Self::Drops => 2,
            Self::Emotes => 1,
            Self::Theme => 0,
        }
    }

    /// Nominal per-category capacity.
    pub fn budget(self) -> u32 {
        match self {
            Self::UiCritical => 0,
            Self::EmotesLegendary => 0,
            Self::Fireworks => 100,
            Self::Drops => 50,
            Self::Emotes => 50,
            Self::Theme => 50,
        }
    }

    /// Whether an over-budget request from this category may reclaim
    /// capacity from strictly lower-priority categories.
    pub fn is_priority(self) -> bool {
        matches!(self, Self::UiCritical | Self::EmotesLegendary)
    }

    /// Stable lowercase label, used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UiCritical => "ui_critical",
            Self::EmotesLegendary => "emotes_legendary",
            Self::Fireworks => "fireworks",
            Self::Drops => "drops",
            Self::Emotes => "emotes",
            Self::Theme => "theme",
        }
    }

    /// Dense index into per-category storage.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::UiCritical => 0,
            Self::EmotesLegendary => 1,
            Self::Fireworks => 2,
            Self::Drops => 3,
            Self::Emotes => 4,
            Self::Theme => 5,
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_strict_and_total() {
        for pair in ParticleCategory::ALL.windows(2) {
            assert!(
                pair[0].rank() > pair[1].rank(),
                "{} must outrank {}",
                pair[0].as_str(),
                pair[1].as_str()
            );
        }
    }

    #[test]
    fn non_priority_budgets_sum_to_the_global_ceiling() {
        let sum: u32 = ParticleCategory::ALL
            .iter()
            .filter(|c| !c.is_priority())
            .map(|c| c.budget())
            .sum();

        assert_eq!(sum, GLOBAL_PARTICLE_CEILING);
    }

    #[test]
    fn priority_categories_have_zero_nominal_budget() {
        assert_eq!(ParticleCategory::UiCritical.budget(), 0);
        assert_eq!(ParticleCategory::EmotesLegendary.budget(), 0);
    }

    #[test]
    fn reclaim_order_is_lowest_priority_first() {
        for pair in ParticleCategory::RECLAIM_ORDER.windows(2) {
            assert!(pair[0].rank() < pair[1].rank());
        }
        for victim in ParticleCategory::RECLAIM_ORDER {
            assert!(!victim.is_priority());
        }
    }

    #[test]
    fn indices_are_dense_and_unique() {
        let mut seen = [false; CATEGORY_COUNT];
        for category in ParticleCategory::ALL {
            let i = category.index();
            assert!(!seen[i]);
            seen[i] = true;
        }
    }

    #[test]
    fn labels_match_the_wire_vocabulary() {
        assert_eq!(ParticleCategory::UiCritical.as_str(), "ui_critical");
        assert_eq!(ParticleCategory::EmotesLegendary.as_str(), "emotes_legendary");
        assert_eq!(ParticleCategory::Theme.as_str(), "theme");
    }
}
