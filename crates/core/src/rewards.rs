//! Loyalty card reward rules

use chrono::{Datelike, NaiveDate};

/// Number of stamps on a full card
pub const CARD_CAPACITY: u32 = 12;

/// A reward unlocked by collecting points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardTier {
    pub points_required: u32,
}

/// Rewards offered on every card
pub const STANDARD_TIERS: [RewardTier; 2] = [
    RewardTier { points_required: 6 },
    RewardTier {
        points_required: CARD_CAPACITY,
    },
];

/// Result of asking whether a reward can be claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Eligible,
    NeedsMorePoints { missing: u32 },
}

/// Check a balance against a tier
pub fn claim(points: u32, tier: RewardTier) -> ClaimOutcome {
    if points >= tier.points_required {
        ClaimOutcome::Eligible
    } else {
        ClaimOutcome::NeedsMorePoints {
            missing: tier.points_required - points,
        }
    }
}

/// Birthday reward: available on the day and month of birth, any year
pub fn birthday_reward_available(birth_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    birth_date.is_some_and(|birth| birth.day() == today.day() && birth.month() == today.month())
}

/// Stamp row for display, filled stamps first
pub fn stamp_card(points: u32) -> String {
    let filled = points.min(CARD_CAPACITY);
    let mut card = "●".repeat(filled as usize);
    card.push_str(&"○".repeat((CARD_CAPACITY - filled) as usize));
    card
}
