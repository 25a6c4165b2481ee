//! Achievements unlocked by collection milestones.
//!
//! The catalog is data, not code: each achievement is a descriptor pairing
//! display fields with a [`Condition`] that is evaluated generically against
//! the live collection map. Conditions are re-derived from ledger state on
//! every evaluation (never cached), so replaying a collection after a reset
//! unlocks exactly the same set. An unlocked achievement never re-fires and
//! never reverts; `unlocked_at` is stamped in the same step as the flag.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::collection::CollectedSequence;
use crate::rules::Rarity;

/// Unlock predicate, evaluated against the current collection.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Condition {
    /// At least this many distinct codes collected.
    DistinctAtLeast(usize),
    /// At least one collected code of this rarity.
    RarityFound(Rarity),
    /// This exact code is in the collection.
    CodeCollected(&'static str),
    /// Some collected code contains this substring.
    CodeContaining(&'static str),
}

impl Condition {
    /// Whether the predicate holds for `collection`. Pure; no memory of
    /// earlier evaluations.
    pub fn holds(&self, collection: &BTreeMap<String, CollectedSequence>) -> bool {
        match self {
            Condition::DistinctAtLeast(n) => collection.len() >= *n,
            Condition::RarityFound(rarity) => {
                collection.values().any(|seq| seq.rarity == *rarity)
            }
            Condition::CodeCollected(code) => collection.contains_key(*code),
            Condition::CodeContaining(digits) => {
                collection.keys().any(|code| code.contains(*digits))
            }
        }
    }
}

/// Catalog row: display fields plus the unlock condition.
#[derive(Debug, Copy, Clone)]
pub struct AchievementSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub condition: Condition,
}

/// The fixed catalog, defined once at compile time.
pub const CATALOG: &[AchievementSpec] = &[
    AchievementSpec {
        id: "first-special",
        name: "First Contact",
        description: "Collect your first special sequence",
        icon: "🎯",
        condition: Condition::DistinctAtLeast(1),
    },
    AchievementSpec {
        id: "collector-5",
        name: "Pattern Hunter",
        description: "Collect 5 different special sequences",
        icon: "🏹",
        condition: Condition::DistinctAtLeast(5),
    },
    AchievementSpec {
        id: "collector-10",
        name: "Sequence Master",
        description: "Collect 10 different special sequences",
        icon: "🏆",
        condition: Condition::DistinctAtLeast(10),
    },
    AchievementSpec {
        id: "collector-25",
        name: "Grand Archivist",
        description: "Collect 25 different special sequences",
        icon: "📚",
        condition: Condition::DistinctAtLeast(25),
    },
    AchievementSpec {
        id: "rare-finder",
        name: "Rare Spotter",
        description: "Find your first rare sequence",
        icon: "💎",
        condition: Condition::RarityFound(Rarity::Rare),
    },
    AchievementSpec {
        id: "epic-finder",
        name: "Epic Hunter",
        description: "Find your first epic sequence",
        icon: "⚡",
        condition: Condition::RarityFound(Rarity::Epic),
    },
    AchievementSpec {
        id: "legendary-finder",
        name: "Legend Seeker",
        description: "Find your first legendary sequence",
        icon: "👑",
        condition: Condition::RarityFound(Rarity::Legendary),
    },
    AchievementSpec {
        id: "lucky-seven",
        name: "Lucky Number",
        description: "Collect the 777777 sequence",
        icon: "🍀",
        condition: Condition::CodeCollected("777777"),
    },
    AchievementSpec {
        id: "ultimate-sequence",
        name: "The Ultimate",
        description: "Collect the legendary 123456 sequence",
        icon: "🌟",
        condition: Condition::CodeCollected("123456"),
    },
    AchievementSpec {
        id: "agent-007",
        name: "Secret Agent",
        description: "Collect any sequence containing 007",
        icon: "🕶️",
        condition: Condition::CodeContaining("007"),
    },
];

/// Unlock state for one catalog entry, as persisted and displayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    fn locked(spec: &AchievementSpec) -> Achievement {
        Achievement {
            id: spec.id.to_string(),
            name: spec.name.to_string(),
            description: spec.description.to_string(),
            icon: spec.icon.to_string(),
            unlocked: false,
            unlocked_at: None,
        }
    }
}

/// The full catalog in its locked state.
pub fn initial() -> Vec<Achievement> {
    CATALOG.iter().map(Achievement::locked).collect()
}

/// Merge persisted unlock state onto the compiled catalog.
///
/// The catalog is the source of truth for which achievements exist and what
/// they say; only the unlock flag and timestamp survive from storage. Stored
/// ids the catalog no longer carries are dropped, new catalog entries start
/// locked.
pub fn hydrate(stored: Vec<Achievement>) -> Vec<Achievement> {
    let mut achievements = initial();
    for achievement in &mut achievements {
        if let Some(previous) = stored.iter().find(|s| s.id == achievement.id) {
            if previous.unlocked {
                achievement.unlocked = true;
                achievement.unlocked_at = previous.unlocked_at;
            }
        }
    }
    achievements
}

/// Evaluate every locked achievement against `collection`, unlocking the
/// ones whose condition now holds. Returns the ids unlocked by this call.
pub fn evaluate(
    achievements: &mut [Achievement],
    collection: &BTreeMap<String, CollectedSequence>,
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut unlocked = Vec::new();
    for (achievement, spec) in achievements.iter_mut().zip(CATALOG) {
        if !achievement.unlocked && spec.condition.holds(collection) {
            achievement.unlocked = true;
            achievement.unlocked_at = Some(now);
            unlocked.push(achievement.id.clone());
        }
    }
    unlocked
}
