//! The ordered pattern table behind the collection game.
//!
//! A single table drives both questions asked about a freshly generated
//! code: "is it worth collecting at all?" ([`is_special`]) and "how rare is
//! it?" ([`classify`]). Keeping one table rules out the two answers ever
//! drifting apart. Evaluation is first-match-wins, so catalog order encodes
//! priority: legendary exact matches first, then epic, then rare, then the
//! common prefix/suffix families.

use serde::{Deserialize, Serialize};

/// Collectability tier of a matched code. Display-only, not security
/// relevant.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// All tiers, in ascending order of rarity.
    pub const ALL: [Rarity; 4] = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];
}

impl std::fmt::Display for Rarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rarity::Common => f.write_str("Common"),
            Rarity::Rare => f.write_str("Rare"),
            Rarity::Epic => f.write_str("Epic"),
            Rarity::Legendary => f.write_str("Legendary"),
        }
    }
}

/// A fixed-string anchor a code is tested against.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Pattern {
    /// The whole code equals the given digits.
    Exact(&'static str),
    /// The code starts with the given digits.
    Prefix(&'static str),
    /// The code ends with the given digits.
    Suffix(&'static str),
}

impl Pattern {
    pub fn matches(&self, code: &str) -> bool {
        match self {
            Pattern::Exact(digits) => code == *digits,
            Pattern::Prefix(digits) => code.starts_with(digits),
            Pattern::Suffix(digits) => code.ends_with(digits),
        }
    }
}

/// One row of the catalog: pattern, tier, display label.
#[derive(Debug, Copy, Clone)]
pub struct Rule {
    pub pattern: Pattern,
    pub rarity: Rarity,
    pub description: &'static str,
}

const fn rule(pattern: Pattern, rarity: Rarity, description: &'static str) -> Rule {
    Rule {
        pattern,
        rarity,
        description,
    }
}

use Pattern::{Exact, Prefix, Suffix};
use Rarity::{Common, Epic, Legendary, Rare};

/// The catalog. Order is load-bearing: the first matching rule wins.
pub const RULES: &[Rule] = &[
    // Legendary
    rule(Exact("123456"), Legendary, "The Ultimate Sequence"),
    rule(Exact("654321"), Legendary, "Reverse Engineering"),
    rule(Exact("000000"), Legendary, "The Void"),
    rule(Exact("999999"), Legendary, "Maximum Overdrive"),
    // Epic
    rule(Exact("111111"), Epic, "All Ones Club"),
    rule(Exact("222222"), Epic, "Double Trouble"),
    rule(Exact("333333"), Epic, "Triple Threat"),
    rule(Exact("444444"), Epic, "Quad Squad"),
    rule(Exact("555555"), Epic, "High Five"),
    rule(Exact("666666"), Epic, "Devil's Number"),
    rule(Exact("777777"), Epic, "Lucky Sevens"),
    rule(Exact("888888"), Epic, "Infinity Loop"),
    rule(Exact("012345"), Epic, "Count Up"),
    rule(Exact("543210"), Epic, "Count Down"),
    // Rare
    rule(Exact("123123"), Rare, "Echo Pattern"),
    rule(Exact("321321"), Rare, "Reverse Echo"),
    rule(Exact("112233"), Rare, "Double Pairs"),
    rule(Exact("332211"), Rare, "Reverse Pairs"),
    rule(Exact("121212"), Rare, "Alternating Beat"),
    rule(Exact("212121"), Rare, "Reverse Beat"),
    // Common starts
    rule(Prefix("123"), Common, "Started Strong"),
    rule(Prefix("321"), Common, "Reverse Start"),
    rule(Prefix("111"), Common, "Triple One Start"),
    rule(Prefix("222"), Common, "Triple Two Start"),
    rule(Prefix("333"), Common, "Triple Three Start"),
    rule(Prefix("444"), Common, "Triple Four Start"),
    rule(Prefix("555"), Common, "Triple Five Start"),
    rule(Prefix("666"), Common, "Triple Six Start"),
    rule(Prefix("777"), Common, "Triple Seven Start"),
    rule(Prefix("888"), Common, "Triple Eight Start"),
    rule(Prefix("999"), Common, "Triple Nine Start"),
    rule(Prefix("000"), Common, "Triple Zero Start"),
    // Common finishes
    rule(Suffix("123"), Common, "Strong Finish"),
    rule(Suffix("321"), Common, "Reverse Finish"),
    rule(Suffix("111"), Common, "Triple One Finish"),
    rule(Suffix("222"), Common, "Triple Two Finish"),
    rule(Suffix("333"), Common, "Triple Three Finish"),
    rule(Suffix("444"), Common, "Triple Four Finish"),
    rule(Suffix("555"), Common, "Triple Five Finish"),
    rule(Suffix("666"), Common, "Triple Six Finish"),
    rule(Suffix("777"), Common, "Triple Seven Finish"),
    rule(Suffix("888"), Common, "Triple Eight Finish"),
    rule(Suffix("999"), Common, "Triple Nine Finish"),
    rule(Suffix("000"), Common, "Triple Zero Finish"),
];

/// Whether a generated code is collectable at all.
pub fn is_special(code: &str) -> bool {
    RULES.iter().any(|r| r.pattern.matches(code))
}

/// Tier and label for a code, first-match-wins over [`RULES`].
///
/// Codes that reach the ledger without matching any rule fall back to
/// `(Common, "Special Pattern")`. Pure, so replaying a collection after a
/// reset reproduces identical rarities.
pub fn classify(code: &str) -> (Rarity, &'static str) {
    RULES
        .iter()
        .find(|r| r.pattern.matches(code))
        .map(|r| (r.rarity, r.description))
        .unwrap_or((Rarity::Common, "Special Pattern"))
}
