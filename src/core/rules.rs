//! Game Rules
//!
//! Derived-stat formulas and character build validation. The data layer uses
//! these when creating characters; turn resolution itself lives with the
//! narrator layer, not here.

use std::collections::HashMap;

/// Points a new character distributes across the four attributes.
pub const ATTRIBUTE_POINT_POOL: i64 = 15;

/// Skills a new character must pick.
pub const REQUIRED_SKILL_PICKS: usize = 3;

/// Talents a new character must pick.
pub const REQUIRED_TALENT_PICKS: usize = 2;

/// Effective Attribute Bonus for a raw attribute score.
pub fn attribute_bonus(score: i64) -> i64 {
    score / 2
}

/// Skill Rank for a raw skill score.
pub fn skill_rank(score: i64) -> i64 {
    score / 4
}

/// Maximum hit points derived from Might.
pub fn max_hp(might_score: i64) -> i64 {
    8 + might_score * 2
}

/// Maximum focus derived from Wits and Presence.
pub fn max_focus(wits_score: i64, presence_score: i64) -> i64 {
    4 + wits_score + presence_score
}

/// Inventory slots derived from Might.
pub fn inventory_slots(might_score: i64) -> i64 {
    8 + might_score
}

/// Validate a new character build against creation rules.
///
/// Attributes must be non-negative and sum to [`ATTRIBUTE_POINT_POOL`],
/// exactly [`REQUIRED_SKILL_PICKS`] skills must carry points, and exactly
/// [`REQUIRED_TALENT_PICKS`] talents must be chosen.
pub fn validate_character_build(
    attributes: &[i64; 4],
    skills: &HashMap<String, i64>,
    talent_count: usize,
) -> Result<(), String> {
    if attributes.iter().any(|&score| score < 0) {
        return Err("attribute scores must be non-negative".to_string());
    }

    let attribute_sum: i64 = attributes.iter().sum();
    if attribute_sum != ATTRIBUTE_POINT_POOL {
        return Err(format!(
            "attributes must sum to {ATTRIBUTE_POINT_POOL}, got {attribute_sum}"
        ));
    }

    let selected_skills = skills.values().filter(|&&score| score > 0).count();
    if selected_skills != REQUIRED_SKILL_PICKS {
        return Err(format!(
            "must select exactly {REQUIRED_SKILL_PICKS} skills, got {selected_skills}"
        ));
    }

    if talent_count != REQUIRED_TALENT_PICKS {
        return Err(format!(
            "must select exactly {REQUIRED_TALENT_PICKS} talents, got {talent_count}"
        ));
    }

    Ok(())
}
