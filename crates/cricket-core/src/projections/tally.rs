//! Tally projection - per-option counts and percentages
//!
//! Counts are derived from the recorded choices, never from the cached
//! per-option counts a poll document carries.

use serde::Serialize;

use crate::entities::Decision;
use crate::value_objects::IdentityId;

/// Count and share of one option
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionTally {
    pub name: String,
    pub count: u32,
    /// Share of the total in percent (0.0 to 100.0); 0 when nobody has chosen
    pub percent: f64,
}

/// Aggregated view of a decision's choices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tally {
    /// One entry per option, in option order
    pub options: Vec<OptionTally>,
    pub total: u32,
    /// Option held by the identity the tally was projected for
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_choice: Option<String>,
}

impl Tally {
    /// Look up an option's tally by name
    pub fn get(&self, name: &str) -> Option<&OptionTally> {
        self.options.iter().find(|option| option.name == name)
    }

    /// Count for an option, 0 if unknown
    pub fn count(&self, name: &str) -> u32 {
        self.get(name).map_or(0, |option| option.count)
    }
}

/// Project a decision into per-option counts and percentages
pub fn project(decision: &Decision) -> Tally {
    let counts: Vec<(String, u32)> = decision
        .options
        .iter()
        .map(|option| (option.name.clone(), decision.choices_for(&option.name) as u32))
        .collect();

    let total: u32 = counts.iter().map(|(_, count)| count).sum();

    let options = counts
        .into_iter()
        .map(|(name, count)| OptionTally {
            name,
            count,
            percent: percent_of(count, total),
        })
        .collect();

    Tally {
        options,
        total,
        my_choice: None,
    }
}

/// Project a decision, also reporting what `identity_id` chose
pub fn project_for(decision: &Decision, identity_id: &IdentityId) -> Tally {
    let mut tally = project(decision);
    tally.my_choice = decision
        .choice_of(identity_id)
        .map(|choice| choice.option.clone());
    tally
}

fn percent_of(count: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    f64::from(count) * 100.0 / f64::from(total)
}
