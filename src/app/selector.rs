// SPDX-License-Identifier: GPL-3.0-only

//! Activity selector options

use crate::config::{ActivityIndex, Configuration};

/// One selectable activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorOption {
    pub index: ActivityIndex,
    pub label: String,
}

/// One option per configured activity, in configuration order
pub fn options(config: &Configuration) -> Vec<SelectorOption> {
    (0..config.activities().len())
        .filter_map(|i| config.activity_index(i))
        .filter_map(|index| {
            config.activity(index).map(|activity| SelectorOption {
                index,
                label: activity.name.clone(),
            })
        })
        .collect()
}

/// Index after `current`, wrapping
pub fn next(config: &Configuration, current: ActivityIndex) -> Option<ActivityIndex> {
    let len = config.activities().len();
    if len == 0 {
        return None;
    }
    config.activity_index((current.get() + 1) % len)
}

/// Index before `current`, wrapping
pub fn previous(config: &Configuration, current: ActivityIndex) -> Option<ActivityIndex> {
    let len = config.activities().len();
    if len == 0 {
        return None;
    }
    config.activity_index((current.get() + len - 1) % len)
}
