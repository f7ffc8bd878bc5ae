// Copyright (c) James Kassemi, SC, US. All rights reserved.

//! Metric-major to window-major reshaping.

use crate::window_map::WindowMap;

/// Turns `[(metric, {window: value})]` into `{window: [(metric, value)]}`.
///
/// Window order follows the first column. Columns are matched positionally
/// when their window ids line up (so duplicated window literals stay
/// distinct) and by id otherwise; windows missing from the first column are
/// appended in the order they are first seen.
pub fn transpose<K, T>(columns: Vec<(K, WindowMap<T>)>) -> WindowMap<Vec<(K, T)>>
where
    K: Clone,
{
    let mut rows: Vec<(String, Vec<(K, T)>)> = Vec::new();
    for (metric, column) in columns {
        // Rows already filled by this column, so repeated ids map one-to-one.
        let mut claimed = vec![false; rows.len()];
        for (position, (window, value)) in column.into_iter().enumerate() {
            let aligned = rows
                .get(position)
                .is_some_and(|(id, _)| *id == window && !claimed[position]);
            let slot = if aligned {
                Some(position)
            } else {
                rows.iter()
                    .zip(&claimed)
                    .position(|((id, _), taken)| *id == window && !taken)
            };
            match slot {
                Some(idx) => {
                    rows[idx].1.push((metric.clone(), value));
                    claimed[idx] = true;
                }
                None => {
                    rows.push((window, vec![(metric.clone(), value)]));
                    claimed.push(true);
                }
            }
        }
    }
    rows.into_iter().collect()
}
