//! Memory growth detection over the whole sample history.

use std::collections::HashSet;

/// Fewer samples than this never signal a leak.
pub const MIN_SAMPLES: usize = 10;

/// Appended to a table row while a leak is suspected.
pub const LEAK_WARNING: &str = " WARNING, potential memory leak detected";

/// Whether the private memory series looks like sustained growth.
///
/// True iff there are at least [`MIN_SAMPLES`] readings, no reading is
/// lower than the one before it, and more than two thirds of the readings
/// are distinct values. The whole history counts, not a recent window, so
/// an early plateau keeps weighing on the distinct ratio for the rest of
/// the run.
pub fn has_potential_memory_leak(memory: &[u64]) -> bool {
    if memory.len() < MIN_SAMPLES {
        return false;
    }

    let non_decreasing = memory.windows(2).all(|pair| pair[0] <= pair[1]);
    if !non_decreasing {
        return false;
    }

    let distinct = memory.iter().collect::<HashSet<_>>().len();
    // distinct > len * 2/3 without floating point
    distinct * 3 > memory.len() * 2
}
