//! Rounding of planner estimates to a single significant digit.

/// Round `count` down to one significant digit when `round` is set.
///
/// `28_603_180` becomes `20_000_000`; values below 10 are returned as-is.
pub fn round_count(count: u64, round: bool) -> u64 {
    if !round || count < 10 {
        return count;
    }
    let magnitude = 10u64.pow(count.ilog10());
    (count / magnitude) * magnitude
}
