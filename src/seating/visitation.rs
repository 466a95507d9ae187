/// Ideal number of visits to each table over all rounds, identical for every
/// player: an even split of rounds across tables with the remainder going to
/// the first tables.
pub fn ideal_visits(num_rounds: usize, num_tables: usize) -> Vec<u32> {
    let base = (num_rounds / num_tables) as u32;
    let remainder = num_rounds % num_tables;
    (0..num_tables)
        .map(|t| base + u32::from(t < remainder))
        .collect()
}

/// The relaxed `[min, max]` visitation window used as a hard constraint by
/// the exact solver: ideal +-1, clamped to `[0, num_rounds]`. The greedy
/// scheduler uses the unrelaxed ideal as a soft preference only.
pub fn visit_window(ideal: u32, num_rounds: usize) -> (u32, u32) {
    let min = ideal.saturating_sub(1);
    let max = (ideal + 1).min(num_rounds as u32);
    (min, max)
}
