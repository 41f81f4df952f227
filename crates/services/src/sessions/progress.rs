use serde::Serialize;

/// Aggregated view of session progress, useful for front ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub score: u32,
    pub max_score: u32,
    pub eliminate_two_available: bool,
    pub skip_available: bool,
    pub is_complete: bool,
}
