pub mod match_state;
pub mod schedule;
pub mod serialization;
