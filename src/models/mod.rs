pub mod user;
pub mod user_stats;
pub mod workout;
