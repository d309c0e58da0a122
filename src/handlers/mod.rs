pub mod auth;
pub mod health;
pub mod nutrition;
pub mod sessions;
pub mod stats;
pub mod workouts;
pub mod ws;
