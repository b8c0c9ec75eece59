pub mod availability;
pub mod booking;
pub mod preferences;
pub mod sessions;
