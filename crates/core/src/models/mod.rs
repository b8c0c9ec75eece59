pub mod availability;
pub mod booking;
pub mod preferences;
pub mod session;
pub mod slot;
pub mod slot_lock;
