pub mod availability;
pub mod booking_request;
pub mod notification;
pub mod preferences;
pub mod session;
pub mod slot_lock;
