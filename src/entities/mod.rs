pub mod booking;
pub mod bus;
pub mod user;
