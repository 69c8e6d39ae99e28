pub mod auth;
pub mod bookings;
pub mod buses;

use serde::Serialize;

/// Plain `{"message": ...}` body for operations that return no entity
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
