pub mod server;
pub mod types;

pub use server::{router, serve, AppState};
pub use types::{DailyRequest, MessageResponse};
