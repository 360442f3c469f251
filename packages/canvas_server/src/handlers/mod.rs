pub mod canvas;
pub mod health;
pub mod websocket;

pub use canvas::{get_backup, get_map};
pub use health::{health_handler, health_live_handler, metrics_handler};
pub use websocket::websocket_handler;
