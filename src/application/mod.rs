// Application layer - composition and the call surface used by clients.

pub mod config;
pub mod controller;
pub mod session;
pub mod singleton;

pub use config::*;
pub use controller::*;
pub use session::*;
pub use singleton::AccountSlot;
