pub mod application;
pub mod cli;
pub mod domain;
pub mod io;
pub mod notify;
pub mod observability;

pub use application::{AccountController, Session};
pub use domain::*;
pub use notify::{Listener, NotificationHub};
