// Observer side of the account: the hub that fans events out and the
// listener variants that react to them.

mod hub;
mod listeners;
mod sink;

pub use hub::*;
pub use listeners::*;
pub use sink::*;
