//! Domain models for the ProdFlow platform

mod category;
mod journal;
mod lab;
mod order;
mod party;
mod purchase;
mod recipe;
mod reference;
mod shipment;
mod user;

pub use category::*;
pub use journal::*;
pub use lab::*;
pub use order::*;
pub use party::*;
pub use purchase::*;
pub use recipe::*;
pub use reference::*;
pub use shipment::*;
pub use user::*;
