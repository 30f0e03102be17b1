//! HTTP handlers

mod auth;
mod category;
mod journal;
mod lab;
mod order;
mod party;
mod purchase;
mod recipe;
mod reference;
mod shipment;

pub use auth::*;
pub use category::*;
pub use journal::*;
pub use lab::*;
pub use order::*;
pub use party::*;
pub use purchase::*;
pub use recipe::*;
pub use reference::*;
pub use shipment::*;
