//! Protocol types shared by the client and the transport.

mod address;
mod extension;
mod reply;

pub use address::Address;
pub use extension::{AuthMechanism, Extension};
pub use reply::{Reply, ReplyCode};
