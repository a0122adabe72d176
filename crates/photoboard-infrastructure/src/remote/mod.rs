//! Remote channel implementations.

mod hub;

pub use hub::RemoteHub;
