//! Built-in gateway adapters

#[cfg(feature = "keyvalue")]
pub mod keyvalue;

#[cfg(feature = "extension")]
pub mod extension;

#[cfg(feature = "keyvalue")]
pub use keyvalue::KeyValueGateway;

#[cfg(feature = "extension")]
pub use extension::ExtensionGateway;
