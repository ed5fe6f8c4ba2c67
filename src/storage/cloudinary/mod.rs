//! Cloudinary image storage
//!
//! Signed upload/destroy calls against the Cloudinary REST API.

pub mod client;
pub mod provider;
pub mod signer;

pub use provider::CloudinaryStorage;
