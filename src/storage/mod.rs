pub mod cloudinary;
pub mod local;
pub mod provider;

pub use cloudinary::CloudinaryStorage;
pub use local::LocalStorage;
pub use provider::*;

use std::sync::Arc;

use crate::config::{AssetProvider, Config};

/// Build the asset store selected by configuration
pub fn from_config(config: &Config) -> Arc<dyn AssetStore> {
    let assets = &config.assets;
    match assets.provider {
        AssetProvider::Local => Arc::new(LocalStorage::new(
            &assets.local_path,
            &assets.public_base_url,
            &assets.folder,
        )),
        AssetProvider::Cloudinary => {
            Arc::new(CloudinaryStorage::new(&config.cloudinary, &assets.folder))
        }
    }
}
