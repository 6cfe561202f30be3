// Asset loader module for resolving and caching audio assets

pub mod asset_loader;

pub use asset_loader::{AssetInfo, AssetLoader};
