pub mod loader;
pub mod provider;
pub mod settings;
