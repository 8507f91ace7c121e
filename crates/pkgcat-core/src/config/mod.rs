//! Configuration access.
//!
//! The core reads settings through [`ConfigProvider`], a dotted-key lookup.
//! Two keys matter to package operations:
//! - `package.sources`: source URIs in resolution order
//! - `package.cache`: path of the cache root
//!
//! [`TomlConfig`] is the file-backed provider:
//!
//! ```toml
//! [package]
//! cache = "/var/pkgcat/cache"
//! sources = [
//!   "file:///Users/me/test-registry",
//!   "git://github.com/mesosphere/universe.git",
//! ]
//! ```

pub mod parser;
pub mod settings;

pub use parser::{TomlConfig, parse_config_file, parse_config_str};
pub use settings::{CACHE_KEY, PackageSettings, SOURCES_KEY};

/// Read-only key/value access to configuration.
pub trait ConfigProvider {
    /// Look up a dotted key such as `package.sources`.
    fn get(&self, key: &str) -> Option<toml::Value>;
}
