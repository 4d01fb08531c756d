//! Configuration section definitions.
//!
//! Each module corresponds to a section in `vaayu.toml`:
//!
//! | Module    | TOML Section  | Purpose                            |
//! |-----------|---------------|------------------------------------|
//! | `build`   | `[build]`     | Output directory, clean flag       |
//! | `bundler` | `[bundler]`   | External asset bundler             |
//! | `serve`   | `[serve]`     | Development server                 |
//! | `site`    | `[site]`      | Site source directory              |

mod build;
mod bundler;
mod serve;
mod site;

pub use build::BuildSectionConfig;
pub use bundler::BundlerConfig;
pub use serve::ServeConfig;
pub use site::SiteSectionConfig;
