//! Install descriptor assembly and submission.
//!
//! Installing a package version runs a fixed pipeline:
//! 1. Load the option schema (`config.json`)
//! 2. Collect property defaults from the schema
//! 3. Overlay user options
//! 4. Validate the merged options against the schema
//! 5. Render the install template with the options
//! 6. Label the descriptor with the package name and version
//! 7. Hand the descriptor to the init client

pub mod client;
pub mod planner;
pub mod render;

pub use client::{InitClient, InstalledPackage, list_installed_packages, uninstall_package};
pub use planner::{
    InstallPlanner, PACKAGE_NAME_LABEL, PACKAGE_VERSION_LABEL, add_package_labels,
    extract_defaults, merge_options, validate_options,
};
pub use render::render_template;
