//! Path utilities for locating installed platform packages.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No process spawning here; the runtime crate consumes these paths
//! - The search order is part of the public contract and documented in `roots`

mod binary;
mod error;
mod normalize;
mod roots;

#[cfg(test)]
pub(crate) mod test_utils;

// Error type
pub use error::PathError;

// Naming inside an install root
pub use binary::{binary_file_name, package_dir_candidates};

// Install-root discovery
pub use roots::{
    InstallRoot, RootSource, data_dir_root, default_install_roots, executable_roots,
    parse_install_root_list,
};

pub(crate) use normalize::normalize_user_path;
