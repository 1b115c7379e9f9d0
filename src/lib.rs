//! Checks for strings used as resource identifiers: ASCII only, at most
//! 255 bytes.
//!
//! ```
//! use resource_names::validate_resource_names;
//!
//! assert!(validate_resource_names(["default", "my-workspace"]).is_ok());
//! assert!(validate_resource_names(["my-pöd"]).is_err());
//! ```

mod name;
mod validation;

#[cfg(feature = "axum")]
pub mod api;

pub use name::ResourceName;
pub use validation::{
    check_length, check_non_ascii, validate_resource_name, validate_resource_names,
    ValidationError, MAX_RESOURCE_NAME_LEN,
};
