//! Utility functions for common operations.
//!
//! - **Files**: atomic writes and validation of user-supplied paths
//! - **URL validation**: checks before fetching or opening article links
//! - **Text processing**: Unicode-aware width calculation, truncation and
//!   sanitising publisher text for the terminal

mod fs;
mod text;
mod url_validator;

pub use fs::{atomic_write, resolve_regular_file, sanitize_file_name};
pub use text::{display_width, strip_control_chars, trim_truncation_marker, truncate_to_width};
pub use url_validator::{validate_url, validate_url_for_open, UrlValidationError};

/// Maximum accepted search query length.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
