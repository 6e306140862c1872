mod use_escape_key;
mod use_window_errors;

pub use use_escape_key::use_escape_key;
pub use use_window_errors::use_window_errors;
