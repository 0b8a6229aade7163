mod output;

pub use output::{display_error, display_profile, display_status, display_success, display_theme};
