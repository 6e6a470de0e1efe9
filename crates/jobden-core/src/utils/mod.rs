//! Utility functions for display formatting.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{
    format_currency, format_date, format_date_time, format_relative_time, parse_timestamp, strip_html, truncate,
};
