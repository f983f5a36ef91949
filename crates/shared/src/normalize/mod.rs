//! Pure field normalizers applied by the record managers before a write.

mod datetime;
mod email;
mod slug;

pub use datetime::{normalize_date, normalize_time};
pub use email::{is_valid_email, normalize_email};
pub use slug::normalize_slug;
