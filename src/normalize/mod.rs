//! Normalizers turning loosely typed source text into canonical values
//!
//! All three are pure and total: any input string yields a value, never a
//! panic or an error.

mod date;
mod description;
mod status;

pub use date::*;
pub use description::*;
pub use status::*;
