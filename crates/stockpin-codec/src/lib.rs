//! Record codec for stockpin.
//!
//! Stock lives at rest as one UTF-8 text blob, one record per line. This
//! crate converts between that blob and the ordered [`Stock`] the
//! workflows operate on.
//!
//! # Modules
//!
//! - [`record`]: [`Record`] and [`Stock`] types
//! - [`codec`]: [`decode`] and [`encode`]

pub mod codec;
pub mod record;

pub use codec::{decode, encode};
pub use record::{Record, Stock, LINE_BREAKS};
