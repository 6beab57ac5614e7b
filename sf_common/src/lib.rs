mod amounts;
mod helpers;
mod secret;

pub use amounts::{AmountConversionError, Money, PointRate, Points};
pub use helpers::parse_flag;
pub use secret::Secret;
