pub mod bonbast;

pub use bonbast::{BonbastProvider, RegexTokenExtractor};
