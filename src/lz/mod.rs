//! The Lempel–Ziv parts of the codec: match finding and the token layout.

pub mod matcher;
pub mod tokens;
pub use matcher::HashMatchFinder;
pub use tokens::Token;
