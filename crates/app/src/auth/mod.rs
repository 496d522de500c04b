mod token;

pub use token::{TOKEN_LIFETIME_DAYS, TokenClaims, TokenSigner};
