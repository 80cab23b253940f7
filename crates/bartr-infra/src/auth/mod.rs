//! Bearer-token verification.

mod jwt;

pub use jwt::{JwtTokenVerifier, JwtVerifierConfig};
