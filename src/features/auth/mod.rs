//! Bearer-token authentication against an OIDC provider's JWKS

mod jwks;
mod validator;

pub mod guards;
pub mod model;

pub use jwks::JwksClient;
pub use validator::JwtValidator;
