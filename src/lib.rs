//! Researcher profile service: signed short-lived identity tokens plus a
//! flat-file profile store behind an actix-web HTTP surface.

pub mod auth;
pub mod config;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod profile;
pub mod telemetry;

pub use auth::{Claims, TokenError};
pub use error::AppError;
pub use jwt::{TokenCodec, DEFAULT_TTL};
