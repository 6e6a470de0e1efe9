//! Client library for the JobDen job board.
//!
//! - [`auth`]: the persisted session, its stores, the refresh queue and the
//!   route gate
//! - [`api`]: the authenticated REST client and typed resource calls
//! - [`models`]: backend records
//! - [`validate`]: client-side form checks
//! - [`config`]: user configuration
//! - [`utils`]: display formatting

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;
pub mod validate;

pub use api::{ApiClient, ApiError, AuthEvent, Upload};
pub use auth::{authorize, Access, Session, SessionStore};
pub use config::Config;
