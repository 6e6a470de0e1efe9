//! REST API client module for the JobDen backend.
//!
//! This module provides the `ApiClient`, which attaches the session's bearer
//! token to every request and recovers from an expired access token with a
//! single shared refresh. Resource calls are grouped by backend area:
//! auth, jobs, bookmarks, applications, job seeker profile, employer, and
//! notifications.

pub mod applications;
pub mod auth;
pub mod bookmarks;
pub mod client;
pub mod employer;
pub mod error;
pub mod jobs;
pub mod notifications;
pub mod profile;

pub use client::{ApiClient, AuthEvent, Upload};
pub use error::ApiError;
