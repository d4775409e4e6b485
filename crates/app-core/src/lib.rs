//! Data hooks for Matchday
//!
//! This crate wraps the remote API in hooks that always hold renderable
//! data: the last successful response, or a built-in fallback together with
//! the error that caused it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dashboard;
pub mod hook;
pub mod profile;

pub use dashboard::{ActivityEntry, AdminStats, DashboardData, DashboardHook, DashboardSource, TopUser};
pub use hook::{DataSource, FetchState, Hook};
pub use profile::{ProfileHook, ProfileSource, UserProfile, UserProfileDto};
