//! # Authentication and authorization
//!
//! Login is a two step affair:
//!
//! 1. [`CapabilityProber::validate_credentials`] proves the presented
//!    principal against the live cluster and refuses anything short of an
//!    administrative identity
//! 2. [`CapabilityProber::probe`] derives the [`PermissionSet`] that gets
//!    frozen into a [`SessionAuthority`] token
//!
//! Every later request only needs the token: [`SessionAuthority::verify`]
//! checks it and [`SessionAuthority::authorize`] answers capability checks
//! without going back to the cluster.

mod permissions;
mod prober;
mod session;

pub use permissions::{Capability, PermissionSet, UnknownCapability};
pub use prober::{AuthError, CapabilityProber, DEFAULT_TRIAL_TIMEOUT};
pub use session::{
    SessionAuthority, SessionClaims, SessionToken, TokenError, DEFAULT_SESSION_TTL,
};

/// Policy name recorded for every session; only administrators can log in.
pub const ADMIN_POLICY_NAME: &str = "admin";
