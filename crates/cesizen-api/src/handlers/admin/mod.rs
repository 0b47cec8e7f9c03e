//! Admin handlers. Routes are guarded by
//! [`require_admin`](crate::middleware::rbac::require_admin) and every
//! service call checks the caller role again.

pub mod users;
