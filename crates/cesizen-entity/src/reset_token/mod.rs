//! Password reset token entities.

pub mod model;

pub use model::{IssuedResetToken, ResetToken, ResetTokenState};
