//! Account domain entities.

pub mod model;
pub mod role;
pub mod status;

pub use model::{Account, NewAccount, ProfileUpdate, normalize_email, normalize_identity};
pub use role::AccountRole;
pub use status::AccountStatus;
