//! Password policy enforcement for new secrets.

use cesizen_core::config::AuthConfig;
use cesizen_core::error::AppError;

/// Validates new secrets against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
    require_mixed: bool,
    /// zxcvbn score floor; `None` disables the estimate.
    min_strength: Option<zxcvbn::Score>,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let min_strength = match config.password_min_strength {
            0 => None,
            1 => Some(zxcvbn::Score::One),
            2 => Some(zxcvbn::Score::Two),
            3 => Some(zxcvbn::Score::Three),
            _ => Some(zxcvbn::Score::Four),
        };
        Self {
            min_length: config.password_min_length,
            require_mixed: config.password_require_mixed,
            min_strength,
        }
    }

    /// Validates a password, reporting the first violation found.
    ///
    /// `user_inputs` (identity, email) are penalized by the strength estimate.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if self.require_mixed {
            if !password.chars().any(|c| c.is_uppercase()) {
                return Err(AppError::validation(
                    "Password must contain at least one uppercase letter",
                ));
            }
            if !password.chars().any(|c| c.is_lowercase()) {
                return Err(AppError::validation(
                    "Password must contain at least one lowercase letter",
                ));
            }
            if !password.chars().any(|c| c.is_ascii_digit()) {
                return Err(AppError::validation(
                    "Password must contain at least one digit",
                ));
            }
        }

        if let Some(required) = self.min_strength {
            let estimate = zxcvbn::zxcvbn(password, user_inputs);
            if estimate.score() < required {
                return Err(AppError::validation(
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator(min_strength: u8) -> PasswordValidator {
        PasswordValidator::new(&AuthConfig {
            password_min_strength: min_strength,
            ..AuthConfig::default()
        })
    }

    #[test]
    fn test_default_policy() {
        let v = validator(0);
        assert!(v.validate("P@ssw0rd", &[]).is_ok());
        assert!(v.validate("Sh0rt", &[]).is_err());
        assert!(v.validate("alllowercase1", &[]).is_err());
        assert!(v.validate("NoDigitsHere", &[]).is_err());
    }

    #[test]
    fn test_mixed_classes_do_not_require_symbols() {
        let v = validator(0);
        assert!(v.validate("Passw0rdOnly", &[]).is_ok());
        assert!(v.validate("PASSW0RD-ONLY", &[]).is_err());
    }

    #[test]
    fn test_strength_floor() {
        let v = validator(3);
        assert!(v.validate("Password1", &[]).is_err());
        assert!(v.validate("Zq7!vR2#mK9@wL4$", &[]).is_ok());
    }

    #[test]
    fn test_not_same() {
        let v = validator(0);
        assert!(v.validate_not_same("P@ssw0rd", "P@ssw0rd").is_err());
        assert!(v.validate_not_same("P@ssw0rd", "N3w-Secret").is_ok());
    }
}
