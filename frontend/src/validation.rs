//! 表单校验
//!
//! 校验在任何网络请求之前完成，错误按字段返回。

use std::collections::BTreeMap;
use std::sync::LazyLock;

use codesage_shared::{BIO_MAX_CHARS, github};
use regex::Regex;

pub const PASSWORD_MIN_CHARS: usize = 6;
pub const DISPLAY_NAME_MIN_CHARS: usize = 2;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("static regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Email,
    Password,
    ConfirmPassword,
    DisplayName,
    Bio,
    GithubUrl,
}

/// 字段级错误集合
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<Field, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn insert(&mut self, field: Field, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }

    fn check(&mut self, field: Field, result: Result<(), &'static str>) {
        if let Err(message) = result {
            self.insert(field, message);
        }
    }

    /// 无错误时返回 `Ok(())`
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Email is required.");
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err("Please enter a valid email address.");
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password is required.");
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err("Password must be at least 6 characters.");
    }
    Ok(())
}

/// 可选的显示名：为空时通过
pub fn validate_display_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if !name.is_empty() && name.chars().count() < DISPLAY_NAME_MIN_CHARS {
        return Err("Display name must be at least 2 characters.");
    }
    Ok(())
}

pub fn validate_bio(bio: &str) -> Result<(), &'static str> {
    if bio.chars().count() > BIO_MAX_CHARS {
        return Err("Bio must be 500 characters or fewer.");
    }
    Ok(())
}

pub fn validate_github_url(url: &str) -> Result<(), &'static str> {
    if url.trim().is_empty() {
        return Err("Repository URL is required.");
    }
    if !github::is_repository_url(url) {
        return Err("Enter a GitHub repository URL like https://github.com/owner/repo.");
    }
    Ok(())
}

pub fn validate_project_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Project name cannot be empty.");
    }
    Ok(())
}

/// 登录表单
pub fn validate_login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check(Field::Email, validate_email(email));
    errors.check(Field::Password, validate_password(password));
    errors.into_result()
}

/// 注册第一步：邮箱、密码、确认密码
pub fn validate_credentials(email: &str, password: &str, confirm: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check(Field::Email, validate_email(email));
    errors.check(Field::Password, validate_password(password));
    if confirm.is_empty() {
        errors.insert(Field::ConfirmPassword, "Please confirm your password.");
    } else if confirm != password {
        errors.insert(Field::ConfirmPassword, "Passwords do not match.");
    }
    errors.into_result()
}

/// 个人资料（注册第二步与资料页共用）
pub fn validate_profile(display_name: &str, bio: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check(Field::DisplayName, validate_display_name(display_name));
    errors.check(Field::Bio, validate_bio(bio));
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_emails_are_rejected() {
        for email in [
            "",
            "   ",
            "ada",
            "ada.example.com",
            "ada@",
            "@example.com",
            "ada@example",
            "ada@example.",
            "ada@.com",
            "a da@example.com",
            "ada@@example.com",
        ] {
            assert!(validate_email(email).is_err(), "accepted {email:?}");
        }
    }

    #[test]
    fn test_well_formed_emails_pass() {
        for email in ["ada@example.com", " ada.lovelace+ai@mail.example.co.uk "] {
            assert!(validate_email(email).is_ok(), "rejected {email:?}");
        }
    }

    #[test]
    fn test_short_passwords_are_rejected() {
        for password in ["", "a", "12345", "äöüäö"] {
            assert!(validate_password(password).is_err(), "accepted {password:?}");
        }
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn test_login_reports_each_field() {
        let errors = validate_login("nope", "123").unwrap_err();
        assert!(errors.get(Field::Email).is_some());
        assert!(errors.get(Field::Password).is_some());
        assert!(validate_login("ada@example.com", "secret").is_ok());
    }

    #[test]
    fn test_credentials_require_matching_confirmation() {
        let errors = validate_credentials("ada@example.com", "secret1", "secret2").unwrap_err();
        assert_eq!(errors.get(Field::ConfirmPassword), Some("Passwords do not match."));
        assert_eq!(errors.get(Field::Email), None);

        let errors = validate_credentials("ada@example.com", "secret1", "").unwrap_err();
        assert!(errors.get(Field::ConfirmPassword).is_some());

        assert!(validate_credentials("ada@example.com", "secret1", "secret1").is_ok());
    }

    #[test]
    fn test_display_name_is_optional_but_not_too_short() {
        assert!(validate_display_name("").is_ok());
        assert!(validate_display_name("   ").is_ok());
        assert!(validate_display_name("A").is_err());
        assert!(validate_display_name(" A ").is_err());
        assert!(validate_display_name("Al").is_ok());
    }

    #[test]
    fn test_bio_limit_counts_characters() {
        assert!(validate_bio(&"é".repeat(500)).is_ok());
        assert!(validate_bio(&"x".repeat(501)).is_err());
        let errors = validate_profile("Ada", &"x".repeat(501)).unwrap_err();
        assert!(errors.get(Field::Bio).is_some());
    }

    #[test]
    fn test_github_url_validation() {
        assert!(validate_github_url("https://github.com/acme/widget").is_ok());
        assert!(validate_github_url("").is_err());
        assert!(validate_github_url("https://gitlab.com/acme/widget").is_err());
        assert!(validate_project_name("  ").is_err());
    }
}
