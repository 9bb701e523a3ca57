use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// Closed role set; route guards match on variants rather than raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    User,
    Guide,
    LeadGuide,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Guide => "guide",
            UserRole::LeadGuide => "lead-guide",
            UserRole::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(UserRole::User),
            "guide" => Ok(UserRole::Guide),
            "lead-guide" => Ok(UserRole::LeadGuide),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full user row. The credential columns and the soft-delete flag never
/// leave the process: they are skipped on serialization.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_changed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    #[serde(skip_serializing, default = "default_active")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl User {
    /// True when the password changed strictly after the token was issued,
    /// which invalidates tokens minted before a credential rotation.
    pub fn password_changed_after(&self, token_issued_at: i64) -> bool {
        self.password_changed_at
            .map_or(false, |changed| changed.timestamp() > token_issued_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_user(changed_at: Option<DateTime<Utc>>) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            photo: None,
            password: "$argon2id$fake".into(),
            role: UserRole::User,
            password_changed_at: changed_at,
            password_reset_token: None,
            password_reset_expires: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn role_round_trips_all_variants() {
        for role in [
            UserRole::User,
            UserRole::Guide,
            UserRole::LeadGuide,
            UserRole::Admin,
        ] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("superadmin".parse::<UserRole>().is_err());
    }

    #[test]
    fn password_changed_after_compares_against_issued_at() {
        let issued_at = Utc::now().timestamp();

        let never_changed = sample_user(None);
        assert!(!never_changed.password_changed_after(issued_at));

        let changed_before = sample_user(Some(Utc::now() - Duration::hours(1)));
        assert!(!changed_before.password_changed_after(issued_at));

        let changed_after = sample_user(Some(Utc::now() + Duration::hours(1)));
        assert!(changed_after.password_changed_after(issued_at));
    }

    #[test]
    fn serialization_hides_credentials_and_soft_delete_flag() {
        let mut user = sample_user(None);
        user.password_reset_token = Some("deadbeef".into());
        let value = serde_json::to_value(&user).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("passwordResetToken"));
        assert!(!obj.contains_key("passwordResetExpires"));
        assert!(!obj.contains_key("active"));
        assert_eq!(obj["role"], "user");
    }
}
