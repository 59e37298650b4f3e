//! Models that represent users, authentication payloads, and role metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a registered user account.
pub struct User {
    /// Unique identifier for the user.
    pub id: String,
    /// Unique email address used for login.
    pub email: String,
    /// Argon2 hash of the user's password.
    pub password_hash: String,
    /// Human-readable display name.
    pub name: String,
    /// Role describing the user's privileges.
    pub role: UserRole,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::Type, ToSchema, Default)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
/// Supported user roles stored in the database.
pub enum UserRole {
    #[default]
    User,
    Admin,
}

impl UserRole {
    /// Returns the canonical snake_case representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl Serialize for UserRole {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "user" => Ok(UserRole::User),
            "admin" => Ok(UserRole::Admin),
            // tolerate legacy casings from older clients
            "User" | "USER" => Ok(UserRole::User),
            "Admin" | "ADMIN" => Ok(UserRole::Admin),
            other => Err(serde::de::Error::unknown_variant(other, &["user", "admin"])),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
/// Payload for creating a new user account.
pub struct CreateUser {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Validate)]
/// Payload for updating portions of an existing user.
pub struct UpdateUser {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl UpdateUser {
    /// Returns `true` when no field was supplied at all.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.phone.is_none()
            && self.company.is_none()
            && self.address.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Credentials submitted by a user attempting to authenticate.
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Token and session handle returned after a successful login.
pub struct LoginResponse {
    pub token: String,
    pub session_id: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Public-facing representation of a user; never carries the password hash.
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role.as_str().to_string(),
            phone: user.phone,
            company: user.company,
            address: user.address,
            city: user.city,
            state: user.state,
            country: user.country,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl User {
    /// Constructs a new user with a freshly generated identifier.
    pub fn new(email: String, password_hash: String, name: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            password_hash,
            name,
            role,
            phone: None,
            company: None,
            address: None,
            city: None,
            state: None,
            country: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` when the user holds the `Admin` role.
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn user_role_serde_accepts_and_emits_snake_case() {
        let u: UserRole = serde_json::from_str("\"user\"").unwrap();
        let a: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(matches!(u, UserRole::User));
        assert!(matches!(a, UserRole::Admin));

        let a2: UserRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert!(matches!(a2, UserRole::Admin));

        let su = serde_json::to_value(UserRole::User).unwrap();
        let sa = serde_json::to_value(UserRole::Admin).unwrap();
        assert_eq!(su, Value::String("user".into()));
        assert_eq!(sa, Value::String("admin".into()));
    }

    #[test]
    fn user_response_never_contains_password_hash() {
        let user = User::new(
            "alice@example.com".into(),
            "hash".into(),
            "Alice".into(),
            UserRole::Admin,
        );
        let resp: UserResponse = user.into();
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }

    #[test]
    fn create_user_validation_rejects_short_password_and_bad_email() {
        use validator::Validate;
        let payload = CreateUser {
            email: "not-an-email".into(),
            password: "123".into(),
            name: "Bob".into(),
            role: UserRole::User,
            phone: None,
            company: None,
            address: None,
            city: None,
            state: None,
            country: None,
        };
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn update_user_is_empty_detects_missing_fields() {
        let update: UpdateUser = serde_json::from_str("{}").unwrap();
        assert!(update.is_empty());
        let update: UpdateUser = serde_json::from_str("{\"name\":\"x\"}").unwrap();
        assert!(!update.is_empty());
    }
}
