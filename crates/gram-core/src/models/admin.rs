use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Administrator credentials, used for both first-run setup and login
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `GET /admin/setup-status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub setup_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a successful login or setup call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub admin: AdminProfile,
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_hides_password() {
        let creds = Credentials {
            username: "sarpanch".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("sarpanch"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn parses_login_response() {
        let resp: LoginResponse = serde_json::from_value(serde_json::json!({
            "admin": { "_id": "a1", "username": "sarpanch", "role": "admin" },
            "token": "jwt"
        }))
        .unwrap();
        assert_eq!(resp.admin.username, "sarpanch");
        assert_eq!(resp.admin.extra["role"], "admin");
    }
}
