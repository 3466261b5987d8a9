//! Read Models
//!
//! Projections returned by query repositories and serialized as-is.

use chrono::{DateTime, Utc};
use kernel::id::{DeviceId, UserId};
use serde::Serialize;

/// Admin view of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: UserId,
    pub login: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// `GET /auth/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    pub email: String,
    pub login: String,
    pub user_id: UserId,
}

/// One active device session as shown to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceView {
    pub ip: String,
    pub title: String,
    pub last_active_date: DateTime<Utc>,
    pub device_id: DeviceId,
}

/// Search terms for the admin user list; matched case-insensitively and
/// combined with OR
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search_login_term: Option<String>,
    pub search_email_term: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_view_shape() {
        let device_id = DeviceId::new();
        let at = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let view = DeviceView {
            ip: "10.0.0.1".into(),
            title: "Chrome".into(),
            last_active_date: at,
            device_id,
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["deviceId"], device_id.to_string());
        assert_eq!(json["lastActiveDate"], "2023-11-14T22:13:20Z");
        assert_eq!(json["title"], "Chrome");
    }
}
