use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Profile returned by `GET /user/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: EntityId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "full_name", alias = "username")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl CurrentUser {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_current_user_tolerates_sparse_profiles() {
        let user: CurrentUser = serde_json::from_value(json!({ "id": 7 })).unwrap();
        assert_eq!(user.id.as_str(), "7");
        assert_eq!(user.display_name(), "7");

        let user: CurrentUser = serde_json::from_value(json!({
            "id": "u-1",
            "email": "anna@example.com",
            "full_name": "Anna"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "Anna");
    }
}
