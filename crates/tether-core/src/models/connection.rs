use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::AuthData;

/// Connection: a tenant's configured link to an external integration.
/// Credentials live in `auth_data`; the owning shard ties the connection to a
/// workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: Uuid,
    pub shard_id: Uuid,
    pub name: String,
    /// Integration provider identifier, e.g. "box" or "github".
    pub provider: String,
    pub auth_data: Option<AuthData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a connection.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ConnectionCreate {
    pub shard_id: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub provider: String,
    pub auth_data: Option<AuthData>,
}

/// Partial update for a connection. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ConnectionUpdate {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub provider: Option<String>,
    pub auth_data: Option<AuthData>,
}

/// Acknowledgement returned by a connection delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDeleted {
    pub id: Uuid,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_create_validation() {
        let create = ConnectionCreate {
            shard_id: Uuid::new_v4(),
            name: "box sync".to_string(),
            provider: "box".to_string(),
            auth_data: None,
        };
        assert!(create.validate().is_ok());

        let empty_name = ConnectionCreate {
            name: String::new(),
            ..create
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_default_is_empty() {
        let update = ConnectionUpdate::default();
        assert!(update.name.is_none());
        assert!(update.provider.is_none());
        assert!(update.auth_data.is_none());
        assert!(update.validate().is_ok());
    }
}
