use serde::{Deserialize, Serialize};

/// Account allowed to obtain API tokens (collection: admin_users)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminUser {
    pub username: String,
    pub password_hash: String,
}
