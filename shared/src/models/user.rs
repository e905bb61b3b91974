//! Login tracking record

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    /// Identity provider principal id
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restaurant_name: Option<String>,
    pub sign_up_time: i64,
    pub last_login_time: i64,
    pub login_count: u32,
}

impl UserRecord {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, now: i64) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            restaurant_name: None,
            sign_up_time: now,
            last_login_time: now,
            login_count: 1,
        }
    }

    pub fn record_login(&mut self, now: i64) {
        self.last_login_time = now;
        self.login_count = self.login_count.saturating_add(1);
    }
}
