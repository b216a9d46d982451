//! Account moderation requests handled by platform admins.

use serde::{Deserialize, Serialize};

use crate::identity::{AccountStatus, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserAction {
    Suspend,
    Activate,
    Deactivate,
}

impl UserAction {
    pub const fn label(self) -> &'static str {
        match self {
            UserAction::Suspend => "suspend",
            UserAction::Activate => "activate",
            UserAction::Deactivate => "deactivate",
        }
    }

    pub const fn resulting_status(self) -> AccountStatus {
        match self {
            UserAction::Suspend => AccountStatus::Suspended,
            UserAction::Activate => AccountStatus::Active,
            UserAction::Deactivate => AccountStatus::Deactivated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserActionRequest {
    pub action: UserAction,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUserAction {
    pub user_ids: Vec<UserId>,
    pub action: UserAction,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUserActionSummary {
    pub updated: usize,
    pub failed: usize,
}
