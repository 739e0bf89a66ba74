use crate::types::ids::UserId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

pub const ANONYMOUS_NAME: &str = "Anonymous";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
}

/// Display data for the author of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserRef {
    pub name: String,
    pub url: Option<String>,
}

impl UserRef {
    pub fn anonymous() -> Self {
        Self {
            name: ANONYMOUS_NAME.to_string(),
            url: None,
        }
    }

    pub fn from_account(account: &UserAccount) -> Self {
        if account.id.is_anonymous() {
            return Self::anonymous();
        }
        Self {
            name: account.name.clone(),
            url: Some(format!("/user/{}", account.id)),
        }
    }

    /// Missing and anonymous accounts both render as "Anonymous" with no link.
    pub fn resolve(user_id: Option<UserId>, accounts: &HashMap<UserId, UserAccount>) -> Self {
        user_id
            .and_then(|id| accounts.get(&id))
            .map_or_else(Self::anonymous, Self::from_account)
    }
}
