use crate::error::StoreError;
use crate::types::{UserAccount, UserId};
use std::collections::HashMap;

pub trait UserDirectory {
    /// Looks up all `ids` in one round trip. Unknown ids are absent from the
    /// returned map.
    fn resolve(&self, ids: &[UserId]) -> Result<HashMap<UserId, UserAccount>, StoreError>;
}
