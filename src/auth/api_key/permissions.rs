//! API key permission checking utilities

use super::creation::ApiKeyHandler;
use crate::core::models::{ApiKey, Permission};

impl ApiKeyHandler {
    /// Check if API key has permission
    pub fn has_permission(&self, api_key: &ApiKey, permission: &Permission) -> bool {
        api_key.permissions.iter().any(|held| held.allows(permission))
    }

    /// Check if API key has any of the permissions
    pub fn has_any_permission(&self, api_key: &ApiKey, permissions: &[Permission]) -> bool {
        permissions
            .iter()
            .any(|perm| self.has_permission(api_key, perm))
    }

    /// Check if API key has all permissions
    pub fn has_all_permissions(&self, api_key: &ApiKey, permissions: &[Permission]) -> bool {
        permissions
            .iter()
            .all(|perm| self.has_permission(api_key, perm))
    }
}
