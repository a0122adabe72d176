//! Admin / viewer roles.

use serde::{Deserialize, Serialize};

use crate::error::{BoardError, Result};

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates areas, renames them and resets the board.
    Admin,
    /// Attaches and clears media only.
    #[default]
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Fails with `PermissionDenied` unless the role is admin.
    pub fn require_admin(&self, action: &str) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(BoardError::PermissionDenied(format!(
                "only an admin can {}",
                action
            )))
        }
    }
}

/// Hint shown above the board.
pub fn status_message(role: Role, area_count: usize) -> &'static str {
    match role {
        Role::Admin => {
            "Set area count and click 'Create Areas'. Double-click area labels to rename."
        }
        Role::User if area_count == 0 => "No areas yet. Ask admin to create areas first.",
        Role::User => "Click on your designated area to upload a photo or video.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        assert!(Role::Admin.require_admin("rename areas").is_ok());
        let err = Role::User.require_admin("rename areas").unwrap_err();
        assert!(err.is_structural());
        assert!(err.to_string().contains("rename areas"));
    }

    #[test]
    fn test_status_message() {
        assert!(status_message(Role::Admin, 0).starts_with("Set area count"));
        assert!(status_message(Role::User, 0).starts_with("No areas yet"));
        assert!(status_message(Role::User, 4).contains("designated area"));
    }
}
