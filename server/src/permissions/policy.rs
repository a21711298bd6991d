//! Asset action policy.
//!
//! National administrators hold full control over assets. Administrators
//! lower in the hierarchy may browse and edit assets inside their scope but
//! cannot register or remove them.

use sr_common::Scope;

use super::PermissionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetAction {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl AssetAction {
    #[must_use]
    pub const fn is_allowed(self, scope: &Scope) -> bool {
        match scope {
            Scope::Denied => false,
            Scope::Unrestricted => true,
            Scope::RegionFiltered { .. }
            | Scope::SubRegionFiltered { .. }
            | Scope::StationFiltered { .. } => {
                matches!(self, Self::List | Self::Read | Self::Update)
            }
        }
    }

    /// Require `scope` to permit this action.
    pub fn authorize(self, scope: &Scope) -> Result<(), PermissionError> {
        if self.is_allowed(scope) {
            Ok(())
        } else {
            tracing::debug!(action = ?self, ?scope, "Asset action refused");
            Err(PermissionError::Forbidden)
        }
    }
}
