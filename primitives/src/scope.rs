use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_id!(
    /// The tenant the authenticated caller belongs to.
    TenantId
);
string_id!(
    /// The authenticated user on whose behalf the spreadsheet is accessed.
    UserId
);
string_id!(
    /// The id of the spreadsheet document, as issued by the spreadsheet provider.
    SheetId
);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("Missing {0}")]
    Missing(&'static str),
}

/// The `(tenantId, userId, sheetId)` triple that partitions all stored records
/// and is the unit of a full replace during a sync.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub sheet_id: SheetId,
}

impl Scope {
    /// Builds a [`Scope`] rejecting any blank component.
    pub fn new(
        tenant_id: impl Into<TenantId>,
        user_id: impl Into<UserId>,
        sheet_id: impl Into<SheetId>,
    ) -> Result<Self, ScopeError> {
        let scope = Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
            sheet_id: sheet_id.into(),
        };

        if scope.tenant_id.as_str().trim().is_empty() {
            return Err(ScopeError::Missing("tenantId"));
        }
        if scope.user_id.as_str().trim().is_empty() {
            return Err(ScopeError::Missing("userId"));
        }
        if scope.sheet_id.as_str().trim().is_empty() {
            return Err(ScopeError::Missing("sheetId"));
        }

        Ok(scope)
    }

    /// Checks the scope fields of a stored record against this scope.
    pub fn matches(&self, tenant_id: &TenantId, user_id: &UserId, sheet_id: &SheetId) -> bool {
        &self.tenant_id == tenant_id && &self.user_id == user_id && &self.sheet_id == sheet_id
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tenant_id, self.user_id, self.sheet_id)
    }
}
