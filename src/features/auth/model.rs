use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_DESK_OFFICER, ROLE_RESIDENT};

/// Caller identity resolved from a validated access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Desk officers and admins run the appointment and ticket lifecycle
    pub fn has_desk_access(&self) -> bool {
        self.is_admin() || self.has_role(ROLE_DESK_OFFICER)
    }

    /// Any known role may file tickets and book appointments
    pub fn has_resident_access(&self) -> bool {
        self.has_desk_access() || self.has_role(ROLE_RESIDENT)
    }
}
