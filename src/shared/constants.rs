/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Administrator - everything a desk officer can do, plus configuration
pub const ROLE_ADMIN: &str = "admin";

/// Desk officer - confirms, cancels, completes and closes tickets
pub const ROLE_DESK_OFFICER: &str = "desk_officer";

/// Resident - files tickets and books appointments
pub const ROLE_RESIDENT: &str = "resident";

// =============================================================================
// TICKET CONSTANTS
// =============================================================================

/// Maximum size of one supporting document
pub const MAX_DOCUMENT_SIZE: usize = 10 * 1024 * 1024;

/// Content types accepted as blotter supporting documents
pub const ALLOWED_DOCUMENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "application/pdf",
];
