//! Unified error codes for the menu platform
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant (restaurant) errors
//! - 4xxx: Order errors
//! - 6xxx: Menu errors
//! - 7xxx: Table errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// An account with this email already exists
    AccountExists = 1008,
    /// Too many failed attempts
    TooManyAttempts = 1009,
    /// Identity provider unreachable
    AuthNetworkFailure = 1010,
    /// Interactive sign-in was cancelled by the user
    SignInCancelled = 1011,
    /// Unclassified identity provider failure
    AuthUnknown = 1012,
    /// Password does not meet strength requirements
    WeakPassword = 1013,
    /// Email address is malformed
    InvalidEmail = 1014,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,

    // ==================== 3xxx: Tenant ====================
    /// Restaurant not found
    TenantNotFound = 3002,
    /// Restaurant name is invalid
    InvalidRestaurantName = 3101,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order has no line items
    OrderEmpty = 4007,
    /// Requested status change is not allowed from the current status
    InvalidStatusTransition = 4010,
    /// Order is in a terminal status
    OrderTerminal = 4011,
    /// Only terminal orders can be deleted
    OrderNotTerminal = 4012,
    /// Declining an order requires a reason
    DeclineReasonRequired = 4013,
    /// Order was changed concurrently
    OrderConflict = 4014,
    /// Line item quantity is invalid
    InvalidQuantity = 4015,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Menu item has an invalid price
    InvalidPrice = 6002,
    /// Menu item is not available for ordering
    MenuItemUnavailable = 6003,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// Image processing failed
    ImageProcessingFailed = 6508,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 7xxx: Table ====================
    /// Table identifier is invalid
    InvalidTableId = 7004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Timeout error
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Backend services are not configured (landing-only mode)
    ServiceUnavailable = 9006,
    /// Too many requests
    RateLimited = 9007,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default user-facing message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "Please sign in first",
            ErrorCode::InvalidCredentials => "Invalid email or password.",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => {
                "This account has been disabled. Please contact support."
            }
            ErrorCode::AccountExists => "An account with this email already exists.",
            ErrorCode::TooManyAttempts => "Too many failed attempts. Please try again later.",
            ErrorCode::AuthNetworkFailure => {
                "Network error. Please check your internet connection and try again."
            }
            ErrorCode::SignInCancelled => "Sign-in was cancelled.",
            ErrorCode::AuthUnknown => "An unexpected error occurred. Please try again.",
            ErrorCode::WeakPassword => {
                "Password should be at least 8 characters and include uppercase, lowercase, and numbers."
            }
            ErrorCode::InvalidEmail => "Invalid email address.",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",

            // Tenant
            ErrorCode::TenantNotFound => "Restaurant not found",
            ErrorCode::InvalidRestaurantName => "Invalid restaurant name.",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderEmpty => "Order is empty",
            ErrorCode::InvalidStatusTransition => "Order status change is not allowed",
            ErrorCode::OrderTerminal => "Order is already closed",
            ErrorCode::OrderNotTerminal => "Only completed or cancelled orders can be deleted",
            ErrorCode::DeclineReasonRequired => "Please provide a decline reason",
            ErrorCode::OrderConflict => "Order was changed by someone else, please retry",
            ErrorCode::InvalidQuantity => "Quantity must be a positive number",

            // Menu
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::InvalidPrice => "Menu item has an invalid price",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Table
            ErrorCode::InvalidTableId => "Invalid table identifier",

            // System
            ErrorCode::InternalError => "Something went wrong. Please try again.",
            ErrorCode::DatabaseError => "Something went wrong. Please try again.",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ServiceUnavailable => "Service is not available right now",
            ErrorCode::RateLimited => "Too many requests, try again later",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::AccountExists),
            1009 => Ok(ErrorCode::TooManyAttempts),
            1010 => Ok(ErrorCode::AuthNetworkFailure),
            1011 => Ok(ErrorCode::SignInCancelled),
            1012 => Ok(ErrorCode::AuthUnknown),
            1013 => Ok(ErrorCode::WeakPassword),
            1014 => Ok(ErrorCode::InvalidEmail),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),

            // Tenant
            3002 => Ok(ErrorCode::TenantNotFound),
            3101 => Ok(ErrorCode::InvalidRestaurantName),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4007 => Ok(ErrorCode::OrderEmpty),
            4010 => Ok(ErrorCode::InvalidStatusTransition),
            4011 => Ok(ErrorCode::OrderTerminal),
            4012 => Ok(ErrorCode::OrderNotTerminal),
            4013 => Ok(ErrorCode::DeclineReasonRequired),
            4014 => Ok(ErrorCode::OrderConflict),
            4015 => Ok(ErrorCode::InvalidQuantity),

            // Menu
            6001 => Ok(ErrorCode::MenuItemNotFound),
            6002 => Ok(ErrorCode::InvalidPrice),
            6003 => Ok(ErrorCode::MenuItemUnavailable),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6508 => Ok(ErrorCode::ImageProcessingFailed),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Table
            7004 => Ok(ErrorCode::InvalidTableId),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ServiceUnavailable),
            9007 => Ok(ErrorCode::RateLimited),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::InvalidCredentials,
            ErrorCode::TenantNotFound,
            ErrorCode::InvalidStatusTransition,
            ErrorCode::MenuItemUnavailable,
            ErrorCode::ServiceUnavailable,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_invalid_code() {
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderEmpty).unwrap();
        assert_eq!(json, "4007");
        let code: ErrorCode = serde_json::from_str("4013").unwrap();
        assert_eq!(code, ErrorCode::DeclineReasonRequired);
    }

    #[test]
    fn test_system_messages_are_generic() {
        assert_eq!(
            ErrorCode::DatabaseError.message(),
            ErrorCode::InternalError.message()
        );
    }
}
