//! Closed enumerations stored as text columns

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements `Display` and the sqlx TEXT mapping for an enum exposing
/// `as_str()` and `FromStr<Err = String>`.
macro_rules! text_enum {
    ($ty:ty) => {
        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// User role. Fixed at account creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Reader,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Reader => "reader",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "reader" => Ok(Role::Reader),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

text_enum!(Role);

// ---------------------------------------------------------------------------
// RequestType
// ---------------------------------------------------------------------------

/// Lifecycle of a borrow request.
///
/// `Requested` is the only non-terminal state; it moves once to either
/// `Issued` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RequestType {
    Requested,
    Issued,
    Rejected,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Requested => "Requested",
            RequestType::Issued => "Issued",
            RequestType::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestType::Requested)
    }
}

impl std::str::FromStr for RequestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requested" => Ok(RequestType::Requested),
            "Issued" => Ok(RequestType::Issued),
            "Rejected" => Ok(RequestType::Rejected),
            _ => Err(format!("Invalid request type: {}", s)),
        }
    }
}

text_enum!(RequestType);

// ---------------------------------------------------------------------------
// IssueStatus
// ---------------------------------------------------------------------------

/// Status of an issue registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum IssueStatus {
    Issued,
    Returned,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Issued => "Issued",
            IssueStatus::Returned => "Returned",
        }
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Issued" => Ok(IssueStatus::Issued),
            "Returned" => Ok(IssueStatus::Returned),
            _ => Err(format!("Invalid issue status: {}", s)),
        }
    }
}

text_enum!(IssueStatus);
