use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Error returned when a stored or submitted value does not name a variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Wires `as_str`, `Display`, `FromStr` and `all()` to the lowercase wire names
/// that serde also uses, so the database text column and JSON always agree.
macro_rules! wire_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }

            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)+]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Tenant,
    Landlord,
    Admin,
}

wire_enum!(UserRole, "role", {
    Tenant => "tenant",
    Landlord => "landlord",
    Admin => "admin",
});

impl UserRole {
    /// Roles a visitor may pick for themselves at registration.
    pub fn is_public(&self) -> bool {
        matches!(self, UserRole::Tenant | UserRole::Landlord)
    }

    pub fn permissions(&self) -> &'static [&'static str] {
        match self {
            UserRole::Tenant => &[
                "view_own_profile",
                "view_own_rental_history",
                "submit_booking_requests",
                "view_lease_documents",
                "update_own_profile",
            ],
            UserRole::Landlord => &[
                "view_own_profile",
                "manage_own_properties",
                "view_tenant_applications",
                "manage_leases",
                "generate_property_reports",
                "add_edit_properties",
            ],
            UserRole::Admin => &[
                "view_all_profiles",
                "manage_all_users",
                "approve_users",
                "manage_all_properties",
                "manage_services",
                "generate_system_reports",
                "monitor_system_health",
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

wire_enum!(ApprovalStatus, "approval status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

wire_enum!(BookingStatus, "booking status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Cancelled => "cancelled",
});

impl BookingStatus {
    /// A booking in one of these states blocks a second request for the same property.
    pub fn is_open(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Approved)
    }

    /// Transitions a landlord or admin may apply.
    pub fn can_decide(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Approved)
                | (BookingStatus::Pending, BookingStatus::Rejected)
        )
    }

    /// Transitions the tenant who made the booking may apply.
    pub fn can_cancel(&self) -> bool {
        self.is_open()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    CreditCard,
    DebitCard,
    Check,
    Cash,
    OnlinePayment,
    Mpesa,
    Paypal,
}

wire_enum!(PaymentMethod, "payment method", {
    BankTransfer => "bank_transfer",
    CreditCard => "credit_card",
    DebitCard => "debit_card",
    Check => "check",
    Cash => "cash",
    OnlinePayment => "online_payment",
    Mpesa => "mpesa",
    Paypal => "paypal",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

wire_enum!(PaymentStatus, "payment status", {
    Pending => "pending",
    Completed => "completed",
    Failed => "failed",
    Refunded => "refunded",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaseStatus {
    Pending,
    Active,
    Expired,
    Terminated,
}

wire_enum!(LeaseStatus, "lease status", {
    Pending => "pending",
    Active => "active",
    Expired => "expired",
    Terminated => "terminated",
});

impl LeaseStatus {
    pub fn can_transition_to(&self, next: LeaseStatus) -> bool {
        matches!(
            (self, next),
            (LeaseStatus::Pending, LeaseStatus::Active)
                | (LeaseStatus::Pending, LeaseStatus::Terminated)
                | (LeaseStatus::Active, LeaseStatus::Expired)
                | (LeaseStatus::Active, LeaseStatus::Terminated)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceBookingStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

wire_enum!(ServiceBookingStatus, "service booking status", {
    Pending => "pending",
    Approved => "approved",
    Rejected => "rejected",
    Completed => "completed",
});

impl ServiceBookingStatus {
    pub fn can_transition_to(&self, next: ServiceBookingStatus) -> bool {
        matches!(
            (self, next),
            (ServiceBookingStatus::Pending, ServiceBookingStatus::Approved)
                | (ServiceBookingStatus::Pending, ServiceBookingStatus::Rejected)
                | (ServiceBookingStatus::Approved, ServiceBookingStatus::Completed)
        )
    }
}
