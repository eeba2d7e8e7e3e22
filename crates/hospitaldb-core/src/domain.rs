//! Closed value sets for the enum-typed columns of the hospital schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

macro_rules! domain_enum {
    (
        $(#[$meta:meta])*
        $name:ident, column = $column:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every member of the set, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Column that stores this value.
            pub const COLUMN: &'static str = $column;

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn labels() -> impl Iterator<Item = &'static str> {
                Self::ALL.iter().map(|value| value.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($label => Ok($name::$variant),)+
                    other => Err(Error::InvalidValue {
                        column: $column,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

domain_enum! {
    /// Patient gender.
    Gender, column = "gender" {
        Male => "Male",
        Female => "Female",
        Other => "Other",
    }
}

domain_enum! {
    /// Insurance category recorded in `Patient.insurance_info`.
    InsuranceCategory, column = "insurance_info" {
        Private => "Private",
        Public => "Public",
        None => "None",
    }
}

domain_enum! {
    Specialization, column = "specialization" {
        Cardiology => "Cardiology",
        Neurology => "Neurology",
        Pediatrics => "Pediatrics",
        Orthopedics => "Orthopedics",
        GeneralMedicine => "General Medicine",
    }
}

domain_enum! {
    /// Operational state of a piece of equipment.
    AvailabilityStatus, column = "availability_status" {
        Available => "Available",
        InMaintenance => "In Maintenance",
        Unavailable => "Unavailable",
    }
}

domain_enum! {
    AppointmentStatus, column = "status" {
        Scheduled => "Scheduled",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

domain_enum! {
    PaymentStatus, column = "payment_status" {
        Paid => "Paid",
        Unpaid => "Unpaid",
        Pending => "Pending",
    }
}

/// SQL `IN` list check for a closed value set, e.g. `gender IN ('Male', 'Female')`.
pub fn in_list_check<'a>(column: &str, labels: impl IntoIterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = labels
        .into_iter()
        .map(|label| format!("'{}'", label.replace('\'', "''")))
        .collect();
    format!("{column} IN ({})", quoted.join(", "))
}
