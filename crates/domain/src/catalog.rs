//! Catalog entities that participate in ownership chains.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use vendorhub_core::{AppError, PrincipalId};

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID value.
            #[must_use]
            pub fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Returns the underlying UUID value.
            #[must_use]
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AppError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
                    AppError::Validation(format!(concat!("invalid ", $label, " id '{}': {}"), value, error))
                })
            }
        }
    };
}

resource_id!(
    /// Unique identifier of a vendor.
    VendorId,
    "vendor"
);
resource_id!(
    /// Unique identifier of a game.
    GameId,
    "game"
);
resource_id!(
    /// Unique identifier of a package.
    PackageId,
    "package"
);
resource_id!(
    /// Unique identifier of a bundle.
    BundleId,
    "bundle"
);

/// Vendor account. The manager is the terminal owner of everything the
/// vendor publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vendor {
    /// Vendor identifier.
    pub id: VendorId,
    /// Display name.
    pub name: String,
    /// Managing principal.
    pub manager: PrincipalId,
    /// Whether onboarding has been approved.
    pub approved: bool,
}

/// Game published by a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    /// Game identifier.
    pub id: GameId,
    /// Publishing vendor.
    pub vendor_id: VendorId,
    /// Display name.
    pub name: String,
}

/// Package of games sold by a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    /// Package identifier.
    pub id: PackageId,
    /// Selling vendor.
    pub vendor_id: VendorId,
    /// Display name.
    pub name: String,
    /// Games included in the package.
    pub game_ids: Vec<GameId>,
}

/// Bundle of packages sold by a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    /// Bundle identifier.
    pub id: BundleId,
    /// Selling vendor.
    pub vendor_id: VendorId,
    /// Display name.
    pub name: String,
    /// Packages included in the bundle.
    pub package_ids: Vec<PackageId>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use vendorhub_core::AppError;

    use super::{GameId, VendorId};

    #[test]
    fn ids_roundtrip_through_display() {
        let game_id = GameId::new();
        assert_eq!(GameId::from_str(game_id.to_string().as_str()).ok(), Some(game_id));
    }

    #[test]
    fn malformed_id_names_its_family() {
        match VendorId::from_str("v-1") {
            Err(AppError::Validation(message)) => assert!(message.contains("vendor")),
            other => panic!("unexpected parse result: {other:?}"),
        }
    }
}
