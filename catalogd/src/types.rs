//! Common type definitions shared across the crate.
//!
//! This module defines:
//! - Type aliases for entity IDs (ProviderId, UserId, PermissionId)
//! - The [`Region`] enum covering the seven World Bank regions
//!
//! # ID Types
//!
//! Entity IDs are `SERIAL` integers in the database and are wrapped in type
//! aliases for readability:
//!
//! - [`ProviderId`]: data provider identifier
//! - [`UserId`]: account identifier referenced by providers
//! - [`PermissionId`]: permission grant identifier
//!
//! Economies are identified by their 3-letter code and carried as plain
//! strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Type aliases for IDs
pub type ProviderId = i32;
pub type UserId = i32;
pub type PermissionId = i32;

/// The seven World Bank regions an economy (or a permission) can be scoped to.
///
/// Stored in the database as the 3-letter World Bank region code. Aggregate
/// economies carry no region at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "EAS")]
    EastAsiaPacific,
    #[serde(rename = "ECS")]
    EuropeCentralAsia,
    #[serde(rename = "LCN")]
    LatinAmericaCaribbean,
    #[serde(rename = "MEA")]
    MiddleEastNorthAfrica,
    #[serde(rename = "NAC")]
    NorthAmerica,
    #[serde(rename = "SAS")]
    SouthAsia,
    #[serde(rename = "SSF")]
    SubSaharanAfrica,
}

impl Region {
    pub const ALL: [Region; 7] = [
        Region::EastAsiaPacific,
        Region::EuropeCentralAsia,
        Region::LatinAmericaCaribbean,
        Region::MiddleEastNorthAfrica,
        Region::NorthAmerica,
        Region::SouthAsia,
        Region::SubSaharanAfrica,
    ];

    /// The 3-letter World Bank code, as persisted in `economies.region` and
    /// `permissions.region`.
    pub fn code(&self) -> &'static str {
        match self {
            Region::EastAsiaPacific => "EAS",
            Region::EuropeCentralAsia => "ECS",
            Region::LatinAmericaCaribbean => "LCN",
            Region::MiddleEastNorthAfrica => "MEA",
            Region::NorthAmerica => "NAC",
            Region::SouthAsia => "SAS",
            Region::SubSaharanAfrica => "SSF",
        }
    }

    /// Human-readable region name.
    pub fn name(&self) -> &'static str {
        match self {
            Region::EastAsiaPacific => "East Asia & Pacific",
            Region::EuropeCentralAsia => "Europe & Central Asia",
            Region::LatinAmericaCaribbean => "Latin America & Caribbean",
            Region::MiddleEastNorthAfrica => "Middle East & North Africa",
            Region::NorthAmerica => "North America",
            Region::SouthAsia => "South Asia",
            Region::SubSaharanAfrica => "Sub-Saharan Africa",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown region code: {0}")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EAS" => Ok(Region::EastAsiaPacific),
            "ECS" => Ok(Region::EuropeCentralAsia),
            "LCN" => Ok(Region::LatinAmericaCaribbean),
            "MEA" => Ok(Region::MiddleEastNorthAfrica),
            "NAC" => Ok(Region::NorthAmerica),
            "SAS" => Ok(Region::SouthAsia),
            "SSF" => Ok(Region::SubSaharanAfrica),
            other => Err(UnknownRegion(other.to_string())),
        }
    }
}

// Regions live in TEXT columns as their 3-letter code, so the sqlx
// integration delegates to the string impls rather than a Postgres enum type.

impl sqlx::Type<sqlx::Postgres> for Region {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for Region {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Region {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}
