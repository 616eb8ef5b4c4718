use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::io::Write;
use uuid::Uuid;

use crate::impl_record;
use crate::shared::error::DataError;
use crate::shared::schema::catalog::{
    catalog_apis, catalog_components, catalog_domains, catalog_resources, catalog_systems,
    releases,
};

/// Lifecycle status shared by catalog entries and releases. Closed set;
/// anything else is rejected at the parsing edge.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow,
)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStatus {
    Active,
    Pending,
    Canceled,
    Expired,
    Development,
    Production,
    Deprecated,
    Inactive,
    Maintenance,
    Error,
}

impl CatalogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
            Self::Development => "development",
            Self::Production => "production",
            Self::Deprecated => "deprecated",
            Self::Inactive => "inactive",
            Self::Maintenance => "maintenance",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for CatalogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CatalogStatus {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "canceled" => Ok(Self::Canceled),
            "expired" => Ok(Self::Expired),
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "deprecated" => Ok(Self::Deprecated),
            "inactive" => Ok(Self::Inactive),
            "maintenance" => Ok(Self::Maintenance),
            "error" => Ok(Self::Error),
            other => Err(DataError::validation(format!("unknown status: {other:?}"))),
        }
    }
}

impl ToSql<Text, Pg> for CatalogStatus {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Pg> for CatalogStatus {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        std::str::from_utf8(bytes.as_bytes())?
            .parse()
            .map_err(Into::into)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = catalog_domains)]
pub struct CatalogDomain {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = catalog_systems)]
pub struct CatalogSystem {
    pub id: Uuid,
    pub domain_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = catalog_components)]
pub struct CatalogComponent {
    pub id: Uuid,
    pub system_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
    pub repository_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = catalog_apis)]
pub struct CatalogApi {
    pub id: Uuid,
    pub component_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
    pub spec_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = catalog_resources)]
pub struct CatalogResource {
    pub id: Uuid,
    pub component_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
    pub resource_kind: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Insertable, Identifiable)]
#[diesel(table_name = releases)]
pub struct Release {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub component_id: Option<Uuid>,
    pub version: String,
    pub status: CatalogStatus,
    pub notes: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl_record!(
    CatalogDomain,
    CatalogSystem,
    CatalogComponent,
    CatalogApi,
    CatalogResource,
    Release,
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogDomain {
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogSystem {
    pub domain_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogComponent {
    pub system_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
    pub repository_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogApi {
    pub component_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
    pub spec_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCatalogResource {
    pub component_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub owner_team_id: Option<Uuid>,
    pub status: CatalogStatus,
    pub resource_kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRelease {
    pub workspace_id: Uuid,
    pub component_id: Option<Uuid>,
    pub version: String,
    pub status: CatalogStatus,
    pub notes: Option<String>,
    pub released_at: Option<DateTime<Utc>>,
}
