use serde::{Deserialize, Serialize};

/// Cached BestJobs row: the minimal projection plus the generated link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestJobsRow {
    pub title: String,
    pub company_name: Option<String>,
    pub own_apply_url: Option<String>,
    pub link: String,
}

impl BestJobsRow {
    pub const HEADERS: [&'static str; 4] = ["title", "companyName", "ownApplyUrl", "link"];
}

/// Cached eJobs row. `own_apply_url` holds the provider's `externalUrl`,
/// renamed so both tables share the column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EJobsRow {
    pub title: String,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub own_apply_url: Option<String>,
    pub link: String,
}

impl EJobsRow {
    pub const HEADERS: [&'static str; 5] = [
        "title",
        "creationDate",
        "expirationDate",
        "ownApplyUrl",
        "link",
    ];
}

/// Listing that can be applied to outside the job board. The column set is
/// the union of both source projections; fields the source row does not
/// carry stay empty. External rows have no link column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalRow {
    pub title: String,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub own_apply_url: String,
    pub company_name: Option<String>,
}

impl ExternalRow {
    pub const HEADERS: [&'static str; 5] = [
        "title",
        "creationDate",
        "expirationDate",
        "ownApplyUrl",
        "companyName",
    ];
}

/// Everything one scrape produces: both provider tables and, when any
/// listing carries an apply URL, the derived external table.
#[derive(Debug, Clone, PartialEq)]
pub struct JobsSnapshot {
    pub bestjobs: Vec<BestJobsRow>,
    pub ejobs: Vec<EJobsRow>,
    pub external: Option<Vec<ExternalRow>>,
}
