use serde::Deserialize;

/// One listing as returned by the BestJobs API.
///
/// Only the columns the pipeline carries are captured; everything else in
/// the payload is ignored. A listing without a slug or title cannot be
/// linked or displayed and is skipped during parsing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestJobsListing {
    #[allow(dead_code)]
    pub id: Option<i64>,
    pub slug: String,
    pub title: String,
    pub company_name: Option<String>,
    #[allow(dead_code)]
    pub active: Option<bool>,
    pub own_apply_url: Option<String>,
}

/// One listing as returned by the eJobs API.
///
/// The id is mandatory because the deep link embeds it alongside the slug.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EJobsListing {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub creation_date: Option<String>,
    pub expiration_date: Option<String>,
    pub external_url: Option<String>,
}
