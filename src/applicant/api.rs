use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignId;
use crate::error::Error;
use crate::http::HttpClient;
use crate::pagination::{Page, PageSize, SortDirection};

use super::{Applicant, ApplicantId};

const LIST_APPLICANTS: &str = "/campaign/applicants";
const APPROVE_APPLICANT: &str = "/campaign/applicant/approve";
const REJECT_APPLICANT: &str = "/campaign/applicant/reject";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicantSortField {
    CreatedAt,
    Name,
    Category,
    Followers,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantQuery {
    pub campaign_id: CampaignId,
    pub page: u32,
    pub limit: PageSize,
    pub search: String,
    pub sort_by: ApplicantSortField,
    pub sort_order: SortDirection,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantRef {
    pub campaign_id: CampaignId,
    pub applicant_id: ApplicantId,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectApplicantBody {
    pub campaign_id: CampaignId,
    pub applicant_id: ApplicantId,
    pub reason: Option<String>,
}

#[async_trait(?Send)]
pub trait ApplicantApi {
    async fn list_applicants(&self, query: &ApplicantQuery) -> Result<Page<Applicant>, Error>;

    async fn approve_applicant(&self, target: &ApplicantRef) -> Result<Applicant, Error>;

    async fn reject_applicant(&self, body: &RejectApplicantBody) -> Result<Applicant, Error>;
}

#[async_trait(?Send)]
impl ApplicantApi for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn list_applicants(&self, query: &ApplicantQuery) -> Result<Page<Applicant>, Error> {
        let page = self.post_json(LIST_APPLICANTS, query, None).await?;

        Ok(page)
    }

    #[tracing::instrument(skip(self))]
    async fn approve_applicant(&self, target: &ApplicantRef) -> Result<Applicant, Error> {
        let applicant = self.post_json(APPROVE_APPLICANT, target, None).await?;

        Ok(applicant)
    }

    #[tracing::instrument(skip(self))]
    async fn reject_applicant(&self, body: &RejectApplicantBody) -> Result<Applicant, Error> {
        let applicant = self.post_json(REJECT_APPLICANT, body, None).await?;

        Ok(applicant)
    }
}
