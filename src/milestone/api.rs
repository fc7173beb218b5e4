use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Error;
use crate::http::HttpClient;

use super::{CreateMilestoneBody, Milestone};

const CREATE_MILESTONE: &str = "/milestone/create";

#[async_trait(?Send)]
pub trait MilestoneApi {
    async fn create_milestone(
        &self,
        body: &CreateMilestoneBody,
        idempotency_key: Uuid,
    ) -> Result<Milestone, Error>;
}

#[async_trait(?Send)]
impl MilestoneApi for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn create_milestone(
        &self,
        body: &CreateMilestoneBody,
        idempotency_key: Uuid,
    ) -> Result<Milestone, Error> {
        let milestone = self
            .post_json(CREATE_MILESTONE, body, Some(idempotency_key))
            .await?;

        Ok(milestone)
    }
}
