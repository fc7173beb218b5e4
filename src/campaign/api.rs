use async_trait::async_trait;

use crate::error::Error;
use crate::http::HttpClient;

use super::{Campaign, CampaignId};

#[async_trait(?Send)]
pub trait CampaignApi {
    async fn fetch_campaign_by_id(&self, campaign_id: &CampaignId) -> Result<Campaign, Error>;
}

#[async_trait(?Send)]
impl CampaignApi for HttpClient {
    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(&self, campaign_id: &CampaignId) -> Result<Campaign, Error> {
        let campaign = self
            .get_json(&format!("/campaign/{}", campaign_id.as_str()))
            .await?;

        Ok(campaign)
    }
}
