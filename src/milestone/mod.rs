use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::applicant::ApplicantId;
use crate::campaign::CampaignId;
use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod api;
pub mod form;
pub use form::MilestoneForm;

pub type MilestoneId = TypedId<Milestone>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: MilestoneId,
    pub campaign_id: CampaignId,
    pub applicant_id: ApplicantId,
    pub title: String,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Milestone {
    fn tag() -> &'static str {
        "MLS"
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MilestoneDraft {
    pub title: String,
    pub amount: String,
    pub description: String,
}

impl MilestoneDraft {
    pub fn check_required(&self) -> Result<(), Error> {
        if self.title.trim().is_empty() {
            return Err(Error::MissingField { field: "title" });
        }
        if self.amount.trim().is_empty() {
            return Err(Error::MissingField { field: "amount" });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn from_input(raw: &str) -> Amount {
        let raw = raw.trim();
        match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => Amount::Number(number),
            _ => Amount::Text(raw.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMilestoneBody {
    pub campaign_id: CampaignId,
    pub applicant_id: ApplicantId,
    pub title: String,
    pub amount: Amount,
    pub description: Option<String>,
}

impl CreateMilestoneBody {
    pub fn from_draft(
        campaign_id: CampaignId,
        applicant_id: ApplicantId,
        draft: &MilestoneDraft,
    ) -> CreateMilestoneBody {
        let description = draft.description.trim();
        CreateMilestoneBody {
            campaign_id,
            applicant_id,
            title: draft.title.trim().to_string(),
            amount: Amount::from_input(&draft.amount),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        }
    }
}
