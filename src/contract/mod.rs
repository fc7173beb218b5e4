use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::applicant::{Applicant, ApplicantId, InfluencerId};
use crate::campaign::CampaignId;
use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

pub mod api;
pub mod document;
pub mod form;
pub use document::{DocumentHandle, DocumentRegistry};
pub use form::{ContractForm, FormPhase};

pub type ContractId = TypedId<Contract>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: ContractId,
    pub campaign_id: CampaignId,
    pub applicant_id: ApplicantId,
    pub status: ContractStatus,
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Contract {
    fn tag() -> &'static str {
        "CTR"
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Sent,
    Accepted,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDraft {
    pub effective_date: NaiveDate,
    pub brand_name: String,
    pub brand_address: String,
    pub influencer_name: String,
    pub influencer_address: String,
    pub fee_amount: String,
    pub payment_terms: String,
}

impl ContractDraft {
    pub fn for_applicant(applicant: &Applicant, today: NaiveDate) -> ContractDraft {
        ContractDraft {
            effective_date: today,
            brand_name: String::new(),
            brand_address: String::new(),
            influencer_name: applicant.name.clone(),
            influencer_address: String::new(),
            fee_amount: String::new(),
            payment_terms: String::new(),
        }
    }

    pub fn check_required(&self) -> Result<(), Error> {
        let required = [
            ("brandName", &self.brand_name),
            ("influencerName", &self.influencer_name),
            ("feeAmount", &self.fee_amount),
            ("paymentTerms", &self.payment_terms),
        ];

        match required.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(Error::MissingField { field: *field }),
            None => Ok(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRequest {
    pub campaign_id: CampaignId,
    pub applicant_id: ApplicantId,
    pub influencer_id: InfluencerId,
    #[serde(flatten)]
    pub draft: ContractDraft,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptContractBody {
    pub contract_id: ContractId,
}
