use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::typedid::{TypedId, TypedIdMarker};

pub mod api;
pub mod detail;
pub use detail::CampaignDetail;

pub type CampaignId = TypedId<Campaign>;
pub type BrandId = TypedId<Brand>;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "CPN"
    }
}

pub struct Brand;

impl TypedIdMarker for Brand {
    fn tag() -> &'static str {
        "BRD"
    }
}
