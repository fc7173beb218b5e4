use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use tracing::warn;

use crate::api::Api;
use crate::error::Error;
use crate::refresh::Refresh;
use crate::sequence::RequestSequence;
use crate::state::{Failure, Loadable};
use crate::typedid::TypedIdParseError;

use super::{Campaign, CampaignId};

pub struct CampaignDetail {
    api: Rc<dyn Api>,
    campaign_id: RefCell<Option<CampaignId>>,
    state: RefCell<Loadable<Campaign>>,
    sequence: RequestSequence,
}

impl CampaignDetail {
    pub fn new(api: Rc<dyn Api>) -> CampaignDetail {
        CampaignDetail {
            api,
            campaign_id: RefCell::new(None),
            state: RefCell::new(Loadable::Idle),
            sequence: RequestSequence::new(),
        }
    }

    pub fn state(&self) -> Loadable<Campaign> {
        self.state.borrow().clone()
    }

    #[tracing::instrument(skip(self))]
    pub async fn load(&self, raw_campaign_id: Option<&str>) -> Result<Campaign, Error> {
        let ticket = self.sequence.issue();
        let campaign_id = match CampaignId::parse_optional(raw_campaign_id) {
            Ok(campaign_id) => campaign_id,
            Err(reason) => {
                let err = match reason {
                    TypedIdParseError::Empty => Error::MissingCampaignId,
                    reason => Error::InvalidIdentifier {
                        kind: "campaign",
                        reason,
                    },
                };
                self.campaign_id.borrow_mut().take();
                *self.state.borrow_mut() = Loadable::Failed(Failure::from(&err));
                return Err(err);
            }
        };

        *self.campaign_id.borrow_mut() = Some(campaign_id.clone());
        *self.state.borrow_mut() = Loadable::Loading;
        let result = self.api.campaigns().fetch_campaign_by_id(&campaign_id).await;

        if self.sequence.is_current(ticket) {
            *self.state.borrow_mut() = match &result {
                Ok(campaign) => Loadable::Ready(campaign.clone()),
                Err(err) => Loadable::Failed(Failure::from(err)),
            };
        } else {
            warn!(?campaign_id, "discarding stale campaign detail");
        }

        result
    }
}

#[async_trait(?Send)]
impl Refresh for CampaignDetail {
    async fn refresh(&self) -> Result<(), Error> {
        let campaign_id = self.campaign_id.borrow().clone();
        match campaign_id {
            Some(campaign_id) => self.load(Some(campaign_id.as_str())).await.map(|_| ()),
            None => Err(Error::MissingCampaignId),
        }
    }
}
