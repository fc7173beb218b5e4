use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::api::Api;
use crate::campaign::CampaignId;
use crate::error::Error;
use crate::pagination::{Page, PageSize, SortDirection};
use crate::refresh::Refresh;
use crate::sequence::{RequestSequence, Ticket};
use crate::state::{Failure, Loadable};
use crate::typedid::TypedIdParseError;

use super::api::{ApplicantQuery, ApplicantSortField};
use super::Applicant;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub limit: PageSize,
    pub search: String,
    pub sort_by: ApplicantSortField,
    pub sort_order: SortDirection,
}

impl Default for ListParams {
    fn default() -> ListParams {
        ListParams {
            page: 1,
            limit: PageSize::default(),
            search: String::new(),
            sort_by: ApplicantSortField::CreatedAt,
            sort_order: SortDirection::Desc,
        }
    }
}

pub struct ApplicantList {
    api: Rc<dyn Api>,
    campaign_id: Result<CampaignId, TypedIdParseError>,
    params: RefCell<ListParams>,
    state: RefCell<Loadable<Page<Applicant>>>,
    sequence: RequestSequence,
    search_debounce: Duration,
}

impl ApplicantList {
    pub fn new(
        api: Rc<dyn Api>,
        raw_campaign_id: Option<&str>,
        search_debounce: Duration,
    ) -> ApplicantList {
        ApplicantList {
            api,
            campaign_id: CampaignId::parse_optional(raw_campaign_id),
            params: RefCell::new(ListParams::default()),
            state: RefCell::new(Loadable::Idle),
            sequence: RequestSequence::new(),
            search_debounce,
        }
    }

    pub fn campaign_id(&self) -> Option<&CampaignId> {
        self.campaign_id.as_ref().ok()
    }

    pub fn params(&self) -> ListParams {
        self.params.borrow().clone()
    }

    pub fn state(&self) -> Loadable<Page<Applicant>> {
        self.state.borrow().clone()
    }

    pub fn rows(&self) -> Vec<Applicant> {
        self.state
            .borrow()
            .ready()
            .map(|page| page.data.clone())
            .unwrap_or_default()
    }

    pub fn indicator(&self) -> Option<String> {
        self.state
            .borrow()
            .ready()
            .map(|page| page.pagination.indicator())
    }

    pub async fn load(&self) -> Result<(), Error> {
        let ticket = self.sequence.issue();
        self.fetch(ticket).await
    }

    pub async fn set_page(&self, page: u32) -> Result<(), Error> {
        if page < 1 {
            return Err(Error::InvalidPage { page });
        }
        self.params.borrow_mut().page = page;
        self.load().await
    }

    pub async fn set_page_size(&self, limit: PageSize) -> Result<(), Error> {
        {
            let mut params = self.params.borrow_mut();
            params.limit = limit;
            params.page = 1;
        }
        self.load().await
    }

    pub async fn set_sort(
        &self,
        sort_by: ApplicantSortField,
        sort_order: SortDirection,
    ) -> Result<(), Error> {
        {
            let mut params = self.params.borrow_mut();
            params.sort_by = sort_by;
            params.sort_order = sort_order;
        }
        self.load().await
    }

    /// Records the search text immediately but only queries once the text has
    /// been stable for the debounce window. A call superseded by a later one
    /// returns without issuing a request.
    pub async fn set_search(&self, search: &str) -> Result<(), Error> {
        {
            let mut params = self.params.borrow_mut();
            params.search = search.to_string();
            params.page = 1;
        }

        let ticket = self.sequence.issue();
        tokio::time::sleep(self.search_debounce).await;
        if !self.sequence.is_current(ticket) {
            debug!(search, "search superseded during debounce");
            return Ok(());
        }

        self.fetch(ticket).await
    }

    #[tracing::instrument(skip(self), fields(campaign_id = ?self.campaign_id))]
    async fn fetch(&self, ticket: Ticket) -> Result<(), Error> {
        let campaign_id = match &self.campaign_id {
            Ok(campaign_id) => campaign_id.clone(),
            Err(reason) => {
                let err = match reason {
                    TypedIdParseError::Empty => Error::MissingCampaignId,
                    reason => Error::InvalidIdentifier {
                        kind: "campaign",
                        reason: *reason,
                    },
                };
                *self.state.borrow_mut() = Loadable::Failed(Failure::from(&err));
                return Err(err);
            }
        };

        let query = {
            let params = self.params.borrow();
            ApplicantQuery {
                campaign_id,
                page: params.page,
                limit: params.limit,
                search: params.search.trim().to_string(),
                sort_by: params.sort_by,
                sort_order: params.sort_order,
            }
        };

        *self.state.borrow_mut() = Loadable::Loading;
        let result = self.api.applicants().list_applicants(&query).await;

        if !self.sequence.is_current(ticket) {
            warn!(page = query.page, "discarding stale applicant page");
            return Ok(());
        }

        match result {
            Ok(page) => {
                debug!(rows = page.data.len(), total = page.pagination.total, "loaded applicants");
                *self.state.borrow_mut() = Loadable::Ready(page);
                Ok(())
            }
            Err(err) => {
                *self.state.borrow_mut() = Loadable::Failed(Failure::from(&err));
                Err(err)
            }
        }
    }
}

#[async_trait(?Send)]
impl Refresh for ApplicantList {
    async fn refresh(&self) -> Result<(), Error> {
        self.load().await
    }
}
