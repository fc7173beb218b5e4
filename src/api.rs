use crate::applicant::api::ApplicantApi;
use crate::campaign::api::CampaignApi;
use crate::config::Config;
use crate::contract::api::ContractApi;
use crate::http::HttpClient;
use crate::milestone::api::MilestoneApi;
use crate::session::Session;

pub trait Api {
    fn campaigns(&self) -> &dyn CampaignApi;
    fn applicants(&self) -> &dyn ApplicantApi;
    fn contracts(&self) -> &dyn ContractApi;
    fn milestones(&self) -> &dyn MilestoneApi;
}

#[derive(Clone, Debug)]
pub struct HttpApi {
    client: HttpClient,
}

impl HttpApi {
    pub fn new(config: &Config, session: Session) -> HttpApi {
        HttpApi {
            client: HttpClient::new(config, session),
        }
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }
}

impl Api for HttpApi {
    fn campaigns(&self) -> &dyn CampaignApi {
        &self.client
    }

    fn applicants(&self) -> &dyn ApplicantApi {
        &self.client
    }

    fn contracts(&self) -> &dyn ContractApi {
        &self.client
    }

    fn milestones(&self) -> &dyn MilestoneApi {
        &self.client
    }
}
