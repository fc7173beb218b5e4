use std::rc::Rc;

use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use collabdesk::applicant::ApplicantList;
use collabdesk::campaign::CampaignDetail;
use collabdesk::{Api, Config, Error, HttpApi, Session};

#[actix_rt::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    let config = Config::from_env()?;
    let session = match &config.session_path {
        Some(path) => Session::restore(path)?,
        None => Session::new(),
    };
    info!(api_url = %config.api_url, authenticated = session.is_authenticated(), "starting");

    let api: Rc<dyn Api> = Rc::new(HttpApi::new(&config, session));
    let campaign_id = std::env::args().nth(1);

    let detail = CampaignDetail::new(Rc::clone(&api));
    let campaign = detail.load(campaign_id.as_deref()).await?;
    println!("{}", campaign.name);

    let list = ApplicantList::new(api, campaign_id.as_deref(), config.search_debounce);
    list.load().await?;
    for applicant in list.rows() {
        println!(
            "{:<24} {:<16} {:<12} {:?}",
            applicant.name,
            applicant.category.as_deref().unwrap_or("-"),
            applicant.followers.as_deref().unwrap_or("-"),
            applicant.status(),
        );
    }
    if let Some(indicator) = list.indicator() {
        println!("{}", indicator);
    }

    Ok(())
}
