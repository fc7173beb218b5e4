use std::cell::RefCell;
use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::applicant::InfluencerId;
use crate::campaign::BrandId;
use crate::error::Error;

#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub token: String,
    pub brand_id: Option<BrandId>,
    pub influencer_id: Option<InfluencerId>,
}

impl Debug for SessionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionData")
            .field("token", &"<redacted>")
            .field("brand_id", &self.brand_id)
            .field("influencer_id", &self.influencer_id)
            .finish()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Session {
    data: Rc<RefCell<Option<SessionData>>>,
    path: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    #[tracing::instrument]
    pub fn restore(path: &Path) -> Result<Session, Error> {
        let data = match fs::read(path) {
            Ok(bytes) => Some(serde_json::from_slice::<SessionData>(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        debug!(restored = data.is_some(), "loaded session");

        Ok(Session {
            data: Rc::new(RefCell::new(data)),
            path: Some(path.to_path_buf()),
        })
    }

    #[tracing::instrument(skip(self))]
    pub fn login(&self, data: SessionData) -> Result<(), Error> {
        if let Some(path) = &self.path {
            fs::write(path, serde_json::to_vec(&data)?)?;
        }
        info!(brand_id = ?data.brand_id, influencer_id = ?data.influencer_id, "logged in");
        *self.data.borrow_mut() = Some(data);

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn logout(&self) -> Result<(), Error> {
        self.data.borrow_mut().take();
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }
        info!("logged out");

        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.borrow().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.data.borrow().as_ref().map(|data| data.token.clone())
    }

    pub fn brand_id(&self) -> Option<BrandId> {
        self.data
            .borrow()
            .as_ref()
            .and_then(|data| data.brand_id.clone())
    }

    pub fn influencer_id(&self) -> Option<InfluencerId> {
        self.data
            .borrow()
            .as_ref()
            .and_then(|data| data.influencer_id.clone())
    }
}
