use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Error;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub code: Option<&'static str>,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct Notices {
    queue: Rc<RefCell<VecDeque<Notice>>>,
}

impl Notices {
    pub fn new() -> Notices {
        Notices::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        let message = message.into();
        info!(%message, "notice");
        self.queue.borrow_mut().push_back(Notice {
            level: NoticeLevel::Success,
            code: None,
            message,
        });
    }

    pub fn error(&self, error: &Error) {
        warn!(code = error.error_code(), %error, "notice");
        self.queue.borrow_mut().push_back(Notice {
            level: NoticeLevel::Error,
            code: Some(error.error_code()),
            message: error.user_message(),
        });
    }

    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    pub fn drain(&self) -> Vec<Notice> {
        self.queue.borrow_mut().drain(..).collect()
    }
}
