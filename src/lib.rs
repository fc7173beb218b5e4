pub mod api;
pub mod applicant;
pub mod campaign;
pub mod config;
pub mod contract;
pub mod error;
pub mod http;
pub mod milestone;
pub mod notice;
pub mod pagination;
pub mod refresh;
pub mod sequence;
pub mod session;
pub mod state;
pub mod typedid;

pub use api::{Api, HttpApi};
pub use config::Config;
pub use error::Error;
pub use session::{Session, SessionData};
