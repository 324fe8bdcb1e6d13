//! HTTP API handlers for survey-server

pub mod health;
pub mod replies;
pub mod sessions;
pub mod surveys;

pub use health::health_routes;
pub use replies::{create_survey_reply, get_survey_reply};
pub use sessions::{current_session, login, logout};
pub use surveys::{create_survey, get_survey, list_surveys};
