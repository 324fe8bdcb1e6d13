//! Reply submission and reply browsing endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use survey_common::assembly::assemble_reply;
use survey_common::db;
use survey_common::model::{Answer, AnswerInput, ReplyId, SurveyId, SurveyReplyWithAnswers};
use survey_common::validation::{validate_reply, ValidationError};

use crate::api::surveys::ensure_owner;
use crate::error::{ApiError, ApiResult};
use crate::session::Principal;
use crate::AppState;

/// Survey reference inside a reply submission; other survey fields are ignored
#[derive(Debug, Deserialize)]
pub struct SurveyRef {
    pub id: SurveyId,
}

/// POST /api/surveys/:survey_id/survey-replies body
#[derive(Debug, Deserialize)]
pub struct ReplySubmission {
    pub survey: SurveyRef,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub answers: Vec<AnswerInput>,
}

/// GET /api/surveys/:survey_id/survey-replies/:reply_id response
#[derive(Debug, Serialize)]
pub struct ReplyDetail {
    #[serde(flatten)]
    pub reply: SurveyReplyWithAnswers,
    /// `answers[i]` answers the survey's i-th question
    pub answers: Vec<Answer>,
}

/// POST /api/surveys/:survey_id/survey-replies
///
/// Open to anonymous respondents. The survey is reloaded from storage; only
/// its id is taken from the body. Returns 201 with an empty body.
pub async fn create_survey_reply(
    State(state): State<AppState>,
    Path(survey_id): Path<SurveyId>,
    payload: Result<Json<ReplySubmission>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(submission) = payload?;

    if submission.survey.id != survey_id {
        return Err(ValidationError::new(
            "survey",
            "The survey in the body does not match the survey in the path",
        )
        .into());
    }

    let survey = db::load_survey(&state.db, survey_id).await?;
    let answers = validate_reply(&survey, &submission.username, &submission.answers)?;

    db::create_reply(&state.db, &survey, &submission.username, &answers)
        .await
        .map_err(ApiError::write_failed)?;

    Ok(StatusCode::CREATED)
}

/// GET /api/surveys/:survey_id/survey-replies/:reply_id
///
/// Owner only. A reply id belonging to a different survey is reported as not
/// found.
pub async fn get_survey_reply(
    State(state): State<AppState>,
    principal: Principal,
    Path((survey_id, reply_id)): Path<(SurveyId, ReplyId)>,
) -> ApiResult<Json<ReplyDetail>> {
    let survey_row = db::get_survey_by_id(&state.db, survey_id).await?;
    ensure_owner(&principal, &survey_row)?;

    let reply = db::get_survey_reply(&state.db, reply_id).await?;
    if reply.reply.survey_id != survey_id {
        return Err(ApiError::NotFound(format!(
            "survey reply {} in survey {}",
            reply_id, survey_id
        )));
    }

    let survey = db::load_survey(&state.db, survey_id).await?;
    let answers = assemble_reply(&survey, &reply)
        .map_err(survey_common::Error::from)?
        .into_iter()
        .map(|answered| answered.answer)
        .collect();

    Ok(Json(ReplyDetail { reply, answers }))
}
