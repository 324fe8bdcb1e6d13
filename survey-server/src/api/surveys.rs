//! Survey listing, detail and authoring endpoints

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use survey_common::db;
use survey_common::model::{
    ClosedChoiceRow, QuestionRow, QuestionType, SurveyDraft, SurveyId, SurveyReplyIndex, SurveyRow,
};
use survey_common::validation::validate_survey;
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use crate::session::Principal;
use crate::AppState;

/// GET /api/surveys response
///
/// Admins see only their own surveys, each with its reply index. Anonymous
/// callers get a bare array of every survey.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SurveyListing {
    Owned {
        surveys: Vec<SurveyRow>,
        #[serde(rename = "allSurveyReplies")]
        all_survey_replies: Vec<SurveyReplyIndex>,
    },
    Public(Vec<SurveyRow>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SurveyHeader {
    Owned {
        survey: SurveyRow,
        #[serde(rename = "surveyReplies")]
        survey_replies: SurveyReplyIndex,
    },
    Public(SurveyRow),
}

/// GET /api/surveys/:survey_id response
#[derive(Debug, Serialize)]
pub struct SurveyDetail {
    pub survey: SurveyHeader,
    pub questions: Vec<QuestionRow>,
    /// `all_closed_choices[i]` belongs to `questions[i]`
    #[serde(rename = "allClosedChoices")]
    pub all_closed_choices: Vec<Vec<ClosedChoiceRow>>,
}

/// Reject admins reading a survey they do not own
pub(crate) fn ensure_owner(principal: &Principal, survey: &SurveyRow) -> ApiResult<()> {
    if survey.admin_id != principal.id() {
        warn!(
            "Admin {} denied access to survey {} owned by admin {}",
            principal.id(),
            survey.id,
            survey.admin_id
        );
        return Err(ApiError::Forbidden(format!(
            "survey {} belongs to another admin",
            survey.id
        )));
    }
    Ok(())
}

/// GET /api/surveys
pub async fn list_surveys(
    State(state): State<AppState>,
    principal: Option<Principal>,
) -> ApiResult<Json<SurveyListing>> {
    let Some(principal) = principal else {
        return Ok(Json(SurveyListing::Public(db::list_surveys(&state.db).await?)));
    };

    let surveys = db::list_surveys_by_admin(&state.db, principal.id()).await?;
    let mut all_survey_replies = Vec::with_capacity(surveys.len());
    for survey in &surveys {
        all_survey_replies.push(db::survey_reply_index(&state.db, survey.id).await?);
    }

    Ok(Json(SurveyListing::Owned {
        surveys,
        all_survey_replies,
    }))
}

/// GET /api/surveys/:survey_id
pub async fn get_survey(
    State(state): State<AppState>,
    principal: Option<Principal>,
    Path(survey_id): Path<SurveyId>,
) -> ApiResult<Json<SurveyDetail>> {
    let survey = db::get_survey_by_id(&state.db, survey_id).await?;

    let header = match &principal {
        Some(principal) => {
            ensure_owner(principal, &survey)?;
            let survey_replies = db::survey_reply_index(&state.db, survey_id).await?;
            SurveyHeader::Owned {
                survey,
                survey_replies,
            }
        }
        None => SurveyHeader::Public(survey),
    };

    let questions = db::get_questions(&state.db, survey_id).await?;
    let mut all_closed_choices = Vec::with_capacity(questions.len());
    for question in &questions {
        let choices = match question.question_type {
            QuestionType::Open => Vec::new(),
            QuestionType::Closed => db::get_closed_choices(&state.db, question.id).await?,
        };
        all_closed_choices.push(choices);
    }

    Ok(Json(SurveyDetail {
        survey: header,
        questions,
        all_closed_choices,
    }))
}

/// POST /api/surveys
///
/// Returns 201 with an empty body.
pub async fn create_survey(
    State(state): State<AppState>,
    principal: Principal,
    payload: Result<Json<SurveyDraft>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(draft) = payload?;
    let survey = validate_survey(&draft)?;

    let survey_id = db::create_survey(&state.db, principal.id(), &survey)
        .await
        .map_err(ApiError::write_failed)?;

    info!("Admin {} published survey {}", principal.0.username, survey_id);

    Ok(StatusCode::CREATED)
}
