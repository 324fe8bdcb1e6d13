//! Structural validation of survey definitions and replies
//!
//! Both validators are fail-fast: they report the first violated rule in a
//! fixed order and never accumulate. On success they hand back the typed value
//! the rest of the system works with, so a draft that passed validation cannot
//! be confused with one that did not.
//!
//! The HTTP layer runs these on every submission regardless of any checks a
//! client performed before sending.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::model::{
    Answer, AnswerInput, NewQuestion, NewQuestionKind, NewSurvey, QuestionDraft, QuestionKind,
    QuestionType, Survey, SurveyDraft,
};

/// Longest accepted open answer, in characters
pub const MAX_OPEN_ANSWER_LEN: usize = 200;

/// First rule a submission violated
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Invalid {param} - {msg}")]
pub struct ValidationError {
    /// Request field the rule applies to
    pub param: String,
    pub msg: String,
}

impl ValidationError {
    pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            msg: msg.into(),
        }
    }
}

// ========================================
// Survey authoring
// ========================================

/// Validate an authored survey and convert it into a [`NewSurvey`]
///
/// Rules, in order: title non-empty, at least one question, then per question
/// (in submission order) position in `[1, N]` and not reused, title non-empty,
/// type open or closed, min and max present, `min <= max`, `max >= 1`, and for
/// closed questions at least one option with every option non-empty.
pub fn validate_survey(draft: &SurveyDraft) -> Result<NewSurvey, ValidationError> {
    if draft.title.is_empty() {
        return Err(ValidationError::new("title", "The survey's title can't be empty!"));
    }
    if draft.questions.is_empty() {
        return Err(ValidationError::new(
            "questions",
            "The survey must contain at least one question.",
        ));
    }

    let count = draft.questions.len();
    let mut used_positions = HashSet::with_capacity(count);
    let mut questions = Vec::with_capacity(count);

    for q in &draft.questions {
        let position = match q.ordering_position {
            Some(p) if p >= 1 && (p as usize) <= count => p,
            _ => {
                return Err(ValidationError::new(
                    "questions",
                    "The survey contains a question with invalid position.",
                ))
            }
        };
        if !used_positions.insert(position) {
            return Err(ValidationError::new(
                "questions",
                format!("The survey contains two questions at position {}.", position),
            ));
        }
        questions.push(validate_question(q, position)?);
    }

    Ok(NewSurvey {
        title: draft.title.clone(),
        questions,
    })
}

fn validate_question(q: &QuestionDraft, position: u32) -> Result<NewQuestion, ValidationError> {
    let invalid = |msg: String| ValidationError::new("questions", msg);

    if q.title.is_empty() {
        return Err(invalid(format!(
            "The question {} can't have an empty title!",
            position
        )));
    }

    let question_type = q
        .question_type
        .and_then(|code| QuestionType::try_from(code).ok())
        .ok_or_else(|| invalid(format!("The question {} has an invalid type.", position)))?;

    let (min, max) = match (q.min, q.max) {
        (Some(min), Some(max)) => (min, max),
        _ => {
            return Err(invalid(format!(
                "The question {} has invalid constraints.",
                position
            )))
        }
    };
    if min > max {
        return Err(invalid(format!(
            "The question {} has a minimum required answers greater than the maximum allowed!",
            position
        )));
    }
    if max < 1 {
        return Err(invalid(format!(
            "The question {} has zero maximum allowed answers!",
            position
        )));
    }

    let kind = match question_type {
        QuestionType::Open => NewQuestionKind::Open,
        QuestionType::Closed => {
            if q.closed_choices.is_empty() {
                return Err(invalid(format!(
                    "The closed question {} can't have zero options!",
                    position
                )));
            }
            if q.closed_choices.iter().any(|cc| cc.content.is_empty()) {
                return Err(invalid(format!(
                    "The closed question {} can't contain an empty option!",
                    position
                )));
            }
            NewQuestionKind::Closed(q.closed_choices.iter().map(|cc| cc.content.clone()).collect())
        }
    };

    Ok(NewQuestion {
        title: q.title.clone(),
        min,
        max,
        ordering_position: position,
        kind,
    })
}

// ========================================
// Reply submission
// ========================================

/// Validate a reply against the stored survey and convert it into one [`Answer`] per question
///
/// `answers[i]` must answer `survey.questions[i]`. A `null` open answer reads as
/// the empty string.
pub fn validate_reply(
    survey: &Survey,
    person_name: &str,
    answers: &[AnswerInput],
) -> Result<Vec<Answer>, ValidationError> {
    if person_name.is_empty() {
        return Err(ValidationError::new("username", "Your name can not be empty."));
    }
    if answers.len() != survey.questions.len() {
        return Err(ValidationError::new(
            "answers",
            "Invalid number of answers provided",
        ));
    }

    let invalid = |msg: &str| ValidationError::new("answers", msg);
    let mut validated = Vec::with_capacity(answers.len());

    for (question, answer) in survey.questions.iter().zip(answers) {
        match &question.kind {
            QuestionKind::Open => {
                let text = match answer {
                    AnswerInput::Text(text) => text.clone(),
                    AnswerInput::Missing => String::new(),
                    AnswerInput::Choices(_) => {
                        return Err(invalid("An open question received a multiple-choice answer."))
                    }
                };
                if question.is_mandatory() && text.is_empty() {
                    return Err(invalid("A mandatory open question is empty."));
                }
                if text.chars().count() > MAX_OPEN_ANSWER_LEN {
                    return Err(invalid(
                        "An open question answer contains more than 200 characters.",
                    ));
                }
                validated.push(Answer::Open(text));
            }
            QuestionKind::Closed { choices } => {
                let flags = match answer {
                    AnswerInput::Choices(flags) if flags.len() == choices.len() => flags.clone(),
                    _ => {
                        return Err(invalid(
                            "A closed question needs exactly one selection flag per option.",
                        ))
                    }
                };
                let answer = Answer::Closed(flags);
                let selected = answer.selected_count() as i64;
                if selected < question.min {
                    return Err(invalid(
                        "A closed question doesn't have the minimum required selected options.",
                    ));
                }
                if selected > question.max {
                    return Err(invalid("A closed question has too many selected options."));
                }
                validated.push(answer);
            }
        }
    }

    Ok(validated)
}
