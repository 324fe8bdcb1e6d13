//! Survey entity model
//!
//! Three families of types live here:
//! - the survey object graph as read back from storage ([`Survey`], [`Question`], [`ClosedChoice`])
//! - flat row shapes exactly as the tables store them (`*Row`), which are also the wire shapes
//! - request-boundary drafts ([`SurveyDraft`], [`AnswerInput`]) that validation turns into
//!   typed values ([`NewSurvey`], [`Answer`])

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub type AdminId = i64;
pub type SurveyId = i64;
pub type QuestionId = i64;
pub type ReplyId = i64;
/// 1-based, unique only within its question
pub type ChoiceId = i64;

// ========================================
// Object graph
// ========================================

/// Question discriminant as stored and sent over the wire (0 = open, 1 = closed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum QuestionType {
    Open,
    Closed,
}

impl QuestionType {
    pub fn code(self) -> u8 {
        match self {
            QuestionType::Open => 0,
            QuestionType::Closed => 1,
        }
    }
}

impl From<QuestionType> for u8 {
    fn from(value: QuestionType) -> Self {
        value.code()
    }
}

impl TryFrom<u8> for QuestionType {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(QuestionType::Open),
            1 => Ok(QuestionType::Closed),
            other => Err(format!("unknown question type {}", other)),
        }
    }
}

/// One option of a closed question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedChoice {
    pub id: ChoiceId,
    pub content: String,
}

/// Type-specific part of a question
///
/// Choices exist only on closed questions. The list is reference counted so a
/// copied question shares it with the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    Open,
    Closed { choices: Arc<[ClosedChoice]> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub min: i64,
    pub max: i64,
    /// 1-based display order within the survey
    pub ordering_position: i64,
    pub kind: QuestionKind,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            QuestionKind::Open => QuestionType::Open,
            QuestionKind::Closed { .. } => QuestionType::Closed,
        }
    }

    /// Choices in display order; empty for open questions
    pub fn choices(&self) -> &[ClosedChoice] {
        match &self.kind {
            QuestionKind::Open => &[],
            QuestionKind::Closed { choices } => &choices[..],
        }
    }

    /// Position of a choice id within this question's choice list
    pub fn index_of_choice(&self, choice_id: ChoiceId) -> Option<usize> {
        self.choices().iter().position(|cc| cc.id == choice_id)
    }

    /// Open questions with `min > 0` must be answered
    pub fn is_mandatory(&self) -> bool {
        self.min > 0
    }

    /// Duplicate the scalar fields; the choice list is shared, not deep-copied.
    pub fn shallow_copy(&self) -> Question {
        self.clone()
    }

    /// Overlay an answer on a shallow copy, leaving this question untouched
    pub fn with_answer(&self, answer: Answer) -> AnsweredQuestion {
        AnsweredQuestion {
            question: self.shallow_copy(),
            answer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Survey {
    pub id: SurveyId,
    pub title: String,
    pub admin_id: AdminId,
    /// Sorted by ordering position
    pub questions: Vec<Question>,
}

impl Survey {
    pub fn question(&self, question_id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}

/// Answer to one question: free text for open questions, one flag per choice for closed ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Open(String),
    Closed(Vec<bool>),
}

impl Answer {
    /// Number of selected choices; zero for open answers
    pub fn selected_count(&self) -> usize {
        match self {
            Answer::Open(_) => 0,
            Answer::Closed(flags) => flags.iter().filter(|&&selected| selected).count(),
        }
    }
}

/// A question paired with the answer a reply gave to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredQuestion {
    pub question: Question,
    pub answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: AdminId,
    pub username: String,
}

// ========================================
// Rows (storage and wire shapes)
// ========================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyRow {
    pub id: SurveyId,
    pub title: String,
    pub admin_id: AdminId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRow {
    pub id: QuestionId,
    pub survey_id: SurveyId,
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub min: i64,
    pub max: i64,
    pub ordering_position: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedChoiceRow {
    pub id: ChoiceId,
    pub question_id: QuestionId,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyReplyRow {
    pub id: ReplyId,
    pub survey_id: SurveyId,
    pub person_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAnswerRow {
    pub survey_reply_id: ReplyId,
    pub question_id: QuestionId,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedAnswerRow {
    pub survey_reply_id: ReplyId,
    pub question_id: QuestionId,
    pub closed_choice_id: ChoiceId,
    pub answer: bool,
}

/// A reply with its flat answer rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyReplyWithAnswers {
    #[serde(flatten)]
    pub reply: SurveyReplyRow,
    #[serde(rename = "openAnswers")]
    pub open_answers: Vec<OpenAnswerRow>,
    #[serde(rename = "closedAnswers")]
    pub closed_answers: Vec<ClosedAnswerRow>,
}

/// Reply count and ids for one survey
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyReplyIndex {
    pub survey_id: SurveyId,
    pub count: usize,
    pub reply_ids: Vec<ReplyId>,
}

// ========================================
// Request-boundary drafts
// ========================================

/// Survey definition as submitted by an admin, before validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<QuestionDraft>,
}

/// Numeric fields stay optional so a missing value is a validation message, not a parse failure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub question_type: Option<u8>,
    pub min: Option<u32>,
    pub max: Option<u32>,
    pub ordering_position: Option<u32>,
    #[serde(default)]
    pub closed_choices: Vec<ChoiceDraft>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChoiceDraft {
    #[serde(default)]
    pub content: String,
}

/// One submitted answer, before it is matched against its question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerInput {
    Text(String),
    Choices(Vec<bool>),
    Missing,
}

/// Validated survey definition, ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurvey {
    pub title: String,
    pub questions: Vec<NewQuestion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQuestion {
    pub title: String,
    pub min: u32,
    pub max: u32,
    pub ordering_position: u32,
    pub kind: NewQuestionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewQuestionKind {
    Open,
    /// Choice contents in submission order; ids are assigned when stored
    Closed(Vec<String>),
}

impl NewQuestion {
    pub fn question_type(&self) -> QuestionType {
        match self.kind {
            NewQuestionKind::Open => QuestionType::Open,
            NewQuestionKind::Closed(_) => QuestionType::Closed,
        }
    }
}
