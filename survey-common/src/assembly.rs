//! Reply reconstruction
//!
//! A reply is stored flat: one `open_answer` row per open question and one
//! `closed_answer` row per (question, option) pair. Reading it back means
//! rebuilding a list where `answers[i]` belongs to `questions[i]` and, for a
//! closed question, `answers[i][j]` belongs to `questions[i].choices()[j]`.
//!
//! Rows carry option ids, not positions. Each id is resolved against the
//! question's current option list, so every id a stored row references must
//! still be present there. Anything that cannot be placed is an error; rows are
//! never dropped silently.

use thiserror::Error;

use crate::model::{
    Answer, AnsweredQuestion, ChoiceId, ClosedAnswerRow, OpenAnswerRow, Question, QuestionId,
    QuestionKind, Survey, SurveyReplyWithAnswers,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("answer references unknown question {0}")]
    UnknownQuestion(QuestionId),

    #[error("question {question_id} has no option {choice_id}")]
    UnknownChoice {
        question_id: QuestionId,
        choice_id: ChoiceId,
    },

    #[error("stored answer kind does not match question {0}")]
    KindMismatch(QuestionId),

    #[error("question {0} has more than one open answer")]
    DuplicateAnswer(QuestionId),

    #[error("question {0} has no stored answer")]
    MissingAnswer(QuestionId),

    #[error("stored selections for question {0} do not cover each option exactly once")]
    IncompleteSelections(QuestionId),
}

/// Rebuild per-question answers from flat answer rows
///
/// `questions` must be in display order with their options in display order;
/// the result follows the same order.
pub fn assemble_answers(
    questions: &[Question],
    open_answers: &[OpenAnswerRow],
    closed_answers: &[ClosedAnswerRow],
) -> Result<Vec<AnsweredQuestion>, AssemblyError> {
    let locate = |question_id: QuestionId| {
        questions
            .iter()
            .position(|q| q.id == question_id)
            .ok_or(AssemblyError::UnknownQuestion(question_id))
    };

    let mut open_slots: Vec<Option<String>> = vec![None; questions.len()];
    // (option position, selected) pairs, sorted once every row is placed
    let mut closed_slots: Vec<Vec<(usize, bool)>> = vec![Vec::new(); questions.len()];

    for row in open_answers {
        let i = locate(row.question_id)?;
        if !matches!(questions[i].kind, QuestionKind::Open) {
            return Err(AssemblyError::KindMismatch(row.question_id));
        }
        if open_slots[i].replace(row.answer.clone()).is_some() {
            return Err(AssemblyError::DuplicateAnswer(row.question_id));
        }
    }

    for row in closed_answers {
        let i = locate(row.question_id)?;
        let question = &questions[i];
        if matches!(question.kind, QuestionKind::Open) {
            return Err(AssemblyError::KindMismatch(row.question_id));
        }
        let position = question
            .index_of_choice(row.closed_choice_id)
            .ok_or(AssemblyError::UnknownChoice {
                question_id: row.question_id,
                choice_id: row.closed_choice_id,
            })?;
        closed_slots[i].push((position, row.answer));
    }

    questions
        .iter()
        .zip(open_slots)
        .zip(closed_slots)
        .map(|((question, open), mut selections)| -> Result<AnsweredQuestion, AssemblyError> {
            let answer = match question.kind {
                QuestionKind::Open => {
                    Answer::Open(open.ok_or(AssemblyError::MissingAnswer(question.id))?)
                }
                QuestionKind::Closed { .. } => {
                    if selections.is_empty() {
                        return Err(AssemblyError::MissingAnswer(question.id));
                    }
                    selections.sort_by_key(|&(position, _)| position);
                    let covers_all = selections
                        .iter()
                        .map(|&(position, _)| position)
                        .eq(0..question.choices().len());
                    if !covers_all {
                        return Err(AssemblyError::IncompleteSelections(question.id));
                    }
                    Answer::Closed(selections.into_iter().map(|(_, selected)| selected).collect())
                }
            };
            Ok(question.with_answer(answer))
        })
        .collect()
}

/// Rebuild a stored reply against the survey it answers
pub fn assemble_reply(
    survey: &Survey,
    reply: &SurveyReplyWithAnswers,
) -> Result<Vec<AnsweredQuestion>, AssemblyError> {
    assemble_answers(&survey.questions, &reply.open_answers, &reply.closed_answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ClosedChoice;

    fn questions() -> Vec<Question> {
        vec![
            Question {
                id: 10,
                title: "Say something".to_string(),
                min: 0,
                max: 1,
                ordering_position: 1,
                kind: QuestionKind::Open,
            },
            Question {
                id: 11,
                title: "Pick".to_string(),
                min: 0,
                max: 3,
                ordering_position: 2,
                kind: QuestionKind::Closed {
                    choices: vec![
                        ClosedChoice { id: 1, content: "a".to_string() },
                        ClosedChoice { id: 2, content: "b".to_string() },
                        ClosedChoice { id: 3, content: "c".to_string() },
                    ]
                    .into(),
                },
            },
        ]
    }

    fn open(question_id: QuestionId, answer: &str) -> OpenAnswerRow {
        OpenAnswerRow {
            survey_reply_id: 1,
            question_id,
            answer: answer.to_string(),
        }
    }

    fn closed(question_id: QuestionId, choice: ChoiceId, answer: bool) -> ClosedAnswerRow {
        ClosedAnswerRow {
            survey_reply_id: 1,
            question_id,
            closed_choice_id: choice,
            answer,
        }
    }

    fn answers_of(assembled: &[AnsweredQuestion]) -> Vec<Answer> {
        assembled.iter().map(|aq| aq.answer.clone()).collect()
    }

    #[test]
    fn test_reassembles_in_question_and_option_order() {
        // rows arrive shuffled; output follows question and option order
        let assembled = assemble_answers(
            &questions(),
            &[open(10, "hello")],
            &[closed(11, 3, true), closed(11, 1, true), closed(11, 2, false)],
        )
        .unwrap();

        assert_eq!(
            answers_of(&assembled),
            vec![
                Answer::Open("hello".to_string()),
                Answer::Closed(vec![true, false, true]),
            ]
        );
        assert_eq!(assembled[1].question.id, 11);
    }

    #[test]
    fn test_unknown_question_fails() {
        let err = assemble_answers(&questions(), &[open(99, "x")], &[]).unwrap_err();
        assert_eq!(err, AssemblyError::UnknownQuestion(99));
    }

    #[test]
    fn test_unknown_choice_fails() {
        let err = assemble_answers(
            &questions(),
            &[open(10, "")],
            &[closed(11, 1, true), closed(11, 2, false), closed(11, 4, false)],
        )
        .unwrap_err();
        assert_eq!(
            err,
            AssemblyError::UnknownChoice {
                question_id: 11,
                choice_id: 4
            }
        );
    }

    #[test]
    fn test_kind_mismatch_fails() {
        let err = assemble_answers(&questions(), &[open(11, "x")], &[]).unwrap_err();
        assert_eq!(err, AssemblyError::KindMismatch(11));

        let err = assemble_answers(&questions(), &[], &[closed(10, 1, true)]).unwrap_err();
        assert_eq!(err, AssemblyError::KindMismatch(10));
    }

    #[test]
    fn test_missing_and_partial_answers_fail() {
        let err = assemble_answers(
            &questions(),
            &[],
            &[closed(11, 1, true), closed(11, 2, true), closed(11, 3, true)],
        )
        .unwrap_err();
        assert_eq!(err, AssemblyError::MissingAnswer(10));

        let err = assemble_answers(&questions(), &[open(10, "")], &[]).unwrap_err();
        assert_eq!(err, AssemblyError::MissingAnswer(11));

        let err = assemble_answers(
            &questions(),
            &[open(10, "")],
            &[closed(11, 1, true), closed(11, 1, false), closed(11, 3, true)],
        )
        .unwrap_err();
        assert_eq!(err, AssemblyError::IncompleteSelections(11));
    }

    #[test]
    fn test_duplicate_open_answer_fails() {
        let err = assemble_answers(
            &questions(),
            &[open(10, "one"), open(10, "two")],
            &[closed(11, 1, false), closed(11, 2, false), closed(11, 3, false)],
        )
        .unwrap_err();
        assert_eq!(err, AssemblyError::DuplicateAnswer(10));
    }

    #[test]
    fn test_source_questions_untouched() {
        let qs = questions();
        let assembled = assemble_answers(
            &qs,
            &[open(10, "hi")],
            &[closed(11, 1, false), closed(11, 2, true), closed(11, 3, false)],
        )
        .unwrap();
        assert_eq!(assembled[0].question, qs[0]);
        assert_eq!(assembled[1].question.choices(), qs[1].choices());
    }
}
