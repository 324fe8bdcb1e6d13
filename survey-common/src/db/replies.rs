//! Survey replies and their answer rows

use crate::model::{
    Answer, ClosedAnswerRow, OpenAnswerRow, QuestionKind, ReplyId, Survey, SurveyId,
    SurveyReplyIndex, SurveyReplyRow, SurveyReplyWithAnswers,
};
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

/// Store one respondent's reply
///
/// `answers[i]` answers `survey.questions[i]`. Writes one `open_answer` row per
/// open question and one `closed_answer` row per choice of each closed
/// question, selected or not. Everything is written in one transaction.
pub async fn create_reply(
    pool: &SqlitePool,
    survey: &Survey,
    person_name: &str,
    answers: &[Answer],
) -> Result<ReplyId> {
    if answers.len() != survey.questions.len() {
        return Err(Error::AnswerMismatch(format!(
            "{} answers for {} questions",
            answers.len(),
            survey.questions.len()
        )));
    }

    let mut tx = pool.begin().await?;

    let reply_id = sqlx::query("INSERT INTO survey_reply (survey_id, person_name) VALUES (?, ?)")
        .bind(survey.id)
        .bind(person_name)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for (question, answer) in survey.questions.iter().zip(answers) {
        match (&question.kind, answer) {
            (QuestionKind::Open, Answer::Open(text)) => {
                sqlx::query(
                    "INSERT INTO open_answer (survey_reply_id, question_id, answer) VALUES (?, ?, ?)",
                )
                .bind(reply_id)
                .bind(question.id)
                .bind(text)
                .execute(&mut *tx)
                .await?;
            }
            (QuestionKind::Closed { choices }, Answer::Closed(flags))
                if flags.len() == choices.len() =>
            {
                for (choice, &selected) in choices.iter().zip(flags) {
                    sqlx::query(
                        r#"
                        INSERT INTO closed_answer (survey_reply_id, question_id, closed_choice_id, answer)
                        VALUES (?, ?, ?, ?)
                        "#,
                    )
                    .bind(reply_id)
                    .bind(question.id)
                    .bind(choice.id)
                    .bind(selected)
                    .execute(&mut *tx)
                    .await?;
                }
            }
            _ => {
                // dropping tx rolls back the reply row
                return Err(Error::AnswerMismatch(format!(
                    "answer does not fit question {}",
                    question.id
                )));
            }
        }
    }

    tx.commit().await?;

    info!("Stored reply {} to survey {}", reply_id, survey.id);

    Ok(reply_id)
}

pub async fn list_survey_replies(pool: &SqlitePool, survey_id: SurveyId) -> Result<Vec<SurveyReplyRow>> {
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        "SELECT id, survey_id, person_name FROM survey_reply WHERE survey_id = ? ORDER BY id",
    )
    .bind(survey_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, survey_id, person_name)| SurveyReplyRow {
            id,
            survey_id,
            person_name,
        })
        .collect())
}

/// Reply count and ids for one survey
pub async fn survey_reply_index(pool: &SqlitePool, survey_id: SurveyId) -> Result<SurveyReplyIndex> {
    let reply_ids: Vec<ReplyId> =
        sqlx::query_scalar("SELECT id FROM survey_reply WHERE survey_id = ? ORDER BY id")
            .bind(survey_id)
            .fetch_all(pool)
            .await?;

    Ok(SurveyReplyIndex {
        survey_id,
        count: reply_ids.len(),
        reply_ids,
    })
}

/// A reply with its flat answer rows
pub async fn get_survey_reply(pool: &SqlitePool, reply_id: ReplyId) -> Result<SurveyReplyWithAnswers> {
    let row: Option<(i64, i64, String)> =
        sqlx::query_as("SELECT id, survey_id, person_name FROM survey_reply WHERE id = ?")
            .bind(reply_id)
            .fetch_optional(pool)
            .await?;

    let (id, survey_id, person_name) =
        row.ok_or_else(|| Error::NotFound(format!("survey reply {}", reply_id)))?;

    let open: Vec<(i64, i64, String)> = sqlx::query_as(
        r#"
        SELECT survey_reply_id, question_id, answer
        FROM open_answer
        WHERE survey_reply_id = ?
        ORDER BY question_id
        "#,
    )
    .bind(reply_id)
    .fetch_all(pool)
    .await?;

    let closed: Vec<(i64, i64, i64, bool)> = sqlx::query_as(
        r#"
        SELECT survey_reply_id, question_id, closed_choice_id, answer
        FROM closed_answer
        WHERE survey_reply_id = ?
        ORDER BY question_id, closed_choice_id
        "#,
    )
    .bind(reply_id)
    .fetch_all(pool)
    .await?;

    Ok(SurveyReplyWithAnswers {
        reply: SurveyReplyRow {
            id,
            survey_id,
            person_name,
        },
        open_answers: open
            .into_iter()
            .map(|(survey_reply_id, question_id, answer)| OpenAnswerRow {
                survey_reply_id,
                question_id,
                answer,
            })
            .collect(),
        closed_answers: closed
            .into_iter()
            .map(
                |(survey_reply_id, question_id, closed_choice_id, answer)| ClosedAnswerRow {
                    survey_reply_id,
                    question_id,
                    closed_choice_id,
                    answer,
                },
            )
            .collect(),
    })
}
