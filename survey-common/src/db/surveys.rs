//! Survey, question and closed-choice rows

use crate::model::{
    AdminId, ClosedChoice, ClosedChoiceRow, NewQuestionKind, NewSurvey, Question, QuestionId,
    QuestionKind, QuestionRow, QuestionType, Survey, SurveyId, SurveyRow,
};
use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::info;

type QuestionTuple = (i64, i64, String, i64, i64, i64, i64);

fn question_row(t: QuestionTuple) -> Result<QuestionRow> {
    let (id, survey_id, title, type_code, min, max, ordering_position) = t;
    let question_type = u8::try_from(type_code)
        .map_err(|e| e.to_string())
        .and_then(QuestionType::try_from)
        .map_err(|msg| Error::Database(sqlx::Error::Decode(msg.into())))?;

    Ok(QuestionRow {
        id,
        survey_id,
        title,
        question_type,
        min,
        max,
        ordering_position,
    })
}

// ========================================
// Writes
// ========================================

/// Store a validated survey with its questions and choices
///
/// Questions keep the ordering position they were submitted with. Choices get
/// ids 1, 2, 3... in submission order, scoped to their question. All rows are
/// written in one transaction.
pub async fn create_survey(
    pool: &SqlitePool,
    admin_id: AdminId,
    survey: &NewSurvey,
) -> Result<SurveyId> {
    let mut tx = pool.begin().await?;

    let survey_id = sqlx::query("INSERT INTO survey (title, admin_id) VALUES (?, ?)")
        .bind(&survey.title)
        .bind(admin_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

    for question in &survey.questions {
        let question_id = sqlx::query(
            r#"
            INSERT INTO question (survey_id, title, type, min, max, ordering_position)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(survey_id)
        .bind(&question.title)
        .bind(question.question_type().code() as i64)
        .bind(question.min as i64)
        .bind(question.max as i64)
        .bind(question.ordering_position as i64)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        if let NewQuestionKind::Closed(choices) = &question.kind {
            for (index, content) in choices.iter().enumerate() {
                sqlx::query("INSERT INTO closed_choice (id, question_id, content) VALUES (?, ?, ?)")
                    .bind(index as i64 + 1)
                    .bind(question_id)
                    .bind(content)
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }

    tx.commit().await?;

    info!(
        "Created survey {} ({} questions) for admin {}",
        survey_id,
        survey.questions.len(),
        admin_id
    );

    Ok(survey_id)
}

// ========================================
// Reads
// ========================================

pub async fn list_surveys(pool: &SqlitePool) -> Result<Vec<SurveyRow>> {
    let rows: Vec<(i64, String, i64)> =
        sqlx::query_as("SELECT id, title, admin_id FROM survey ORDER BY id")
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, title, admin_id)| SurveyRow { id, title, admin_id })
        .collect())
}

pub async fn list_surveys_by_admin(pool: &SqlitePool, admin_id: AdminId) -> Result<Vec<SurveyRow>> {
    let rows: Vec<(i64, String, i64)> =
        sqlx::query_as("SELECT id, title, admin_id FROM survey WHERE admin_id = ? ORDER BY id")
            .bind(admin_id)
            .fetch_all(pool)
            .await?;

    Ok(rows
        .into_iter()
        .map(|(id, title, admin_id)| SurveyRow { id, title, admin_id })
        .collect())
}

pub async fn get_survey_by_id(pool: &SqlitePool, survey_id: SurveyId) -> Result<SurveyRow> {
    let row: Option<(i64, String, i64)> =
        sqlx::query_as("SELECT id, title, admin_id FROM survey WHERE id = ?")
            .bind(survey_id)
            .fetch_optional(pool)
            .await?;

    let (id, title, admin_id) =
        row.ok_or_else(|| Error::NotFound(format!("survey {}", survey_id)))?;
    Ok(SurveyRow { id, title, admin_id })
}

/// Questions of a survey in display order
pub async fn get_questions(pool: &SqlitePool, survey_id: SurveyId) -> Result<Vec<QuestionRow>> {
    let rows: Vec<QuestionTuple> = sqlx::query_as(
        r#"
        SELECT id, survey_id, title, type, min, max, ordering_position
        FROM question
        WHERE survey_id = ?
        ORDER BY ordering_position, id
        "#,
    )
    .bind(survey_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(question_row).collect()
}

/// Choices of a question in creation order
pub async fn get_closed_choices(
    pool: &SqlitePool,
    question_id: QuestionId,
) -> Result<Vec<ClosedChoiceRow>> {
    let rows: Vec<(i64, i64, String)> = sqlx::query_as(
        "SELECT id, question_id, content FROM closed_choice WHERE question_id = ? ORDER BY id",
    )
    .bind(question_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, question_id, content)| ClosedChoiceRow {
            id,
            question_id,
            content,
        })
        .collect())
}

/// Load a survey with its questions and their choices
pub async fn load_survey(pool: &SqlitePool, survey_id: SurveyId) -> Result<Survey> {
    let row = get_survey_by_id(pool, survey_id).await?;

    let mut questions = Vec::new();
    for q in get_questions(pool, survey_id).await? {
        let kind = match q.question_type {
            QuestionType::Open => QuestionKind::Open,
            QuestionType::Closed => {
                let choices: Vec<ClosedChoice> = get_closed_choices(pool, q.id)
                    .await?
                    .into_iter()
                    .map(|c| ClosedChoice {
                        id: c.id,
                        content: c.content,
                    })
                    .collect();
                QuestionKind::Closed {
                    choices: choices.into(),
                }
            }
        };
        questions.push(Question {
            id: q.id,
            title: q.title,
            min: q.min,
            max: q.max,
            ordering_position: q.ordering_position,
            kind,
        });
    }

    Ok(Survey {
        id: row.id,
        title: row.title,
        admin_id: row.admin_id,
        questions,
    })
}
