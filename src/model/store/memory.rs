use std::{cmp::Reverse, sync::Mutex};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::{
    db::{Answer, NewAnswer, NewSurvey, Survey},
    mongodb::Id,
};

use super::SurveyStore;

/// A [`SurveyStore`] that keeps everything in memory, standing in for the
/// database in tests.
#[derive(Default)]
pub struct MemoryStore {
    surveys: Mutex<Vec<Survey>>,
    answers: Mutex<Vec<Answer>>,
}

/// Clone the records newest first. Records are held in insertion order, so
/// reversing before the stable sort puts later inserts first on equal times.
fn newest_first<T>(
    records: impl DoubleEndedIterator<Item = T>,
    created_at: impl Fn(&T) -> DateTime<Utc>,
) -> Vec<T> {
    let mut records = records.rev().collect::<Vec<_>>();
    records.sort_by_key(|record| Reverse(created_at(record)));
    records
}

#[rocket::async_trait]
impl SurveyStore for MemoryStore {
    async fn insert_survey(&self, survey: NewSurvey) -> Result<Survey> {
        let survey = Survey {
            id: Id::new(),
            survey,
        };
        self.surveys.lock().unwrap().push(survey.clone());
        Ok(survey)
    }

    async fn surveys(&self) -> Result<Vec<Survey>> {
        let surveys = self.surveys.lock().unwrap();
        Ok(newest_first(surveys.iter().cloned(), |s| s.created_at))
    }

    async fn survey_by_id(&self, id: Id) -> Result<Option<Survey>> {
        let surveys = self.surveys.lock().unwrap();
        Ok(surveys.iter().find(|s| s.id == id).cloned())
    }

    async fn latest_survey(&self) -> Result<Option<Survey>> {
        Ok(self.surveys().await?.into_iter().next())
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<Answer> {
        let answer = Answer {
            id: Id::new(),
            answer,
        };
        self.answers.lock().unwrap().push(answer.clone());
        Ok(answer)
    }

    async fn answers_for_survey(&self, survey: &str) -> Result<Vec<Answer>> {
        let answers = self.answers.lock().unwrap();
        let matching = answers.iter().filter(|a| a.survey == survey).cloned();
        Ok(newest_first(matching, |a| a.created_at))
    }

    async fn count_answers(&self, survey: &str) -> Result<u64> {
        let answers = self.answers.lock().unwrap();
        Ok(answers.iter().filter(|a| a.survey == survey).count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::model::db::{AnswerCore, SurveyCore};

    #[rocket::async_test]
    async fn surveys_newest_first() {
        let store = MemoryStore::default();
        let now = Utc::now();

        let mut older = SurveyCore::example();
        older.created_at = now - Duration::seconds(10);
        let older = store.insert_survey(older).await.unwrap();

        let mut newer = SurveyCore::example_anonymous();
        newer.created_at = now;
        let newer = store.insert_survey(newer).await.unwrap();

        let ids = store
            .surveys()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(store.latest_survey().await.unwrap().unwrap().id, newer.id);
    }

    #[rocket::async_test]
    async fn equal_times_later_insert_first() {
        let store = MemoryStore::default();
        let survey = SurveyCore::example();
        let first = store.insert_survey(survey.clone()).await.unwrap();
        let second = store.insert_survey(survey).await.unwrap();

        let surveys = store.surveys().await.unwrap();
        assert_eq!(surveys[0].id, second.id);
        assert_eq!(surveys[1].id, first.id);
    }

    #[rocket::async_test]
    async fn answers_filtered_and_counted() {
        let store = MemoryStore::default();
        let survey = store.insert_survey(SurveyCore::example()).await.unwrap();
        let other = Id::new();

        store
            .insert_answer(AnswerCore::example(survey.id))
            .await
            .unwrap();
        store
            .insert_answer(AnswerCore::example(survey.id))
            .await
            .unwrap();
        store.insert_answer(AnswerCore::example(other)).await.unwrap();

        let key = survey.id.to_string();
        assert_eq!(store.count_answers(&key).await.unwrap(), 2);
        assert_eq!(store.answers_for_survey(&key).await.unwrap().len(), 2);
        assert_eq!(store.count_answers("missing").await.unwrap(), 0);
        assert!(store.survey_by_id(other).await.unwrap().is_none());
    }
}
