use async_graphql::{Context, Object, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::model::{
    api::{NewAnswerInput, NewSurveyInput, SurveyView},
    db::Survey,
    store::{Db, SurveyStore},
};
use crate::notify::{Notification, NotificationBus};

use super::query::find_survey;

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a survey and announce it to real-time listeners.
    async fn add_new_survey(&self, ctx: &Context<'_>, input: NewSurveyInput) -> Result<Survey> {
        let store = ctx.data::<Db>()?;
        let bus = ctx.data::<NotificationBus>()?;

        let survey = store.insert_survey(input.into_new_survey(now())?).await?;
        // Nothing can have answered it yet.
        bus.publish(Notification::NewSurvey(SurveyView::new(&survey, 0)));
        info!("New survey {}", survey.id);

        Ok(survey)
    }

    /// Record an answer and announce the answered survey to real-time
    /// listeners. Returns the answered survey, or null if there is no survey
    /// with the given ID; the answer is stored and announced either way.
    async fn send_answer(
        &self,
        ctx: &Context<'_>,
        input: NewAnswerInput,
    ) -> Result<Option<Survey>> {
        let store = ctx.data::<Db>()?;
        let bus = ctx.data::<NotificationBus>()?;

        let answer = store.insert_answer(input.into_new_answer(now())).await?;
        let survey = find_survey(store, &answer.survey).await?;
        let view = match &survey {
            Some(survey) => {
                debug!("Answer {} recorded for {survey:?}", answer.id);
                answered_view(store, survey).await
            }
            None => {
                warn!(
                    "Answer {} recorded for unknown survey '{}'",
                    answer.id, answer.survey
                );
                None
            }
        };
        bus.publish(Notification::NewAnswer(view));

        Ok(survey)
    }
}

/// The broadcast payload for a freshly answered survey. The answer is already
/// stored, so a failure here is logged and announced as a null survey rather
/// than failing the mutation.
async fn answered_view(store: &Db, survey: &Survey) -> Option<SurveyView> {
    match store.count_answers(&survey.id.to_string()).await {
        Ok(nb_answers) => Some(SurveyView::new(survey, nb_answers)),
        Err(e) => {
            warn!("Could not count answers to survey {}: {e}", survey.id);
            None
        }
    }
}

/// The current server time, truncated to the millisecond precision the
/// database stores.
fn now() -> DateTime<Utc> {
    mongodb::bson::DateTime::now().to_chrono()
}
