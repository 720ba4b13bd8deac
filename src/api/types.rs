//! Field resolution for the GraphQL output types.
//!
//! The stored records are resolved directly; derived fields are computed
//! here at read time.

use async_graphql::{Context, Object, Result, ID};

use crate::model::{
    api::Date,
    db::{Answer, Survey},
    store::{Db, SurveyStore},
};

#[Object]
impl Survey {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn name(&self) -> &str {
        &self.name
    }

    async fn answers(&self) -> Vec<String> {
        self.answers.clone()
    }

    /// Counted afresh on every read; one query per survey in a list.
    async fn nb_answers(&self, ctx: &Context<'_>) -> Result<u64> {
        let store = ctx.data::<Db>()?;
        Ok(store.count_answers(&self.id.to_string()).await?)
    }

    async fn created_at(&self) -> Date {
        self.created_at.into()
    }

    async fn by(&self) -> &str {
        self.attribution()
    }
}

#[Object]
impl Answer {
    async fn id(&self) -> ID {
        ID(self.id.to_string())
    }

    async fn survey(&self) -> ID {
        ID(self.survey.clone())
    }

    async fn answers(&self) -> Vec<i32> {
        self.answers.clone()
    }

    async fn by(&self) -> Option<&str> {
        self.by.as_deref()
    }

    async fn created_at(&self) -> Date {
        self.created_at.into()
    }
}
