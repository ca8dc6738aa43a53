use clap::Args;

use common::account::AccountStore;

use crate::state::StateError;

#[derive(Args, Debug, Clone)]
pub struct List;

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("account store error: {0}")]
    Store(#[from] anyhow::Error),
}

#[async_trait::async_trait]
impl crate::op::Op for List {
    type Error = ListError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = ctx.state()?;
        let numbers = ctx.accounts(&state).list().await?;

        if numbers.is_empty() {
            Ok("No accounts found".to_string())
        } else {
            Ok(numbers
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}
