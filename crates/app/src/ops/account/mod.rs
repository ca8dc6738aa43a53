use clap::Args;

pub mod create;
pub mod list;
pub mod recover;
pub mod show;

use crate::op::Op;

crate::command_enum! {
    (Create, create::Create),
    (Recover, recover::Recover),
    (Show, show::Show),
    (List, list::List),
}

pub type AccountCommand = Command;

#[derive(Args, Debug, Clone)]
pub struct Account {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[async_trait::async_trait]
impl Op for Account {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
