use anyhow::Result;
use gifboard_client::VoteDelta;

use crate::args::{Cli, Command};
use crate::context::Ctx;

mod mutate;
mod shell;
mod show;

pub async fn dispatch(cli: Cli) -> Result<()> {
    let ctx = Ctx::new(&cli)?;
    match cli.command {
        Command::Show => show::run(&ctx).await,
        Command::Init => mutate::init(&ctx).await,
        Command::Submit { link } => mutate::submit(&ctx, &link).await,
        Command::Upvote { index } => mutate::vote(&ctx, index, VoteDelta::Up).await,
        Command::Downvote { index } => mutate::vote(&ctx, index, VoteDelta::Down).await,
        Command::Shell => shell::run(&ctx).await,
    }
}
