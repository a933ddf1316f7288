use std::sync::Arc;

use anyhow::Result;
use gifboard_client::{BoardSnapshot, MutationOutcome, VoteDelta};
use serde::Serialize;

use crate::context::Ctx;
use crate::output;

#[derive(Debug, Serialize)]
pub struct MutationOut {
    pub ok: bool,
    pub operation: &'static str,
    pub signature: String,
    pub snapshot: Arc<BoardSnapshot>,
}

pub async fn init(ctx: &Ctx) -> Result<()> {
    ctx.ensure_connected().await?;
    let pb = ctx.spinner("creating board account");
    let result = ctx.controller.initialize_board().await;
    pb.finish_and_clear();
    report(ctx, "initialize", result?)
}

pub async fn submit(ctx: &Ctx, link: &str) -> Result<()> {
    ctx.ensure_connected().await?;
    let pb = ctx.spinner("submitting entry");
    let result = ctx.controller.submit_entry(link).await;
    pb.finish_and_clear();
    report(ctx, "submit", result?)
}

pub async fn vote(ctx: &Ctx, index: usize, delta: VoteDelta) -> Result<()> {
    ctx.ensure_connected().await?;
    let pb = ctx.spinner("sending vote");
    let result = ctx.controller.vote(index, delta).await;
    pb.finish_and_clear();
    report(ctx, delta.as_str(), result?)
}

fn report(ctx: &Ctx, operation: &'static str, outcome: MutationOutcome) -> Result<()> {
    if output::is_json() {
        return output::print(&MutationOut {
            ok: true,
            operation,
            signature: outcome.signature.to_string(),
            snapshot: outcome.snapshot,
        });
    }
    output::eprintln_line(&format!("{operation} confirmed: {}", outcome.signature));
    output::print_board(ctx.controller.state(), &outcome.snapshot)
}
