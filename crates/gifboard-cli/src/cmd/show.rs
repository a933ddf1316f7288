use std::sync::Arc;

use anyhow::Result;
use gifboard_client::{BoardSnapshot, ControllerState};
use serde::Serialize;

use crate::context::Ctx;
use crate::output;

#[derive(Debug, Serialize)]
pub struct ShowOut {
    pub ok: bool,
    pub signer: Option<String>,
    pub board: String,
    pub state: ControllerState,
    pub snapshot: Arc<BoardSnapshot>,
}

pub async fn run(ctx: &Ctx) -> Result<()> {
    ctx.ensure_connected().await?;
    render(ctx)
}

/// Print the controller's current view of the board.
pub fn render(ctx: &Ctx) -> Result<()> {
    render_snapshot(ctx, ctx.controller.snapshot())
}

pub fn render_snapshot(ctx: &Ctx, snapshot: Arc<BoardSnapshot>) -> Result<()> {
    let controller = &ctx.controller;
    let state = controller.state();

    if output::is_json() {
        return output::print(&ShowOut {
            ok: true,
            signer: controller.signer().map(|s| s.to_string()),
            board: controller.board_address().to_string(),
            state,
            snapshot,
        });
    }

    if let Some(signer) = controller.signer() {
        output::eprintln_line(&format!("wallet {signer}, board {}", controller.board_address()));
    }
    output::print_board(state, &snapshot)
}
