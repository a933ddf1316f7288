use std::io::{self, BufRead, Write};

use anyhow::{anyhow, Result};
use gifboard_client::{Intent, VoteDelta};

use crate::context::Ctx;
use crate::output;

use super::show;

const HELP: &str = "\
commands:
  connect            connect the wallet (prompts)
  show | refresh     re-read the board
  init               create the board account
  submit <link>      append a link
  up <index>         upvote an entry
  down <index>       downvote an entry
  disconnect         forget the wallet
  help
  quit | exit";

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Intent(Intent),
    Disconnect,
    Help,
    Quit,
    Empty,
}

pub async fn run(ctx: &Ctx) -> Result<()> {
    let restored = ctx.controller.spawn_restore().await?;
    match restored {
        Some(signer) => output::eprintln_line(&format!("wallet {signer} restored")),
        None => output::eprintln_line("wallet not connected; type `connect`"),
    }
    let mut board = ctx.controller.subscribe();
    if restored.is_some() {
        show::render_snapshot(ctx, board.borrow_and_update().clone())?;
    }

    while let Some(raw) = read_line()? {
        let line = match parse(&raw) {
            Ok(line) => line,
            Err(e) => {
                output::eprintln_line(&format!("{e}"));
                continue;
            }
        };

        match line {
            Line::Empty => {}
            Line::Help => output::eprintln_line(HELP),
            Line::Quit => break,
            Line::Disconnect => {
                ctx.controller.disconnect().await;
                board.mark_unchanged();
                output::eprintln_line("disconnected");
            }
            Line::Intent(intent) => {
                let pb = ctx.spinner("working");
                let result = ctx.controller.dispatch(intent).await;
                pb.finish_and_clear();
                if let Err(e) = result {
                    output::report_error(&anyhow::Error::from(e));
                }
                // Failed mutations leave the snapshot alone; only redraw on replacement.
                if board.has_changed()? {
                    show::render_snapshot(ctx, board.borrow_and_update().clone())?;
                }
            }
        }
    }
    Ok(())
}

fn read_line() -> Result<Option<String>> {
    tokio::task::block_in_place(|| {
        let mut stderr = io::stderr();
        write!(stderr, "gifboard> ")?;
        stderr.flush()?;

        let mut buf = String::new();
        if io::stdin().lock().read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(buf))
    })
}

fn parse(raw: &str) -> Result<Line> {
    let raw = raw.trim();
    let (word, rest) = match raw.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (raw, ""),
    };

    let line = match word {
        "" => Line::Empty,
        "help" | "?" => Line::Help,
        "quit" | "exit" => Line::Quit,
        "disconnect" => Line::Disconnect,
        "connect" => Line::Intent(Intent::Connect),
        "show" | "refresh" => Line::Intent(Intent::Refresh),
        "init" => Line::Intent(Intent::Initialize),
        "submit" => Line::Intent(Intent::Submit { link: rest.to_string() }),
        "up" | "upvote" => vote(rest, VoteDelta::Up)?,
        "down" | "downvote" => vote(rest, VoteDelta::Down)?,
        other => return Err(anyhow!("unknown command `{other}`; type `help`")),
    };
    Ok(line)
}

fn vote(arg: &str, delta: VoteDelta) -> Result<Line> {
    let index = arg.parse().map_err(|_| anyhow!("expected an entry index, got `{arg}`"))?;
    Ok(Line::Intent(Intent::Vote { index, delta }))
}
