use std::io::{self, BufRead, Write};

use gifboard_client::{ApprovalRequest, Approver};

/// Asks on the terminal, the way a wallet extension would pop up.
pub struct StdinApprover;

impl Approver for StdinApprover {
    fn approve(&self, request: ApprovalRequest<'_>) -> bool {
        let question = match request {
            ApprovalRequest::Connect { address } => format!("Connect wallet {address}?"),
            ApprovalRequest::Sign { label, payer } => format!("Sign \"{label}\" with {payer}?"),
        };
        tokio::task::block_in_place(|| ask(&question))
    }
}

fn ask(question: &str) -> bool {
    let mut stderr = io::stderr();
    if write!(stderr, "{question} [y/N] ").and_then(|_| stderr.flush()).is_err() {
        return false;
    }
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_yes(&line),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
