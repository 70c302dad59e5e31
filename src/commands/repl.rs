use std::io::{self, BufRead, Write};

use crate::assistant::Dispatcher;
use crate::assistant::store::SessionStore;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::gmail::GmailMailbox;

use super::say;

/// Interactive loop over stdin. Dispatch failures are reported and the loop
/// continues; only I/O failures end it.
pub async fn run(ctx: &AppContext) -> AppResult<()> {
    let mut session = ctx.session_store.load(&ctx.profile)?;

    let mailbox = GmailMailbox::new(ctx);
    let dispatcher = Dispatcher::new(&mailbox, &ctx.summary_client, ctx.settings.inbox_limit());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("voxmail> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let utterance = line.trim();

        if utterance.is_empty() {
            continue;
        }
        if utterance == "quit" || utterance == "exit" {
            break;
        }

        match dispatcher.dispatch_text(utterance, &mut session).await {
            Ok(outcome) => {
                ctx.session_store.save(&ctx.profile, &session)?;
                ctx.output.emit(&say::render(&outcome), &outcome)?;
            }
            Err(err) => eprintln!("error: {err}"),
        }
    }

    Ok(())
}
