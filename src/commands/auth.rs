use crate::auth::AuthService;
use crate::cli::AuthCommand;
use crate::context::AppContext;
use crate::error::AppResult;

pub async fn run(ctx: &AppContext, command: AuthCommand) -> AppResult<()> {
    match command {
        AuthCommand::Login => {
            let result =
                AuthService::login(&ctx.profile, &ctx.settings, &ctx.token_store).await?;

            let text = if let Some(email) = result.email.as_ref() {
                format!("{}: logged in as {}", result.profile, email)
            } else {
                format!("{}: {}", result.profile, result.note)
            };
            ctx.output.emit(&text, &result)
        }
        AuthCommand::Status => {
            let status = AuthService::status(&ctx.profile, &ctx.token_store).await?;
            let text = if status.logged_in {
                let email = status.email.as_deref().unwrap_or("(unknown account)");
                let expiry = match status.expires_in_seconds {
                    Some(seconds) if seconds > 0 => format!("token expires in {seconds}s"),
                    Some(_) => "token expired".to_string(),
                    None => "token has no expiry".to_string(),
                };
                format!("{}: logged in as {email}, {expiry}", status.profile)
            } else {
                format!("{}: not logged in", status.profile)
            };
            ctx.output.emit(&text, &status)
        }
        AuthCommand::Logout => {
            let status = AuthService::logout(&ctx.profile, &ctx.token_store).await?;
            let note = status.note.as_deref().unwrap_or("logged out");
            let text = format!("{}: {note}", status.profile);
            ctx.output.emit(&text, &status)
        }
    }
}
