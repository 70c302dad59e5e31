use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "voxmail", version, about = "Voice-driven Gmail assistant")]
pub struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "default",
        help = "Profile name to use"
    )]
    pub profile: String,
    #[arg(long, global = true, help = "Emit JSON output")]
    pub json: bool,
    #[arg(short = 'v', long, global = true, action = ArgAction::Count, help = "Verbose logging")]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage Google OAuth credentials
    Auth(AuthArgs),
    /// Run one spoken command, e.g. `voxmail say read my inbox`
    Say(SayArgs),
    /// Interactive loop: type commands, `quit` to leave
    Repl,
}

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    Login,
    Status,
    Logout,
}

#[derive(Debug, Args)]
pub struct SayArgs {
    #[arg(required = true, num_args = 1.., help = "The utterance, as transcribed text")]
    pub utterance: Vec<String>,
}

impl SayArgs {
    pub fn text(&self) -> String {
        self.utterance.join(" ")
    }
}
