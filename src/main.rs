use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = voxmail::cli::Cli::parse();

    if let Err(err) = voxmail::run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
