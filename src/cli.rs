use clap::Parser;

use ytsum::config::Overrides;

#[derive(Parser)]
#[command(
    name = "ytsum",
    about = "Summarize YouTube videos from a single web page",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// Address to listen on [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Gemini model used for summaries [default: gemini-1.5-flash]
    #[arg(short, long)]
    pub model: Option<String>,

    /// Preferred caption language [default: en]
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Seconds before an upstream request is abandoned [default: 60]
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Echo startup details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            model: self.model.clone(),
            lang: self.lang.clone(),
            timeout_secs: self.timeout,
        }
    }
}
