use super::Parser;

#[derive(Parser, Debug)]
#[command(about = "credential lifecycle subsystem demo")]
pub struct Cli {
    /// Path to a settings file, overriding the profile default.
    #[arg(long)]
    pub settings: Option<String>,

    /// Log filter override, e.g. "debug" or "tessera=trace".
    #[arg(long)]
    pub log_filter: Option<String>,
}
