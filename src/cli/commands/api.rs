use clap::{Arg, Command};

pub const ARG_API_URL: &str = "api-url";
pub const ARG_SESSION_FILE: &str = "session-file";
pub const ARG_TIMEOUT: &str = "timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_URL)
                .long("api-url")
                .help("Base URL of the Nota API, example: https://api.nota.study")
                .env("NOTA_API_URL")
                .global(true)
                .default_value(crate::api::DEFAULT_API_URL),
        )
        .arg(
            Arg::new(ARG_SESSION_FILE)
                .long("session-file")
                .help("File holding the persisted session (default: <config dir>/nota/session.json)")
                .env("NOTA_SESSION_FILE")
                .global(true)
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .long("timeout")
                .help("Request timeout in seconds")
                .env("NOTA_TIMEOUT")
                .global(true)
                .default_value("30")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
}
