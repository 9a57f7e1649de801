use clap::{Arg, Command};

pub const ARG_METHOD: &str = "method";
pub const ARG_PATH: &str = "path";
pub const ARG_DATA: &str = "data";

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("request")
            .about("Send an authenticated request to the API and print the response")
            .arg(
                Arg::new(ARG_METHOD)
                    .help("HTTP method")
                    .required(true)
                    .value_parser(["GET", "POST", "PUT", "PATCH", "DELETE"])
                    .ignore_case(true),
            )
            .arg(
                Arg::new(ARG_PATH)
                    .help("Path relative to the API URL, example: users/me")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_DATA)
                    .short('d')
                    .long("data")
                    .help("JSON request body"),
            ),
        Command::new("health").about("Check that the API is reachable"),
    ]
}
