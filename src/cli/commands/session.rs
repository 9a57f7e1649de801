use clap::{Arg, Command};

pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_NAME: &str = "name";
pub const ARG_UNIVERSITY: &str = "university";
pub const ARG_PATH: &str = "path";

fn email() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long("email")
        .help("Account email")
        .env("NOTA_EMAIL")
        .required(true)
}

fn password() -> Arg {
    Arg::new(ARG_PASSWORD)
        .long("password")
        .help("Account password, read from the first line of stdin when omitted")
        .env("NOTA_PASSWORD")
        .hide_env_values(true)
}

#[must_use]
pub fn subcommands() -> Vec<Command> {
    vec![
        Command::new("signup")
            .about("Create an account and store the returned session")
            .arg(email())
            .arg(password())
            .arg(
                Arg::new(ARG_NAME)
                    .short('n')
                    .long("name")
                    .help("Display name")
                    .required(true),
            )
            .arg(
                Arg::new(ARG_UNIVERSITY)
                    .long("university")
                    .help("University, optional"),
            ),
        Command::new("login")
            .about("Log in and store the returned session")
            .arg(email())
            .arg(password()),
        Command::new("logout").about("Forget the stored session"),
        Command::new("whoami").about("Show the stored session"),
        Command::new("open")
            .about("Resolve a protected location: render it or redirect to login")
            .arg(
                Arg::new(ARG_PATH)
                    .help("Location to open, example: /notes/7")
                    .required(true),
            ),
    ]
}
