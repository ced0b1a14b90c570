use clap::{Arg, ArgMatches, Command};

pub const ARG_PASSWORD_MEMORY_KIB: &str = "password-memory-kib";
pub const ARG_PASSWORD_ITERATIONS: &str = "password-iterations";
pub const ARG_PASSWORD_PARALLELISM: &str = "password-parallelism";

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Options {
    /// Parse password hashing arguments from matches.
    ///
    /// # Errors
    /// Returns an error if a cost argument is missing.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let get = |id: &str| {
            matches
                .get_one::<u32>(id)
                .copied()
                .ok_or_else(|| anyhow::anyhow!("missing required argument: --{id}"))
        };

        Ok(Self {
            memory_kib: get(ARG_PASSWORD_MEMORY_KIB)?,
            iterations: get(ARG_PASSWORD_ITERATIONS)?,
            parallelism: get(ARG_PASSWORD_PARALLELISM)?,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PASSWORD_MEMORY_KIB)
                .long(ARG_PASSWORD_MEMORY_KIB)
                .help("Argon2id memory cost in KiB")
                .env("BOUQUET_PASSWORD_MEMORY_KIB")
                .default_value("19456")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_ITERATIONS)
                .long(ARG_PASSWORD_ITERATIONS)
                .help("Argon2id iterations (time cost)")
                .env("BOUQUET_PASSWORD_ITERATIONS")
                .default_value("2")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_PARALLELISM)
                .long(ARG_PASSWORD_PARALLELISM)
                .help("Argon2id lanes")
                .env("BOUQUET_PASSWORD_PARALLELISM")
                .default_value("1")
                .value_parser(clap::value_parser!(u32)),
        )
}
