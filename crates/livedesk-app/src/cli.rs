use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use livedesk_config::schema::Isolation;

/// livedesk: live editor, console and sandbox panes driven from a deck file.
#[derive(Parser, Debug)]
#[command(name = "livedesk", version, about)]
pub struct Args {
    /// Deck file declaring the windows.
    pub deck: PathBuf,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Where console runtimes evaluate.
    #[arg(long, value_enum)]
    pub isolation: Option<IsolationArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IsolationArg {
    Worker,
    Inline,
}

impl From<IsolationArg> for Isolation {
    fn from(arg: IsolationArg) -> Self {
        match arg {
            IsolationArg::Worker => Isolation::Worker,
            IsolationArg::Inline => Isolation::Inline,
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deck_is_required() {
        assert!(Args::try_parse_from(["livedesk"]).is_err());
    }

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from([
            "livedesk",
            "slides/intro.toml",
            "--isolation",
            "inline",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.deck, PathBuf::from("slides/intro.toml"));
        assert_eq!(args.isolation, Some(IsolationArg::Inline));
        assert_eq!(Isolation::from(IsolationArg::Inline), Isolation::Inline);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.config.is_none());
    }
}
