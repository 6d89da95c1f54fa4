mod cli;
mod shell;
mod stdio;

use std::process::ExitCode;

use livedesk_common::{ConfigError, LivedeskError, WindowId, WindowKind};
use livedesk_config::schema::LivedeskConfig;
use livedesk_desktop::{Desktop, InputEvent};
use livedesk_platform::Binding;
use livedesk_runtime::LanguageRegistry;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::shell::ShellCommand;
use crate::stdio::StdioPlatform;

fn load_config(args: &cli::Args) -> (LivedeskConfig, Option<ConfigError>) {
    let loaded = match &args.config {
        Some(path) => livedesk_config::toml_loader::load_from_path(path).and_then(|config| {
            livedesk_config::validation::validate(&config)?;
            Ok(config)
        }),
        None => livedesk_config::load_config(),
    };
    let (mut config, error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (LivedeskConfig::default(), Some(e)),
    };
    if let Some(isolation) = args.isolation {
        config.runtime.isolation = isolation.into();
    }
    (config, error)
}

/// The console a typed line goes to: the focused one, else the first.
fn active_console(desktop: &Desktop) -> Option<WindowId> {
    let is_console = |id: &WindowId| desktop.kind(id) == Some(WindowKind::Console);
    desktop
        .focused()
        .filter(|id| is_console(id))
        .cloned()
        .or_else(|| desktop.window_ids().into_iter().find(|id| is_console(id)))
}

/// Handle one stdin line. Returns false to quit.
fn handle_line(
    desktop: &mut Desktop,
    platform: &StdioPlatform,
    line: &str,
) -> Result<bool, LivedeskError> {
    match ShellCommand::parse(line) {
        ShellCommand::Quit => return Ok(false),
        ShellCommand::Load => match active_console(desktop) {
            Some(console) => desktop.input(&console, InputEvent::LoadBuffer)?,
            None => eprintln!("no console in this deck"),
        },
        ShellCommand::Send(id) => {
            desktop.input(&id, InputEvent::Binding(Binding::SendToRepl))?
        }
        ShellCommand::Focus(id) => desktop.focus(&id)?,
        ShellCommand::Show(id) => match platform.show(&id) {
            Some(text) => println!("{text}"),
            None => eprintln!("nothing to show for `{id}`"),
        },
        ShellCommand::Line(text) => match active_console(desktop) {
            Some(console) => desktop.input(&console, InputEvent::Command(text))?,
            None => eprintln!("no console in this deck"),
        },
        ShellCommand::Invalid(input) => eprintln!("unknown command `{input}`\n{}", shell::HELP),
    }
    Ok(true)
}

async fn run(args: cli::Args, config: LivedeskConfig) -> Result<(), LivedeskError> {
    let deck = livedesk_config::load_deck(&args.deck)?;
    let platform = StdioPlatform::new();
    let languages = LanguageRegistry::with_builtins();
    let mut desktop = Desktop::construct(&deck, &languages, config, Box::new(platform.clone()))?;

    desktop.activate()?;
    desktop.stabilise()?;
    if let Some(console) = active_console(&desktop) {
        desktop.focus(&console)?;
    }
    tracing::info!("Desktop ready ({} windows)", desktop.window_ids().len());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match handle_line(&mut desktop, &platform, line.trim_end()) {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => eprintln!("{e}"),
                },
                None => break,
            },
            () = desktop.next_turn() => {}
        }
        // Wiring problems were logged as they happened.
        desktop.take_diagnostics();
    }

    desktop.cleanup()?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Config first: it carries the default log level.
    let (config, config_error) = load_config(&args);

    let log_directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| format!("livedesk={}", config.logging.level.as_directive()));
    let directive: Result<Directive, _> = log_directive
        .parse()
        .or_else(|_| "livedesk=info".parse());
    let filter = match directive {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    tracing::info!("livedesk v{} starting...", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    if let Some(e) = config_error {
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    match run(args, config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("livedesk: {e}");
            ExitCode::FAILURE
        }
    }
}
