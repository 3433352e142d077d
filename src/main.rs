//! Entry point for **wmpick**.
//!
//! ```text
//! wmpick [--provider NAME] [--config PATH] [ACTION]
//! ```
//!
//! Discovers the available menu providers, lets the user choose an action
//! (unless one is named on the command line), and sends the resulting
//! command to i3 / sway.

use log::{error, info, warn};
use std::path::PathBuf;
use wmpick::command::{Action, ActionError};
use wmpick::config::Config;
use wmpick::context::Context;
use wmpick::i3::wm::I3Wm;
use wmpick::menu::MenuError;
use wmpick::provider::registry::ProviderRegistry;
use wmpick::traits::WindowManager;
use wmpick::vocab;

/// Command-line arguments.
#[derive(Debug, Default, PartialEq)]
struct Args {
    provider: Option<String>,
    config: Option<PathBuf>,
    action: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--provider" | "-p" => {
                parsed.provider = Some(args.next().ok_or("--provider needs a value")?);
            }
            "--config" | "-c" => {
                parsed.config = Some(args.next().ok_or("--config needs a value")?.into());
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
            _ if parsed.action.is_some() => return Err(format!("unexpected argument {}", arg)),
            _ => parsed.action = Some(arg),
        }
    }
    Ok(parsed)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/wmpick`).
fn config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base).join("wmpick")
}

/// Load the config from `path` (or `$XDG_CONFIG_HOME/wmpick/config.json`),
/// falling back to compiled-in defaults.
fn load_config(path: Option<PathBuf>) -> Config {
    let explicit = path.is_some();
    let path = path.unwrap_or_else(|| config_dir().join("config.json"));
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) if explicit => {
            warn!("{}, using defaults", e);
            Config::default()
        }
        Err(e) => {
            info!("no config file ({}), using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            error!("{}", e);
            eprintln!("usage: wmpick [--provider NAME] [--config PATH] [ACTION]");
            std::process::exit(2);
        }
    };
    std::process::exit(run(args));
}

fn run(args: Args) -> i32 {
    let action = match args.action.as_deref() {
        Some(name) => match Action::from_name(name) {
            Some(action) => Some(action),
            None => {
                let known: Vec<&str> = Action::ALL.iter().map(|a| a.name()).collect();
                error!("unknown action {} (known: {})", name, known.join(", "));
                return 2;
            }
        },
        None => None,
    };

    let config = load_config(args.config);
    let registry = ProviderRegistry::discover(&config.menu);

    let ctx = match args.provider.or(config.menu.provider) {
        Some(name) => Context::with_provider(&registry, &name),
        None => Context::new(&registry),
    };
    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let wm = match I3Wm::new() {
        Ok(wm) => wm,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    match launch(&ctx, &wm, action) {
        Ok(()) => 0,
        Err(ActionError::Menu(MenuError::NoInput)) => {
            info!("cancelled");
            0
        }
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

/// Pick an action, build its command and send it.
fn launch<W: WindowManager>(
    ctx: &Context<'_>,
    wm: &W,
    action: Option<Action>,
) -> Result<(), ActionError> {
    let action = match action {
        Some(action) => action,
        None => {
            let menu = vocab::actions_menu();
            match ctx.selectinput(&menu, None, None)? {
                Some(action) => *action,
                None => return Ok(()),
            }
        }
    };

    let Some(cmd) = action.command(ctx, wm)? else {
        info!("{}: nothing to do", action);
        return Ok(());
    };
    info!("sending {:?}", cmd);
    let outcomes = wm
        .command(&cmd)
        .map_err(|e| ActionError::WindowManager(e.to_string()))?;
    for outcome in outcomes {
        if !outcome.success {
            return Err(ActionError::WindowManager(
                outcome.error.unwrap_or_else(|| "command failed".into()),
            ));
        }
    }
    Ok(())
}
