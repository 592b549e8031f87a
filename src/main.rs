use clap::{Arg, ArgAction, ArgMatches, Command}; // Builder API for command-line parsing
use std::path::{Path, PathBuf};
use std::process;

use passkeep::auth::user_interface::{
    ensure_scheme, list_users, login_user, prompt_password, recover_user, register_user,
    remove_user, resolve_scheme_choice, run_interactive, SessionSettings,
};
use passkeep::auth::{load_store, CredentialStore};
use passkeep::utils::logging::{initialize_logging, log_store_operation};
use passkeep::{registry, AppConfig, DEFAULT_CONFIG_FILE};

fn build_cli() -> Command {
    Command::new("passkeep")
        .about("A minimal credential registry with selectable password schemes")
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_name("FILE")
                .help("JSON file to keep users in between runs (in-memory when omitted)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_name("FILE")
                .help("Configuration file"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .global(true)
                .value_name("FILE")
                .help("Where to append log output"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .subcommand(Command::new("interactive").about("Run the register/login menu (default)"))
        .subcommand(Command::new("schemes").about("List available password schemes"))
        .subcommand(
            Command::new("register")
                .about("Register a user; the password is read from the terminal")
                .arg(Arg::new("username").help("Login name").required(true))
                .arg(
                    Arg::new("scheme")
                        .help("Scheme token (1-4) or name; falls back to the configured default"),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Check a password for a user")
                .arg(Arg::new("username").help("Login name").required(true)),
        )
        .subcommand(
            Command::new("recover")
                .about("Show the password of a user stored with a reversible scheme")
                .arg(Arg::new("username").help("Login name").required(true)),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete a user")
                .arg(Arg::new("username").help("Login name").required(true)),
        )
        .subcommand(Command::new("list").about("List registered users"))
}

fn main() {
    let matches = build_cli().get_matches();

    match run(&matches) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Merge config file and flags, then dispatch the subcommand
fn run(matches: &ArgMatches) -> Result<bool, Box<dyn std::error::Error>> {
    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_FILE);
    let mut config = AppConfig::load(Path::new(config_path))?;

    if let Some(log_file) = matches.get_one::<String>("log-file") {
        config.log_file = log_file.clone();
    }
    if let Some(store_file) = matches.get_one::<String>("store") {
        config.store_file = Some(store_file.clone());
    }
    if matches.get_flag("verbose") {
        config.log_level = "debug".to_string();
    }

    if let Err(e) = initialize_logging(&config.log_file, config.level_filter()) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let settings = SessionSettings {
        store_path: config.store_file.as_ref().map(PathBuf::from),
        default_scheme: config.default_scheme(),
    };

    let mut store = match &settings.store_path {
        Some(path) => {
            let display = path.display().to_string();
            match load_store(path) {
                Ok(store) => {
                    log_store_operation("load", &display, true, None);
                    store
                }
                Err(e) => {
                    log_store_operation("load", &display, false, Some(&e.to_string()));
                    return Err(e.into());
                }
            }
        }
        None => CredentialStore::new(),
    };

    let ok = match matches.subcommand() {
        Some(("schemes", _)) => {
            for scheme in registry().schemes() {
                println!("{}  {:<11} {}", scheme.token(), scheme.name(), scheme.label());
            }
            true
        }
        Some(("register", sub)) => {
            let username = username_arg(sub);
            let scheme = sub
                .get_one::<String>("scheme")
                .map(String::as_str)
                .unwrap_or_default();
            let scheme_id = resolve_scheme_choice(scheme, settings.default_scheme);
            if !ensure_scheme(&scheme_id) {
                return Ok(false);
            }
            let password = prompt_password("Enter password: ")?;
            register_user(&mut store, &settings, username, &password, &scheme_id)
        }
        Some(("login", sub)) => {
            let password = prompt_password("Enter password: ")?;
            login_user(&store, username_arg(sub), &password)
        }
        Some(("recover", sub)) => recover_user(&store, username_arg(sub)),
        Some(("remove", sub)) => remove_user(&mut store, &settings, username_arg(sub)),
        Some(("list", _)) => {
            list_users(&store);
            true
        }
        _ => {
            run_interactive(&mut store, &settings)?;
            true
        }
    };

    Ok(ok)
}

// `username` is required on every subcommand that has it
fn username_arg(matches: &ArgMatches) -> &str {
    matches
        .get_one::<String>("username")
        .map(String::as_str)
        .unwrap_or_default()
}
