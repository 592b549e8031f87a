// src/modules/auth/user_interface.rs
use std::io;
use std::path::PathBuf;

use super::password::{is_blank, read_password};
use super::store::{
    save_store, CredentialStore, LoginOutcome, RegisterError, StoreError, ValidateError,
};
use crate::modules::encryption::{registry, Scheme};
use crate::modules::utils::io::prompt;
use crate::modules::utils::logging::{log_auth_event, log_internal_fault, log_store_operation};
use crate::modules::utils::time::format_timestamp;

/// Options of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Register,
    Login,
    Exit,
}

impl MenuChoice {
    /// Accepts the menu number or the command word
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "register" => Some(MenuChoice::Register),
            "2" | "login" => Some(MenuChoice::Login),
            "3" | "exit" | "quit" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

/// Settings the front end carries between operations
#[derive(Debug, Clone, Default)]
pub struct SessionSettings {
    pub store_path: Option<PathBuf>, // Persist after every registration when set
    pub default_scheme: Option<Scheme>,
}

/// Show the main menu
pub fn show_initial_options() {
    println!("\n=== PassKeep ===");
    println!("1. Register   (or type 'register')");
    println!("2. Login      (or type 'login')");
    println!("3. Exit       (or type 'exit')");
}

/// Show the registered schemes with their menu tokens
pub fn show_scheme_menu(default: Option<Scheme>) {
    println!("Choose an encryption method:");
    for scheme in registry().schemes() {
        let marker = if Some(scheme) == default { " (default)" } else { "" };
        println!("{}. {}{}", scheme.token(), scheme.label(), marker);
    }
}

/// Main interactive loop; returns when the user exits or stdin closes
pub fn run_interactive(store: &mut CredentialStore, settings: &SessionSettings) -> io::Result<()> {
    loop {
        show_initial_options();

        let choice = match prompt("Choose an option: ") {
            Ok(choice) => choice,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(e) => return Err(e),
        };

        match MenuChoice::parse(&choice) {
            Some(MenuChoice::Register) => {
                if let Err(e) = handle_interactive_registration(store, settings) {
                    println!("Error reading input: {}", e);
                }
            }
            Some(MenuChoice::Login) => {
                if let Err(e) = handle_interactive_login(store) {
                    println!("Error reading input: {}", e);
                }
            }
            Some(MenuChoice::Exit) => {
                println!("Goodbye!");
                return Ok(());
            }
            None => println!("Invalid choice. Please try again."),
        }
    }
}

/// Prompt for a new user's details and register them
pub fn handle_interactive_registration(
    store: &mut CredentialStore,
    settings: &SessionSettings,
) -> io::Result<bool> {
    let username = prompt("Enter login: ")?;
    let password = prompt_password("Enter password: ")?;

    // Checked before the scheme menu so the user is not asked for nothing
    if is_blank(&username) || is_blank(&password) {
        println!("{}", registration_message(&Err(RegisterError::BlankField)));
        return Ok(false);
    }

    show_scheme_menu(settings.default_scheme);
    let choice = prompt("Your choice: ")?;
    let scheme_id = resolve_scheme_choice(&choice, settings.default_scheme);

    Ok(register_user(store, settings, &username, &password, &scheme_id))
}

/// Prompt for credentials and report the login outcome
pub fn handle_interactive_login(store: &CredentialStore) -> io::Result<bool> {
    let username = prompt("Enter login: ")?;
    let password = prompt_password("Enter password: ")?;

    Ok(login_user(store, &username, &password))
}

/// Register through the store, then log, persist and report the outcome
pub fn register_user(
    store: &mut CredentialStore,
    settings: &SessionSettings,
    username: &str,
    password: &str,
    scheme_id: &str,
) -> bool {
    let result = store.register(username, password, scheme_id);

    match &result {
        Ok(()) => {
            let details = store
                .get(username)
                .map(|c| format!("scheme={}", c.scheme));
            log_auth_event("register", username, true, details.as_deref());
        }
        Err(e) if e.is_internal() => log_internal_fault("register", username, e),
        Err(e) => log_auth_event("register", username, false, Some(&e.to_string())),
    }

    if result.is_err() {
        println!("{}", registration_message(&result));
        return false;
    }

    match persist(store, settings) {
        Ok(()) => {
            println!("{}", registration_message(&result));
            true
        }
        Err(e) => {
            println!("User registered for this session only, saving failed: {}", e);
            false
        }
    }
}

/// Reject an unknown scheme token before the user is asked for a password
pub fn ensure_scheme(scheme_id: &str) -> bool {
    if registry().resolve(scheme_id).is_some() {
        return true;
    }
    let error = RegisterError::UnknownScheme(scheme_id.to_string());
    log_auth_event("register", "", false, Some(&error.to_string()));
    println!("{}", registration_message(&Err(error)));
    false
}

/// Validate through the store, then log and report the outcome
pub fn login_user(store: &CredentialStore, username: &str, password: &str) -> bool {
    let result = store.login(username, password);

    match &result {
        Ok(LoginOutcome::Matched) => log_auth_event("login", username, true, None),
        Ok(LoginOutcome::Mismatched) => {
            log_auth_event("login", username, false, Some("wrong password"))
        }
        Err(e) if e.is_internal() => log_internal_fault("login", username, e),
        Err(e) => log_auth_event("login", username, false, Some(&e.to_string())),
    }

    println!("{}", login_message(&result));
    matches!(result, Ok(LoginOutcome::Matched))
}

/// Remove a user and persist the change
pub fn remove_user(store: &mut CredentialStore, settings: &SessionSettings, username: &str) -> bool {
    if store.remove(username) {
        log_auth_event("remove", username, true, None);
        match persist(store, settings) {
            Ok(()) => {
                println!("User {} removed.", username);
                true
            }
            Err(e) => {
                println!("User {} removed for this session only, saving failed: {}", username, e);
                false
            }
        }
    } else {
        log_auth_event("remove", username, false, Some("not found"));
        println!("{}", login_message(&Err(ValidateError::NotFound)));
        false
    }
}

/// Print the plaintext for users stored with a reversible scheme
pub fn recover_user(store: &CredentialStore, username: &str) -> bool {
    match store.recover_password(username) {
        Ok(plaintext) => {
            log_auth_event("recover", username, true, None);
            println!("{}", plaintext);
            true
        }
        Err(e) => {
            log_auth_event("recover", username, false, Some(&e.to_string()));
            println!("Cannot recover password: {}", e);
            false
        }
    }
}

/// Print every registered user with its scheme and registration time
pub fn list_users(store: &CredentialStore) {
    if store.is_empty() {
        println!("No users registered.");
        return;
    }
    for username in store.usernames() {
        if let Some(credential) = store.get(&username) {
            println!(
                "{:<20} {:<26} {}",
                username,
                credential.scheme.label(),
                format_timestamp(credential.registered_at)
            );
        }
    }
}

/// Empty input picks the default scheme when one is configured
pub fn resolve_scheme_choice(input: &str, default: Option<Scheme>) -> String {
    match default {
        Some(scheme) if input.trim().is_empty() => scheme.token().to_string(),
        _ => input.trim().to_string(),
    }
}

pub fn registration_message(result: &Result<(), RegisterError>) -> String {
    match result {
        Ok(()) => "User registered successfully!".to_string(),
        Err(RegisterError::BlankField) => "Username and password cannot be empty.".to_string(),
        Err(RegisterError::UnknownScheme(token)) => format!(
            "Unknown encryption method '{}'. Registration failed.",
            token
        ),
        Err(RegisterError::TransformFailed(e)) => {
            format!("Registration failed due to an internal error: {}", e)
        }
    }
}

pub fn login_message(result: &Result<LoginOutcome, ValidateError>) -> String {
    match result {
        Ok(LoginOutcome::Matched) => "Login successful!".to_string(),
        Ok(LoginOutcome::Mismatched) => "Wrong password.".to_string(),
        Err(ValidateError::NotFound) => "User not found.".to_string(),
        Err(ValidateError::TransformFailed(e)) => {
            format!("Login failed due to an internal error: {}", e)
        }
    }
}

/// Save after a mutation; without a store file there is nothing to do
fn persist(store: &CredentialStore, settings: &SessionSettings) -> Result<(), StoreError> {
    let Some(path) = &settings.store_path else {
        return Ok(());
    };
    let display = path.display().to_string();

    match save_store(store, path) {
        Ok(()) => {
            log_store_operation("save", &display, true, None);
            Ok(())
        }
        Err(e) => {
            log_store_operation("save", &display, false, Some(&e.to_string()));
            Err(e)
        }
    }
}

pub fn prompt_password(message: &str) -> io::Result<String> {
    print!("{}", message);
    io::Write::flush(&mut io::stdout())?;
    read_password()
}
