use std::{env, env::VarError};

/// There's no real CLI for the server, so just do quick 'n dirty
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        // We don't expect any CLI args, so always print the help
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 14] = [
        "RUST_LOG",
        "BLS_HOST",
        "BLS_PORT",
        "BLS_DATABASE_URL",
        "BLS_FREE_CANCEL_WINDOW_MINS",
        "BLS_COMPLETE_AFTER_MINS",
        "BLS_PAYOUT_INTERVAL_SECS",
        "BLS_MAINTENANCE_INTERVAL_SECS",
        "BLS_GATEWAY_TIMEOUT_SECS",
        "BLS_PAYOUTS_ENABLED",
        "BLS_PAYOUT_SERVICE",
        "BLS_CASHFREE_PAYOUT_URL",
        "BLS_CASHFREE_CLIENT_ID",
        "BLS_DISPATCH_URL",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
