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
    // LPS_JWT_SECRET is deliberately absent
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "LPS_HOST",
        "LPS_PORT",
        "LPS_DATABASE_URL",
        "LPS_DB_MAX_CONNECTIONS",
        "LPS_ACCRUAL_SYSTEM_ADDRESS",
        "LPS_ACCRUAL_TIMEOUT_SECS",
        "LPS_ACCRUAL_RETRY_DELAY_SECS",
        "LPS_ACCRUAL_MAX_ATTEMPTS",
        "LPS_ACCRUAL_DEFAULT_COOLDOWN_SECS",
        "LPS_WORKER_IDLE_INTERVAL_SECS",
        "LPS_WORKER_PASS_INTERVAL_MS",
        "LPS_JWT_TTL_SECS",
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
