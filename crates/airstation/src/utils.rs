use std::io::IsTerminal;

use airstation_core::{Credentials, DhcpReservation};

/// Environment variable holding the console password.
pub const PASSWORD_ENV: &str = "AIRSTATION_PASSWORD";

/// Read password securely based on the provided options.
///
/// # Priority
///
/// 1. If `password_stdin` is true, read from stdin
/// 2. Otherwise, prompt interactively (if terminal is available)
pub fn read_password(password_stdin: bool, prompt: &str) -> Result<String, String> {
    if password_stdin {
        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .map_err(|e| format!("Failed to read password from stdin: {}", e))?;
        return Ok(input.trim_end_matches(['\r', '\n']).to_string());
    }

    if std::io::stdin().is_terminal() {
        eprint!("{}: ", prompt);
        rpassword::read_password().map_err(|e| format!("Failed to read password: {}", e))
    } else {
        Err(format!(
            "No password provided. Set {} or use --password-stdin when piping input.",
            PASSWORD_ENV
        ))
    }
}

/// Get credentials from CLI options and environment.
///
/// Password is read from AIRSTATION_PASSWORD env var, stdin (if
/// --password-stdin), or interactively prompted.
pub fn get_credentials(username: String, password_stdin: bool) -> Result<Credentials, String> {
    if let Ok(pass) = std::env::var(PASSWORD_ENV) {
        return Ok(Credentials::new(username, pass));
    }

    let prompt = format!("Password for {}", username);
    let pass = read_password(password_stdin, &prompt)?;
    Ok(Credentials::new(username, pass))
}

/// Print a JSON value on one line.
pub fn print_json(value: &serde_json::Value) {
    println!("{}", value);
}

/// Applies the `dhcp edit` overrides to the row named `row_id`.
pub fn edited_row(
    rows: Vec<DhcpReservation>,
    row_id: &str,
    ip: Option<String>,
    mac: Option<String>,
) -> Result<DhcpReservation, String> {
    let mut row = rows
        .into_iter()
        .find(|r| r.row_id == row_id)
        .ok_or_else(|| format!("No reservation with row id '{}'", row_id))?;
    if let Some(ip) = ip {
        row.ip = ip;
    }
    if let Some(mac) = mac {
        row.mac = mac;
    }
    Ok(row)
}
