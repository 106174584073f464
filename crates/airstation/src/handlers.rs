use airstation_core::{
    ClientConfig, JsonParam, blocking::AirStation, response::classify,
};
use tracing::debug;

use crate::cli::{Cli, Command, DhcpCommand};
use crate::utils::{edited_row, get_credentials, print_json};

/// Handle the params command.
pub fn handle_params() {
    let names: Vec<&str> = JsonParam::ALL.iter().map(JsonParam::as_str).collect();
    print_json(&serde_json::json!(names));
}

/// Log in and run one device command.
pub fn handle_device(cli: Cli) -> Result<(), String> {
    let credentials = get_credentials(cli.username, cli.password_stdin)?;
    let config = ClientConfig::new(cli.url)
        .with_timeout(cli.timeout)
        .with_encoding(cli.encoding);

    let station = AirStation::new(config, credentials).map_err(|e| e.to_string())?;
    station
        .login()
        .map_err(|e| format!("Could not log in to {}: {}", station.base_url(), e))?;
    debug!(url = %station.base_url(), "logged in");

    let result = run(&station, &cli.command);
    station.close();
    result
}

fn run(station: &AirStation, command: &Command) -> Result<(), String> {
    if let Some(device_command) = command.device_command() {
        debug!(fields = device_command.len(), "submitting command");
        station.set(&device_command).map_err(|e| e.to_string())?;
        print_json(&serde_json::json!({ "result": "OK" }));
        return Ok(());
    }

    match command {
        Command::Status => {
            print_json(&serde_json::json!({
                "url": station.base_url(),
                "state": station.state().to_string(),
            }));
        }
        Command::Get { param } => {
            let name = param
                .parse::<JsonParam>()
                .map(|p| p.as_str().to_string())
                .unwrap_or_else(|_| param.clone());
            let value = station.get_json_param(&name).map_err(|e| e.to_string())?;
            print_json(&value);
        }
        Command::Page { name } => {
            let page = station.get_form_page(name).map_err(|e| e.to_string())?;
            let kind = classify(&page).map_err(|e| e.to_string())?;
            debug!(page = %name, %kind, "fetched form page");
            println!("{}", page);
        }
        Command::Dhcp { command } => match command {
            DhcpCommand::List => {
                let rows = station.get_dhcp_table().map_err(|e| e.to_string())?;
                print_json(&serde_json::to_value(&rows).map_err(|e| e.to_string())?);
            }
            DhcpCommand::Edit { row_id, ip, mac } => {
                let rows = station.get_dhcp_table().map_err(|e| e.to_string())?;
                let row = edited_row(rows, row_id, ip.clone(), mac.clone())?;
                station.update_dhcp_entry(&row).map_err(|e| e.to_string())?;
                print_json(&serde_json::to_value(&row).map_err(|e| e.to_string())?);
            }
        },
        Command::Version | Command::Params => {}
        _ => return Err("Unsupported command".to_string()),
    }
    Ok(())
}
