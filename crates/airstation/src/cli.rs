use std::time::Duration;

use airstation_core::{DEFAULT_URL, DeviceCommand, commands, credentials::DEFAULT_USERNAME};
use clap::{Parser, Subcommand, ValueEnum};

pub fn parse_duration(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}

/// Parses `key=value`; the value may be empty and may contain `=`.
pub fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", arg)),
    }
}

/// Buffalo AirStation web console client
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the router's web console
    #[arg(long, global = true, env = "AIRSTATION_URL", default_value = DEFAULT_URL)]
    pub url: String,

    /// Console user.
    /// Can also be set via AIRSTATION_USERNAME environment variable.
    #[arg(
        short,
        long,
        global = true,
        env = "AIRSTATION_USERNAME",
        default_value = DEFAULT_USERNAME
    )]
    pub username: String,

    /// Read password from stdin.
    /// Useful for scripting: echo "password" | airstation --password-stdin dhcp list
    #[arg(long, global = true)]
    pub password_stdin: bool,

    /// Timeout in seconds for each request
    #[arg(long, global = true, value_parser = parse_duration, default_value = "10")]
    pub timeout: Duration,

    /// Charset used for form bodies
    #[arg(long, global = true, default_value = "utf-8")]
    pub encoding: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show version information for CLI and core library
    Version,

    /// List the JSON parameter names the console is known to answer
    Params,

    /// Log in and report the session state
    Status,

    /// Fetch a JSON parameter (e.g. WIRELESS, DEVICE, QOS)
    Get {
        /// Parameter name; unknown names are sent as given
        param: String,
    },

    /// Submit a raw command as key=value fields, in order
    Set {
        #[arg(required = true, value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// Fetch a console form page and print its HTML
    Page {
        /// Page file name, e.g. dhcps_lease.html
        name: String,
    },

    /// DHCP address reservations
    Dhcp {
        #[command(subcommand)]
        command: DhcpCommand,
    },

    /// Send a Wake-on-LAN packet from the router
    Wol {
        /// MAC address of the machine to wake
        mac: String,
    },

    /// Start AOSS/WPS pairing
    Aoss,

    /// Turn QoS on or off
    Qos {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Turn the guest network on or off
    Guest {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Rescan attached storage
    NasDetect,
}

#[derive(Subcommand)]
pub enum DhcpCommand {
    /// Print the reservation table as JSON
    List,

    /// Change the address or MAC of one reservation
    Edit {
        /// Row id as printed by `dhcp list`
        row_id: String,

        /// New IP address (default: keep)
        #[arg(long)]
        ip: Option<String>,

        /// New MAC address (default: keep)
        #[arg(long)]
        mac: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Switch {
    On,
    Off,
}

impl Switch {
    pub fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}

impl Command {
    /// The command to submit for actions that map to one pre-built command.
    pub fn device_command(&self) -> Option<DeviceCommand> {
        match self {
            Command::Set { fields } => Some(fields.iter().cloned().collect()),
            Command::Wol { mac } => Some(commands::wake_on_lan(mac)),
            Command::Aoss => Some(commands::start_aoss()),
            Command::Qos { state } => Some(commands::enable_qos(state.is_on())),
            Command::Guest { state } => Some(commands::enable_guest_wifi(state.is_on())),
            Command::NasDetect => Some(commands::detect_nas()),
            _ => None,
        }
    }
}
