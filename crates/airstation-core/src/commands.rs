//! Named JSON datasets and pre-built commands for the `set` endpoint.
//!
//! Every builder returns a [`DeviceCommand`] ready for
//! [`AirStation::set`](crate::AirStation::set). The `el` field names the
//! console widget the command targets.
//!
//! # Example
//!
//! ```no_run
//! use airstation_core::{AirStation, ClientConfig, Credentials, JsonParam, commands};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), airstation_core::Error> {
//!     let station = AirStation::new(ClientConfig::default(), Credentials::default())?;
//!     station.login().await?;
//!
//!     let wireless = station.get_json_param(JsonParam::Wireless).await?;
//!     println!("{}", wireless);
//!
//!     station.set(&commands::enable_guest_wifi(true)).await?;
//!     station.close().await;
//!     Ok(())
//! }
//! ```

use std::str::FromStr;

use crate::{error::Error, form::DeviceCommand};

/// Field naming the console widget a command targets.
pub const ELEMENT_FIELD: &str = "el";

/// Datasets served by `get_json_param`.
///
/// The console accepts any name; these are the ones it is known to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonParam {
    /// AOSS/WPS pairing state.
    Aoss,
    /// Connected clients and their per-device settings.
    DevCtrl,
    /// Model, firmware and addressing of the router itself.
    Device,
    Function,
    /// Guest network settings.
    Guest,
    /// Internet connection status.
    Icon,
    Lang,
    /// Attached storage.
    Nas,
    Parental,
    Qos,
    System,
    /// Radio settings for every band.
    Wireless,
    Wps,
    /// Whether the console is busy applying settings.
    Busy,
    Dlna,
    Torrent,
    Samba,
    ExtenderMonitor,
    /// Remote web access to attached storage.
    WebAccess,
}

impl JsonParam {
    pub const ALL: [JsonParam; 19] = [
        JsonParam::Aoss,
        JsonParam::DevCtrl,
        JsonParam::Device,
        JsonParam::Function,
        JsonParam::Guest,
        JsonParam::Icon,
        JsonParam::Lang,
        JsonParam::Nas,
        JsonParam::Parental,
        JsonParam::Qos,
        JsonParam::System,
        JsonParam::Wireless,
        JsonParam::Wps,
        JsonParam::Busy,
        JsonParam::Dlna,
        JsonParam::Torrent,
        JsonParam::Samba,
        JsonParam::ExtenderMonitor,
        JsonParam::WebAccess,
    ];

    /// The name the console expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonParam::Aoss => "AOSS",
            JsonParam::DevCtrl => "DEVCTRL",
            JsonParam::Device => "DEVICE",
            JsonParam::Function => "FUNCTION",
            JsonParam::Guest => "GUEST",
            JsonParam::Icon => "ICON",
            JsonParam::Lang => "LANG",
            JsonParam::Nas => "NAS",
            JsonParam::Parental => "PARENTAL",
            JsonParam::Qos => "QOS",
            JsonParam::System => "SYSTEM",
            JsonParam::Wireless => "WIRELESS",
            JsonParam::Wps => "WPS",
            JsonParam::Busy => "BUSY",
            JsonParam::Dlna => "DLNA",
            JsonParam::Torrent => "TORRENT",
            JsonParam::Samba => "SAMBA",
            JsonParam::ExtenderMonitor => "EXTENDERMONITOR",
            JsonParam::WebAccess => "WEB_AXS",
        }
    }
}

impl AsRef<str> for JsonParam {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for JsonParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonParam {
    type Err = Error;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonParam::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::Protocol(format!("unknown JSON parameter: {}", s)))
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "ON" } else { "OFF" }
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

/// Sends a Wake-on-LAN packet to `mac` from the router.
///
/// ```
/// use airstation_core::commands;
///
/// let cmd = commands::wake_on_lan("aa:bb:cc:dd:ee:ff");
/// assert_eq!(cmd.get("el"), Some("do_wol_DEVCTRL"));
/// assert_eq!(cmd.get("mac"), Some("aa:bb:cc:dd:ee:ff"));
/// ```
pub fn wake_on_lan(mac: &str) -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "do_wol_DEVCTRL")
        .with("mac", mac)
}

/// Starts AOSS/WPS pairing.
pub fn start_aoss() -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "button_AOSS")
        .with("val", "Start AOSS/WPS")
}

/// Turns the QoS function on or off.
pub fn enable_qos(on: bool) -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "button_QOS")
        .with("val", on_off(on))
}

/// Selects a QoS policy and sets whether QoS is active.
///
/// The `polycy` spelling is what the console expects.
pub fn qos_policy(policy: &str, enabled: bool) -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "basic_setting_QOS")
        .with("function", flag(enabled))
        .with("polycy", policy)
}

/// Selects a parental control policy by number.
pub fn parental_policy(policy: u32) -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "basic_setting_PARENTAL")
        .with("polycy", policy.to_string())
}

/// Turns the guest network on or off.
pub fn enable_guest_wifi(on: bool) -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "button_GUEST")
        .with("val", on_off(on))
}

/// Makes the router rescan attached storage.
pub fn detect_nas() -> DeviceCommand {
    DeviceCommand::new().with(ELEMENT_FIELD, "button_NAS_redetect")
}

/// Saves the per-client settings shown on the device control page.
pub fn device_settings(
    name: &str,
    mac: &str,
    img: &str,
    qos: u32,
    parental: bool,
    disconnect: bool,
) -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "basic_setting_DEVCTRL")
        .with("name", name)
        .with("mac", mac)
        .with("img", img)
        .with("qos", qos.to_string())
        .with("parental", flag(parental))
        .with("disconnect", flag(disconnect))
}

/// Settings for one radio band, as submitted by [`wireless_settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Radio<'a> {
    pub enabled: bool,
    pub ssid: &'a str,
    /// Encryption type label, e.g. `wpa2psk_aes`.
    pub enctype: &'a str,
    pub key: &'a str,
    pub channel: u32,
    pub bandwidth: u32,
}

impl Radio<'_> {
    fn append_to(&self, command: DeviceCommand, suffix: &str) -> DeviceCommand {
        command
            .with(format!("func{}", suffix), flag(self.enabled))
            .with(format!("ssid{}", suffix), self.ssid)
            .with(format!("enctype{}", suffix), self.enctype)
            .with(format!("key{}", suffix), self.key)
            .with(format!("ch{}", suffix), self.channel.to_string())
            .with(format!("bw{}", suffix), self.bandwidth.to_string())
    }
}

/// Saves both radios. The console expects the 2.4 GHz (`_g`) fields
/// before the 5 GHz (`_a`) ones.
///
/// ```
/// use airstation_core::commands::{self, Radio};
///
/// let g = Radio {
///     enabled: true,
///     ssid: "home",
///     enctype: "wpa2psk_aes",
///     key: "secret",
///     channel: 6,
///     bandwidth: 20,
/// };
/// let a = Radio { ssid: "home-5g", channel: 36, bandwidth: 80, ..g };
/// let cmd = commands::wireless_settings(&a, &g);
/// assert_eq!(cmd.get("ssid_g"), Some("home"));
/// assert_eq!(cmd.get("ch_a"), Some("36"));
/// ```
pub fn wireless_settings(band_a: &Radio<'_>, band_g: &Radio<'_>) -> DeviceCommand {
    let command = DeviceCommand::new().with(ELEMENT_FIELD, "basic_setting_WIRELESS");
    let command = band_g.append_to(command, "_g");
    band_a.append_to(command, "_a")
}

/// Saves the guest network settings. `time` is the guest session length
/// as the console counts it.
///
/// This form carries no `el` field.
pub fn guest_settings(ssid: &str, enctype: &str, key: &str, time: u32) -> DeviceCommand {
    DeviceCommand::new()
        .with("ssid_g", ssid)
        .with("enctype_g", enctype)
        .with("key_g", key)
        .with("time", time.to_string())
}

/// Turns the storage services on or off and sets the NAS name.
pub fn nas_settings(
    samba: bool,
    torrent: bool,
    dlna: bool,
    web_access: bool,
    name: &str,
) -> DeviceCommand {
    DeviceCommand::new()
        .with(ELEMENT_FIELD, "basic_setting_NAS")
        .with("samba", flag(samba))
        .with("torrent", flag(torrent))
        .with("dlna", flag(dlna))
        .with("webaxs", flag(web_access))
        .with("nascomname", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_names() {
        assert_eq!(JsonParam::Wireless.as_str(), "WIRELESS");
        assert_eq!(JsonParam::WebAccess.to_string(), "WEB_AXS");
        assert_eq!(JsonParam::ExtenderMonitor.as_str(), "EXTENDERMONITOR");
    }

    #[test]
    fn test_param_from_str() {
        for param in JsonParam::ALL {
            assert_eq!(param.as_str().parse::<JsonParam>().unwrap(), param);
        }
        assert_eq!("devctrl".parse::<JsonParam>().unwrap(), JsonParam::DevCtrl);
        assert!("WIFI".parse::<JsonParam>().is_err());
    }

    #[test]
    fn test_button_commands() {
        let on = enable_qos(true);
        assert_eq!(on.iter().collect::<Vec<_>>(), [("el", "button_QOS"), ("val", "ON")]);
        assert_eq!(enable_guest_wifi(false).get("val"), Some("OFF"));
        assert_eq!(start_aoss().get("val"), Some("Start AOSS/WPS"));
        assert_eq!(detect_nas().len(), 1);
    }

    #[test]
    fn test_policy_commands() {
        let qos = qos_policy("GAME", true);
        assert_eq!(
            qos.iter().collect::<Vec<_>>(),
            [("el", "basic_setting_QOS"), ("function", "1"), ("polycy", "GAME")]
        );
        assert_eq!(qos_policy("AUTO", false).get("function"), Some("0"));
        assert_eq!(parental_policy(2).get("polycy"), Some("2"));
    }

    #[test]
    fn test_device_settings() {
        let cmd = device_settings("laptop", "aa:bb:cc:dd:ee:ff", "pc", 3, true, false);
        assert_eq!(
            cmd.iter().collect::<Vec<_>>(),
            [
                ("el", "basic_setting_DEVCTRL"),
                ("name", "laptop"),
                ("mac", "aa:bb:cc:dd:ee:ff"),
                ("img", "pc"),
                ("qos", "3"),
                ("parental", "1"),
                ("disconnect", "0"),
            ]
        );
    }

    #[test]
    fn test_wireless_settings_order() {
        let g = Radio {
            enabled: true,
            ssid: "home",
            enctype: "wpa2psk_aes",
            key: "secret",
            channel: 6,
            bandwidth: 20,
        };
        let a = Radio {
            enabled: false,
            ssid: "home-5g",
            channel: 36,
            bandwidth: 80,
            ..g
        };
        let cmd = wireless_settings(&a, &g);
        let keys: Vec<&str> = cmd.iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            [
                "el", "func_g", "ssid_g", "enctype_g", "key_g", "ch_g", "bw_g", "func_a",
                "ssid_a", "enctype_a", "key_a", "ch_a", "bw_a",
            ]
        );
        assert_eq!(cmd.get("el"), Some("basic_setting_WIRELESS"));
        assert_eq!(cmd.get("func_g"), Some("1"));
        assert_eq!(cmd.get("func_a"), Some("0"));
        assert_eq!(cmd.get("ssid_a"), Some("home-5g"));
        assert_eq!(cmd.get("bw_a"), Some("80"));
        assert_eq!(cmd.get("key_a"), Some("secret"));
    }

    #[test]
    fn test_guest_and_nas_settings() {
        let guest = guest_settings("visitors", "none", "", 180);
        assert_eq!(
            guest.iter().collect::<Vec<_>>(),
            [("ssid_g", "visitors"), ("enctype_g", "none"), ("key_g", ""), ("time", "180")]
        );
        assert_eq!(guest.get("el"), None);

        let nas = nas_settings(true, false, true, false, "STORAGE");
        assert_eq!(
            nas.iter().collect::<Vec<_>>(),
            [
                ("el", "basic_setting_NAS"),
                ("samba", "1"),
                ("torrent", "0"),
                ("dlna", "1"),
                ("webaxs", "0"),
                ("nascomname", "STORAGE"),
            ]
        );
    }
}
