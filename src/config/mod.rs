use serde::Deserialize;
use std::env::var;
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config/fqe.toml";

/// Startup parameters of the bot.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    /// Guild to register commands in, `None` registers them globally.
    pub guild_id: Option<u64>,
    /// Deregister our commands when shutting down.
    pub remove_commands: bool,
    pub fqe: FqeSettings,
}

/// Where and how the FQE site is reached.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FqeSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FqeSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.fqechecs.qc.ca".to_string(),
            timeout_secs: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FqeSettings {
    /// Load endpoint settings from a TOML file, defaults when the file is missing.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("no endpoint config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let settings: FqeSettings = toml::from_str(content)?;
        if settings.timeout_secs == 0 {
            return Err("timeout_secs must be at least 1".into());
        }
        Ok(settings)
    }
}

impl BotConfig {
    /// Read the configuration from the environment (and `.env` if there is one).
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!("no .env file loaded: {}", e);
        }

        let token = var("DISCORD_TOKEN")
            .map_err(|_| "Missing `DISCORD_TOKEN` env var, see README for more information.")?;
        let guild_id = parse_guild_id(var("GUILD_ID").ok().as_deref())?;
        let remove_commands = parse_flag(var("REMOVE_COMMANDS").ok().as_deref(), true)?;

        let config_path = var("FQE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let fqe = FqeSettings::load_from_file(config_path)?;

        Ok(Self {
            token,
            guild_id,
            remove_commands,
            fqe,
        })
    }
}

fn parse_guild_id(raw: Option<&str>) -> Result<Option<u64>, Box<dyn std::error::Error>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => {
            let id = id
                .parse::<u64>()
                .map_err(|_| format!("GUILD_ID must be a valid u64, got `{}`", id))?;
            if id == 0 {
                return Err("GUILD_ID must not be 0".into());
            }
            Ok(Some(id))
        }
    }
}

fn parse_flag(raw: Option<&str>, default: bool) -> Result<bool, Box<dyn std::error::Error>> {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(format!("expected a boolean, got `{}`", other).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_settings() {
        let settings = FqeSettings::parse("timeout_secs = 3\n").unwrap();
        assert_eq!(settings.timeout_secs, 3);
        assert_eq!(settings.base_url, FqeSettings::default().base_url);
    }

    #[test]
    fn test_parse_rejects_zero_timeout() {
        assert!(FqeSettings::parse("timeout_secs = 0").is_err());
        assert!(FqeSettings::parse("base_url = 12").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = FqeSettings::load_from_file("config/does-not-exist.toml").unwrap();
        assert_eq!(settings, FqeSettings::default());
    }

    #[test]
    fn test_load_shipped_config() {
        let path = format!("{}/{}", env!("CARGO_MANIFEST_DIR"), DEFAULT_CONFIG_PATH);
        let settings = FqeSettings::load_from_file(path).unwrap();
        assert_eq!(settings.base_url, "https://www.fqechecs.qc.ca");
    }

    #[test]
    fn test_guild_id() {
        assert_eq!(parse_guild_id(None).unwrap(), None);
        assert_eq!(parse_guild_id(Some("  ")).unwrap(), None);
        assert_eq!(parse_guild_id(Some("123456789")).unwrap(), Some(123456789));
        assert!(parse_guild_id(Some("abc")).is_err());
        assert!(parse_guild_id(Some("0")).is_err());
    }

    #[test]
    fn test_flags() {
        assert!(parse_flag(None, true).unwrap());
        assert!(!parse_flag(Some("False"), true).unwrap());
        assert!(parse_flag(Some("1"), false).unwrap());
        assert!(parse_flag(Some("maybe"), true).is_err());
    }
}
