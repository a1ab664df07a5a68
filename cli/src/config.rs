use eyre::{Context, ContextCompat};
use serde::Deserialize;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the optional config file looked up in the working directory
pub(crate) const CONFIG_FILE_NAME: &str = "delambda.toml";

/// Allowed number of functions fetched at once
pub(crate) const CONCURRENCY_RANGE: RangeInclusive<usize> = 1..=32;

/// Settings of the tool
///
/// Assembled from delambda.toml, then DELAMBDA_* env vars, then command line flags,
/// every next source overriding the previous one.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Config {
    /// AWS region, falls back to the usual AWS resolution chain when not set
    pub(crate) region: Option<String>,

    /// Named profile from ~/.aws/config
    pub(crate) profile: Option<String>,

    /// Custom endpoint for all AWS services, e.g. localstack
    pub(crate) endpoint_url: Option<String>,

    /// Max number of functions fetched at once
    pub(crate) concurrency: usize,

    /// Give up listing after this long
    pub(crate) timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            region: None,
            profile: None,
            endpoint_url: None,
            concurrency: 1,
            timeout: None,
        }
    }
}

/// Values passed in the command line
#[derive(Debug, Clone, Default)]
pub(crate) struct Overrides {
    pub(crate) region: Option<String>,
    pub(crate) profile: Option<String>,
}

/// FileConfig is the structure of delambda.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    /// [aws]
    /// region = "eu-west-1"
    #[serde(default)]
    aws: AwsSection,

    /// [list]
    /// concurrency = 4
    /// timeout = "30s"
    #[serde(default)]
    list: ListSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AwsSection {
    region: Option<String>,
    profile: Option<String>,
    endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListSection {
    concurrency: Option<usize>,
    timeout: Option<String>,
}

impl Config {
    /// Load the config for the current process
    ///
    /// DELAMBDA_CONFIG points to a config file other than the one in the working directory.
    pub(crate) fn load(overrides: &Overrides) -> eyre::Result<Self> {
        let env = std::env::vars().collect::<HashMap<_, _>>();

        let source = match env.get("DELAMBDA_CONFIG") {
            Some(path) => ConfigFile::Required(PathBuf::from(path)),
            None => ConfigFile::Optional(
                std::env::current_dir()
                    .wrap_err("Failed to get current dir")?
                    .join(CONFIG_FILE_NAME),
            ),
        };

        Self::from_sources(&source, &env, overrides)
    }

    fn from_sources(
        file: &ConfigFile,
        env: &HashMap<String, String>,
        overrides: &Overrides,
    ) -> eyre::Result<Self> {
        let mut config = match file {
            ConfigFile::Optional(path) => Self::from_path(path)?,
            ConfigFile::Required(path) => Self::from_required_path(path)?,
        };

        if let Some(region) = env.get("DELAMBDA_REGION") {
            config.region = Some(region.to_owned());
        }

        if let Some(profile) = env.get("DELAMBDA_PROFILE") {
            config.profile = Some(profile.to_owned());
        }

        if let Some(endpoint_url) = env.get("DELAMBDA_ENDPOINT_URL") {
            config.endpoint_url = Some(endpoint_url.to_owned());
        }

        if let Some(concurrency) = env.get("DELAMBDA_CONCURRENCY") {
            let concurrency = concurrency
                .parse::<usize>()
                .wrap_err("Wrong format of DELAMBDA_CONCURRENCY")?;

            config.concurrency =
                check_concurrency(concurrency).wrap_err("Wrong value of DELAMBDA_CONCURRENCY")?;
        }

        if let Some(timeout) = env.get("DELAMBDA_TIMEOUT") {
            config.timeout = Some(parse_timeout(timeout).wrap_err("Wrong format of DELAMBDA_TIMEOUT")?);
        }

        if let Some(region) = &overrides.region {
            config.region = Some(region.to_owned());
        }

        if let Some(profile) = &overrides.profile {
            config.profile = Some(profile.to_owned());
        }

        Ok(config)
    }

    /// Read the config file, the defaults are used if there is no file
    fn from_path(path: &Path) -> eyre::Result<Self> {
        let Ok(toml_string) = std::fs::read_to_string(path) else {
            log::debug!("No config found at {path:?}, using defaults");
            return Ok(Config::default());
        };

        Self::from_toml(&toml_string).wrap_err(format!("Failed to parse {path:?}"))
    }

    /// Read a config file which was asked for explicitly, it must exist
    fn from_required_path(path: &Path) -> eyre::Result<Self> {
        let toml_string =
            std::fs::read_to_string(path).wrap_err(format!("Failed to read {path:?}"))?;

        Self::from_toml(&toml_string).wrap_err(format!("Failed to parse {path:?}"))
    }

    fn from_toml(toml_string: &str) -> eyre::Result<Self> {
        let file: FileConfig = toml::from_str(toml_string)?;
        let defaults = Config::default();

        Ok(Config {
            region: file.aws.region,
            profile: file.aws.profile,
            endpoint_url: file.aws.endpoint_url,
            concurrency: file
                .list
                .concurrency
                .map(check_concurrency)
                .transpose()
                .wrap_err("Wrong value of [list] concurrency")?
                .unwrap_or(defaults.concurrency),
            timeout: file
                .list
                .timeout
                .map(|timeout| parse_timeout(&timeout))
                .transpose()
                .wrap_err("Wrong format of [list] timeout")?,
        })
    }
}

/// Where the config file comes from
enum ConfigFile {
    /// delambda.toml in the working directory, defaults are used without it
    Optional(PathBuf),

    /// Set with DELAMBDA_CONFIG
    Required(PathBuf),
}

pub(crate) fn check_concurrency(concurrency: usize) -> eyre::Result<usize> {
    if !CONCURRENCY_RANGE.contains(&concurrency) {
        eyre::bail!(
            "Concurrency must be between {} and {}, got {concurrency}",
            CONCURRENCY_RANGE.start(),
            CONCURRENCY_RANGE.end()
        );
    }

    Ok(concurrency)
}

/// Parse a human readable duration, e.g. "30s" or "2m 30s"
pub(crate) fn parse_timeout(value: &str) -> eyre::Result<Duration> {
    let timeout = humantime::parse_duration(value)
        .wrap_err(format!("Not a duration: \"{value}\""))?;

    Some(timeout)
        .filter(|timeout| !timeout.is_zero())
        .wrap_err("Timeout must be greater than zero")
}
