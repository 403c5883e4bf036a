use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use log::debug;
use regex::Regex;

use crate::{http::Secret, runtime::Runtime};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_REGISTRY_URL: &str = "https://ghcr.io";

/// Credential variables, in lookup order.
pub const TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Configuration problems, all detected before any network call.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid repository format '{0}'. Expected 'owner/name'.")]
    InvalidRepo(String),
    #[error("KEEP_TAGS must name at least one tag")]
    NoKeepTags,
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("Invalid TEMP_TAG_REGEX '{pattern}'")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("No credential found. Set GITHUB_TOKEN or GH_TOKEN.")]
    MissingToken,
}

/// Image repository identifier (owner/name format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Registry path of the image. Registry paths are lowercase.
    pub fn image(&self) -> String {
        self.to_string().to_lowercase()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            Err(ConfigError::InvalidRepo(s.to_string()))
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                name: parts[1].to_string(),
            })
        }
    }
}

/// Raw options as given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct PruneOptions {
    pub repo: String,
    pub owner: String,
    pub keep_tags: String,
    pub retention_days: u32,
    pub temp_tag_regex: String,
    pub actor: String,
    pub package: Option<String>,
    pub api_url: Option<String>,
    pub registry_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub dry_run: bool,
}

/// Validated, immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub repo: RepoId,
    pub owner: String,
    pub package: String,
    /// Registry path of the package, the image whose keep tags are protected.
    pub image: String,
    pub keep_tags: Vec<String>,
    pub retention_days: u32,
    pub temp_tag_regex: Regex,
    pub actor: String,
    pub token: Secret,
    pub api_url: String,
    pub registry_url: String,
    /// Overall per-request timeout. `None` keeps the HTTP client defaults.
    pub request_timeout: Option<Duration>,
    pub dry_run: bool,
}

impl Config {
    /// Validate options and read the credential from the environment.
    pub fn load<R: Runtime>(runtime: &R, options: PruneOptions) -> Result<Self, ConfigError> {
        let repo: RepoId = options.repo.parse()?;

        let owner = non_empty(options.owner, "OWNER")?;
        let actor = non_empty(options.actor, "GITHUB_ACTOR")?;

        let mut keep_tags: Vec<String> = Vec::new();
        for tag in options.keep_tags.split_whitespace() {
            if !keep_tags.iter().any(|t| t == tag) {
                keep_tags.push(tag.to_string());
            }
        }
        if keep_tags.is_empty() {
            return Err(ConfigError::NoKeepTags);
        }

        let temp_tag_regex =
            Regex::new(&options.temp_tag_regex).map_err(|source| ConfigError::InvalidRegex {
                pattern: options.temp_tag_regex.clone(),
                source,
            })?;

        // Protection and deletion must address the same image.
        let (package, image) = match options.package {
            Some(package) => {
                let package = non_empty(package, "PACKAGE")?;
                let image = format!("{}/{}", owner, package).to_lowercase();
                (package, image)
            }
            None => (repo.name.to_lowercase(), repo.image()),
        };

        let token = load_token(runtime)?;

        let config = Self {
            repo,
            owner,
            package,
            image,
            keep_tags,
            retention_days: options.retention_days,
            temp_tag_regex,
            actor,
            token,
            api_url: trim_url(options.api_url.as_deref().unwrap_or(DEFAULT_API_URL)),
            registry_url: trim_url(
                options
                    .registry_url
                    .as_deref()
                    .unwrap_or(DEFAULT_REGISTRY_URL),
            ),
            request_timeout: options.request_timeout_secs.map(Duration::from_secs),
            dry_run: options.dry_run,
        };
        debug!("Loaded configuration: {:?}", config);

        Ok(config)
    }
}

fn load_token<R: Runtime>(runtime: &R) -> Result<Secret, ConfigError> {
    for var in TOKEN_VARS {
        if let Ok(token) = runtime.env_var(var)
            && !token.trim().is_empty()
        {
            debug!("Using credential from {}", var);
            return Ok(Secret::new(token.trim()));
        }
    }
    Err(ConfigError::MissingToken)
}

fn non_empty(value: String, name: &'static str) -> Result<String, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        Err(ConfigError::Empty(name))
    } else {
        Ok(value.to_string())
    }
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::env::VarError;

    fn options() -> PruneOptions {
        PruneOptions {
            repo: "Acme/App".into(),
            owner: "acme".into(),
            keep_tags: "latest  stable\nlatest".into(),
            retention_days: 3,
            temp_tag_regex: "^[0-9a-f]+-(amd64|arm64)$".into(),
            actor: "octocat".into(),
            ..Default::default()
        }
    }

    fn runtime_with_tokens(github: Option<&str>, gh: Option<&str>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        let github = github.map(String::from);
        let gh = gh.map(String::from);
        runtime
            .expect_env_var()
            .with(eq("GITHUB_TOKEN"))
            .returning(move |_| github.clone().ok_or(VarError::NotPresent));
        runtime
            .expect_env_var()
            .with(eq("GH_TOKEN"))
            .returning(move |_| gh.clone().ok_or(VarError::NotPresent));
        runtime
    }

    #[test]
    fn test_load_defaults() {
        let runtime = runtime_with_tokens(Some("ghs_a"), None);
        let config = Config::load(&runtime, options()).unwrap();

        assert_eq!(config.repo.to_string(), "Acme/App");
        assert_eq!(config.repo.image(), "acme/app");
        assert_eq!(config.image, "acme/app");
        assert_eq!(config.package, "app");
        assert_eq!(config.keep_tags, vec!["latest", "stable"]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.registry_url, DEFAULT_REGISTRY_URL);
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.token.expose(), "ghs_a");
        assert!(!config.dry_run);
    }

    #[test]
    fn test_load_overrides() {
        let runtime = runtime_with_tokens(Some("ghs_a"), None);
        let config = Config::load(
            &runtime,
            PruneOptions {
                package: Some("tools/app".into()),
                api_url: Some("http://localhost:1234/".into()),
                registry_url: Some("http://localhost:5678/".into()),
                request_timeout_secs: Some(90),
                dry_run: true,
                ..options()
            },
        )
        .unwrap();

        assert_eq!(config.package, "tools/app");
        assert_eq!(config.api_url, "http://localhost:1234");
        assert_eq!(config.registry_url, "http://localhost:5678");
        assert_eq!(config.request_timeout, Some(Duration::from_secs(90)));
        assert!(config.dry_run);
    }

    #[test]
    fn test_package_override_moves_the_registry_image() {
        let runtime = runtime_with_tokens(Some("ghs_a"), None);
        let config = Config::load(
            &runtime,
            PruneOptions {
                package: Some("App-Tools".into()),
                ..options()
            },
        )
        .unwrap();

        assert_eq!(config.package, "App-Tools");
        assert_eq!(config.image, "acme/app-tools");
        assert_eq!(config.repo.image(), "acme/app");
    }

    #[test]
    fn test_registry_image_matches_package_path() {
        for package in [None, Some("app-tools".to_string())] {
            let runtime = runtime_with_tokens(Some("ghs_a"), None);
            let config = Config::load(
                &runtime,
                PruneOptions {
                    package: package.clone(),
                    ..options()
                },
            )
            .unwrap();
            assert_eq!(
                config.image,
                format!("{}/{}", config.owner, config.package).to_lowercase(),
                "{:?}",
                package
            );
        }
    }

    #[test]
    fn test_token_falls_back_to_gh_token() {
        let runtime = runtime_with_tokens(Some("  "), Some("gho_b"));
        let config = Config::load(&runtime, options()).unwrap();
        assert_eq!(config.token.expose(), "gho_b");
    }

    #[test]
    fn test_missing_token() {
        let runtime = runtime_with_tokens(None, None);
        let err = Config::load(&runtime, options()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken));
    }

    #[test]
    fn test_token_is_not_in_debug_output() {
        let runtime = runtime_with_tokens(Some("ghs_very_secret"), None);
        let config = Config::load(&runtime, options()).unwrap();
        assert!(!format!("{:?}", config).contains("ghs_very_secret"));
    }

    #[test]
    fn test_invalid_repo() {
        let runtime = MockRuntime::new();
        for repo in ["app", "acme/", "/app", "a/b/c", ""] {
            let err = Config::load(
                &runtime,
                PruneOptions {
                    repo: repo.into(),
                    ..options()
                },
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidRepo(_)), "{}", repo);
        }
    }

    #[test]
    fn test_empty_keep_tags() {
        let runtime = MockRuntime::new();
        let err = Config::load(
            &runtime,
            PruneOptions {
                keep_tags: " \t ".into(),
                ..options()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoKeepTags));
    }

    #[test]
    fn test_invalid_regex() {
        let runtime = MockRuntime::new();
        let err = Config::load(
            &runtime,
            PruneOptions {
                temp_tag_regex: "([a-f".into(),
                ..options()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { .. }));
        assert!(err.to_string().contains("([a-f"));
    }

    #[test]
    fn test_empty_owner_and_actor() {
        let runtime = MockRuntime::new();
        let err = Config::load(
            &runtime,
            PruneOptions {
                owner: " ".into(),
                ..options()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "OWNER must not be empty");

        let err = Config::load(
            &runtime,
            PruneOptions {
                actor: "".into(),
                ..options()
            },
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "GITHUB_ACTOR must not be empty");
    }
}
