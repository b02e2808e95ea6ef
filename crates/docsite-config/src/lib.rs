//! Site configuration for docsite.
//!
//! Parses `docsite.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! A configuration declares one or more **plugin registrations**, each
//! binding a content root on disk to a URL route namespace, plus a list of
//! static asset directories. Loading is a single pass:
//! read, parse, validate, resolve paths. Any failure aborts the load; no
//! partially validated configuration is ever returned.
//!
//! Validation happens before any filesystem access, so structural errors
//! (duplicate ids, route collisions) are reported even when the declared
//! paths do not exist.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "docsite.toml";

/// Raw site configuration as parsed from TOML.
///
/// Paths are relative strings; [`SiteConfig::from_raw`] resolves them
/// against a base directory and validates the whole descriptor.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSiteConfig {
    /// Plugin registrations, in declaration order.
    pub plugins: Vec<RawPluginRegistration>,
    /// Static asset directories, relative to the config directory.
    pub static_directories: Vec<String>,
}

/// Raw plugin registration as parsed from TOML.
#[derive(Debug, Deserialize)]
pub struct RawPluginRegistration {
    /// Unique registration id.
    pub id: String,
    /// Content root, relative to the config directory.
    pub path: String,
    /// URL path segment under which generated pages are served.
    pub route_base_path: String,
    /// Symbolic reference to a named sidebar tree.
    #[serde(default)]
    pub sidebar: Option<String>,
    /// "Edit this page" URL template; passed through verbatim.
    #[serde(default)]
    pub edit_url: Option<String>,
    /// Version metadata keyed by version key (e.g., "current").
    /// Absence means the registration is unversioned.
    #[serde(default)]
    pub versions: Option<BTreeMap<String, VersionInfo>>,
}

/// Metadata for one documentation version.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct VersionInfo {
    /// Display label (e.g., "v1.2").
    pub label: String,
    /// URL segment for this version under the registration's namespace.
    #[serde(default)]
    pub path: String,
    /// Whether to show an "unreleased/unmaintained" badge.
    #[serde(default)]
    pub badge: bool,
}

/// Validated site configuration.
///
/// Constructed by [`SiteConfig::load`] or [`SiteConfig::from_raw`];
/// immutable for the duration of a build.
#[derive(Debug)]
pub struct SiteConfig {
    /// Validated plugin registrations, in declaration order.
    pub plugins: Vec<PluginRegistration>,
    /// Resolved static asset directories, in declaration order.
    pub static_directories: Vec<PathBuf>,
    /// Path to the config file (set when loaded from disk).
    pub config_path: Option<PathBuf>,
}

/// One validated content-root-to-URL-namespace binding.
#[derive(Debug)]
pub struct PluginRegistration {
    /// Unique registration id.
    pub id: String,
    /// Absolute content root; exists on disk at load time.
    pub content_path: PathBuf,
    /// Normalized route namespace (no surrounding slashes).
    pub route_base_path: String,
    /// Name of the sidebar tree rendered for this registration.
    pub sidebar_ref: String,
    /// "Edit this page" URL template; opaque to this crate.
    pub edit_url: Option<String>,
    /// Version metadata keyed by version key. Empty when unversioned.
    pub versions: BTreeMap<String, VersionInfo>,
}

impl PluginRegistration {
    /// Whether this registration carries version metadata.
    #[must_use]
    pub fn is_versioned(&self) -> bool {
        !self.versions.is_empty()
    }
}

/// Configuration error.
///
/// All variants are load-time and terminal: the build must halt before
/// page generation when any of them is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Two plugin registrations share an id.
    #[error("Duplicate plugin id: \"{id}\"")]
    DuplicateId {
        /// The id declared more than once.
        id: String,
    },
    /// Two plugin registrations serve the same route namespace.
    #[error("Route namespace collision: \"{route}\" is declared by both \"{first}\" and \"{second}\"")]
    RouteCollision {
        /// Normalized route namespace.
        route: String,
        /// Id of the registration that declared the route first.
        first: String,
        /// Id of the colliding registration.
        second: String,
    },
    /// A plugin registration declares no sidebar reference.
    #[error("Plugin \"{id}\" declares no sidebar reference")]
    MissingSidebarRef {
        /// Id of the offending registration.
        id: String,
    },
    /// A versions table is present but has no entries.
    #[error("Plugin \"{id}\" declares a versions table with no entries")]
    EmptyVersions {
        /// Id of the offending registration.
        id: String,
    },
    /// A declared path is empty.
    #[error("Invalid path in {field}: path is empty")]
    InvalidPath {
        /// Config field path (e.g., "`plugins.docs.path`").
        field: String,
    },
    /// A content root does not exist on disk.
    #[error("Content root for plugin \"{id}\" is missing or not a directory: {}", .path.display())]
    PathNotFound {
        /// Id of the offending registration.
        id: String,
        /// The resolved path that was checked.
        path: PathBuf,
    },
}

/// Normalize a route namespace by trimming surrounding slashes.
///
/// `docs`, `/docs` and `docs/` all name the same namespace.
fn normalize_route(route: &str) -> &str {
    route.trim_matches('/')
}

impl SiteConfig {
    /// Load configuration from a file.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `docsite.toml` in the current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no config file can be located,
    /// and any validation error from [`SiteConfig::from_raw`].
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_file(path);
        }
        match Self::discover_config() {
            Some(discovered) => {
                tracing::debug!(path = %discovered.display(), "Discovered config file");
                Self::load_from_file(&discovered)
            }
            None => Err(ConfigError::NotFound(PathBuf::from(CONFIG_FILENAME))),
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let raw: RawSiteConfig = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_raw(raw, config_dir)?;
        config.config_path = Some(path.to_path_buf());

        tracing::info!(
            plugins = config.plugins.len(),
            static_directories = config.static_directories.len(),
            "Loaded site configuration"
        );

        Ok(config)
    }

    /// Validate a raw descriptor and resolve its paths against `base_dir`.
    ///
    /// Structural checks run first, in a fixed order: duplicate ids, route
    /// collisions, missing sidebar references, empty versions tables, empty
    /// path strings. Filesystem existence checks run last, so a duplicate id
    /// is reported even when the declared content roots do not exist.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered; no partially validated
    /// configuration is returned.
    pub fn from_raw(raw: RawSiteConfig, base_dir: &Path) -> Result<Self, ConfigError> {
        validate_registrations(&raw.plugins)?;

        let mut plugins = Vec::with_capacity(raw.plugins.len());
        for plugin in raw.plugins {
            let content_path = base_dir.join(&plugin.path);
            if !content_path.is_dir() {
                return Err(ConfigError::PathNotFound {
                    id: plugin.id,
                    path: content_path,
                });
            }
            plugins.push(PluginRegistration {
                // validate_registrations guarantees the reference is present
                sidebar_ref: plugin.sidebar.unwrap_or_default(),
                id: plugin.id,
                content_path,
                route_base_path: normalize_route(&plugin.route_base_path).to_owned(),
                edit_url: plugin.edit_url,
                versions: plugin.versions.unwrap_or_default(),
            });
        }

        let static_directories = resolve_static_directories(&raw.static_directories, base_dir);

        Ok(Self {
            plugins,
            static_directories,
            config_path: None,
        })
    }

    /// Get a plugin registration by id.
    #[must_use]
    pub fn plugin(&self, id: &str) -> Option<&PluginRegistration> {
        self.plugins.iter().find(|p| p.id == id)
    }

    /// Search for a config file in the current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        Self::discover_config_from(std::env::current_dir().ok()?)
    }

    /// Search for a config file in `start` and its parents.
    fn discover_config_from(mut current: PathBuf) -> Option<PathBuf> {
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }
}

/// Structural validation of raw plugin registrations.
///
/// Runs before any path resolution or filesystem access. Each check runs
/// over every registration before the next check starts, so the reported
/// error kind does not depend on registration order.
fn validate_registrations(plugins: &[RawPluginRegistration]) -> Result<(), ConfigError> {
    let mut seen_ids: HashSet<&str> = HashSet::with_capacity(plugins.len());
    for plugin in plugins {
        if !seen_ids.insert(&plugin.id) {
            return Err(ConfigError::DuplicateId {
                id: plugin.id.clone(),
            });
        }
    }

    let mut seen_routes: HashMap<&str, &str> = HashMap::with_capacity(plugins.len());
    for plugin in plugins {
        let route = normalize_route(&plugin.route_base_path);
        if let Some(first) = seen_routes.insert(route, &plugin.id) {
            return Err(ConfigError::RouteCollision {
                route: route.to_owned(),
                first: first.to_owned(),
                second: plugin.id.clone(),
            });
        }
    }

    for plugin in plugins {
        match &plugin.sidebar {
            None => {
                return Err(ConfigError::MissingSidebarRef {
                    id: plugin.id.clone(),
                });
            }
            Some(sidebar) if sidebar.is_empty() => {
                return Err(ConfigError::MissingSidebarRef {
                    id: plugin.id.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for plugin in plugins {
        if let Some(versions) = &plugin.versions
            && versions.is_empty()
        {
            return Err(ConfigError::EmptyVersions {
                id: plugin.id.clone(),
            });
        }
    }

    for plugin in plugins {
        if plugin.path.is_empty() {
            return Err(ConfigError::InvalidPath {
                field: format!("plugins.{}.path", plugin.id),
            });
        }
    }

    Ok(())
}

/// Resolve static directories against the config directory.
///
/// Order is preserved. Duplicates are kept (they are wasteful, not an
/// error) and logged. Existence is not checked; serving static assets is
/// the surrounding framework's concern.
fn resolve_static_directories(dirs: &[String], base_dir: &Path) -> Vec<PathBuf> {
    let mut resolved = Vec::with_capacity(dirs.len());
    for dir in dirs {
        let path = base_dir.join(dir);
        if resolved.contains(&path) {
            tracing::debug!(path = %path.display(), "Duplicate static directory");
        }
        resolved.push(path);
    }
    resolved
}
