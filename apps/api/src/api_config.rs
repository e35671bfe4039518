use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use sanatio_core::AppError;
use sanatio_domain::{ProtectedArea, SubjectCatalog};
use tracing_subscriber::EnvFilter;

const DEFAULT_ROUTE_GUARD_ROOT: &str = "/doctor";
const DEFAULT_SIGN_IN_PATH: &str = "/sign-in";

/// Page navigation guard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuardConfig {
    pub root: String,
    pub sign_in_path: String,
    pub segment_subjects: Vec<(String, String)>,
}

impl Default for RouteGuardConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_ROUTE_GUARD_ROOT.to_owned(),
            sign_in_path: DEFAULT_SIGN_IN_PATH.to_owned(),
            segment_subjects: Vec::new(),
        }
    }
}

impl RouteGuardConfig {
    /// Builds the protected area and checks its segment map against the catalog.
    pub fn protected_area(&self, catalog: &SubjectCatalog) -> Result<ProtectedArea, AppError> {
        let mut area = ProtectedArea::new(&self.root)?;
        if area.root() == "/" {
            return Err(AppError::Validation(
                "ROUTE_GUARD_ROOT must not protect the whole site".to_owned(),
            ));
        }
        if !self.sign_in_path.starts_with('/') {
            return Err(AppError::Validation(format!(
                "ROUTE_GUARD_SIGN_IN_PATH '{}' must start with '/'",
                self.sign_in_path
            )));
        }
        if area.contains(&self.sign_in_path) {
            return Err(AppError::Validation(format!(
                "ROUTE_GUARD_SIGN_IN_PATH '{}' must lie outside '{}'",
                self.sign_in_path,
                area.root()
            )));
        }

        for (segment, subject) in &self.segment_subjects {
            area = area.with_segment_subject(segment, subject)?;
        }
        area.validate_against(catalog)?;

        Ok(area)
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: Option<String>,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub _session_secret: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub dev_seed: bool,
    pub route_guard: RouteGuardConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty_env("AUTH_BOOTSTRAP_TOKEN")?;
        let session_secret = required_env("SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(AppError::Validation(
                "SESSION_SECRET must be at least 32 characters".to_owned(),
            ));
        }

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");
        let dev_seed = env::var("DEV_SEED")
            .ok()
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(database_url.is_none());

        let route_guard = RouteGuardConfig {
            root: env::var("ROUTE_GUARD_ROOT")
                .unwrap_or_else(|_| DEFAULT_ROUTE_GUARD_ROOT.to_owned()),
            sign_in_path: env::var("ROUTE_GUARD_SIGN_IN_PATH")
                .unwrap_or_else(|_| DEFAULT_SIGN_IN_PATH.to_owned()),
            segment_subjects: parse_segment_map(
                env::var("ROUTE_GUARD_SEGMENT_MAP")
                    .unwrap_or_default()
                    .as_str(),
            )?,
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            bootstrap_token,
            _session_secret: session_secret,
            api_host,
            api_port,
            cookie_secure,
            dev_seed,
            route_guard,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Parses `segment=subject` pairs separated by commas.
pub fn parse_segment_map(raw: &str) -> Result<Vec<(String, String)>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (segment, subject) = pair.split_once('=').ok_or_else(|| {
                AppError::Validation(format!(
                    "ROUTE_GUARD_SEGMENT_MAP entry '{pair}' must look like 'segment=subject'"
                ))
            })?;
            Ok((segment.trim().to_owned(), subject.trim().to_owned()))
        })
        .collect()
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests;
