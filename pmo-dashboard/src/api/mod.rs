//! HTTP API handlers for pmo-dashboard
//!
//! Every handler re-reads the persisted model; there is no cache.

pub mod analysts;
pub mod categories;
pub mod comments;
pub mod dashboards;
pub mod health;
pub mod ingest;
pub mod model;
pub mod projects;
pub mod tasks;

pub use analysts::analyst_routes;
pub use categories::category_routes;
pub use comments::comment_routes;
pub use dashboards::dashboard_routes;
pub use health::health_routes;
pub use ingest::ingest_routes;
pub use model::model_routes;
pub use projects::project_routes;
pub use tasks::task_routes;

use crate::{ApiError, ApiResult};

/// Case-insensitive equality against an optional, possibly blank, filter
pub(crate) fn matches_filter(filter: &Option<String>, value: &str) -> bool {
    match filter.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(wanted) => wanted.to_lowercase() == value.trim().to_lowercase(),
    }
}

/// Case-insensitive substring search over several fields
pub(crate) fn matches_search(search: &Option<String>, fields: &[&str]) -> bool {
    match search.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            fields.iter().any(|f| f.to_lowercase().contains(&needle))
        }
    }
}

/// Parse an optional boolean query parameter (`true/false`, `sim/nao`, `1/0`)
pub(crate) fn parse_flag(name: &str, value: &Option<String>) -> ApiResult<Option<bool>> {
    match value.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(None),
        Some(v) => match v.as_str() {
            "" => Ok(None),
            "true" | "sim" | "1" => Ok(Some(true)),
            "false" | "nao" | "não" | "0" => Ok(Some(false)),
            _ => Err(ApiError::BadRequest(format!(
                "Invalid value for {}: {}",
                name, v
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_filter_ignores_blank() {
        assert!(matches_filter(&None, "x"));
        assert!(matches_filter(&Some("  ".into()), "x"));
        assert!(matches_filter(&Some("squada".into()), "SquadA"));
        assert!(!matches_filter(&Some("SquadB".into()), "SquadA"));
    }

    #[test]
    fn test_matches_search_any_field() {
        let search = Some("LOG".to_string());
        assert!(matches_search(&search, &["Portal", "Fix login"]));
        assert!(!matches_search(&search, &["Portal", "Deploy"]));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("x", &None).unwrap(), None);
        assert_eq!(parse_flag("x", &Some("Sim".into())).unwrap(), Some(true));
        assert_eq!(parse_flag("x", &Some("0".into())).unwrap(), Some(false));
        assert!(parse_flag("x", &Some("maybe".into())).is_err());
    }
}
