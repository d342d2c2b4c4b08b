//! User list query and cache tags

use serde::{Deserialize, Serialize};
use umc_shared::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, DEFAULT_SORT_BY};
use umc_shared::SortOrder;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUsersQuery {
    pub page: u32,
    pub limit: u32,
    pub search: String,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl Default for ListUsersQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
            search: String::new(),
            sort_by: DEFAULT_SORT_BY.to_string(),
            sort_order: SortOrder::Desc,
        }
    }
}

impl ListUsersQuery {
    /// Query-string parameters; zero page/limit and an empty sort column
    /// fall back to their defaults.
    pub fn params(&self) -> Vec<(String, String)> {
        let page = if self.page == 0 { DEFAULT_PAGE } else { self.page };
        let limit = if self.limit == 0 { DEFAULT_PAGE_SIZE } else { self.limit };
        let sort_by = if self.sort_by.is_empty() { DEFAULT_SORT_BY } else { &self.sort_by };
        vec![
            ("page".to_string(), page.to_string()),
            ("limit".to_string(), limit.to_string()),
            ("search".to_string(), self.search.clone()),
            ("sortBy".to_string(), sort_by.to_string()),
            ("sortOrder".to_string(), self.sort_order.to_string()),
        ]
    }

    pub fn cache_key(&self) -> String {
        let params = self
            .params()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("listAllUsers({})", params)
    }
}

/// Tags attached to cached responses; mutations invalidate by tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheTag {
    Users,
    UserDetails(String),
}
