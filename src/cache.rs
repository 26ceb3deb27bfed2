//! Read-through cache for issue queries, plus pure pagination.
//!
//! Entries are keyed by the full filter combination, so `(repo=A, open)` and
//! `(repo=A, all)` live and expire independently. An entry is replaced
//! wholesale on refresh; there is no partial invalidation. Sync operations
//! drop the whole cache because any entry may be stale after a mirror write.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::types::{Issue, IssueState, RepoFullName};

/// How long a cached query result stays fresh.
pub const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// State dimension of a query filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StateFilter {
    Open,
    Closed,
    #[default]
    All,
}

impl StateFilter {
    /// Parses the `state` query parameter. Unknown values are rejected so a
    /// typo cannot silently widen a query to `all`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "open" => Some(StateFilter::Open),
            "closed" => Some(StateFilter::Closed),
            "all" => Some(StateFilter::All),
            _ => None,
        }
    }

    /// The concrete state this filter narrows to, if any.
    pub fn as_state(self) -> Option<IssueState> {
        match self {
            StateFilter::Open => Some(IssueState::Open),
            StateFilter::Closed => Some(IssueState::Closed),
            StateFilter::All => None,
        }
    }
}

type CacheKey = (Option<RepoFullName>, StateFilter);

struct CacheEntry {
    issues: Arc<Vec<Issue>>,
    fetched_at: Instant,
}

/// TTL cache over issue query results.
///
/// Results are stored behind `Arc` so a hit is a pointer clone, never a
/// copy of the issue list.
pub struct QueryCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_ttl(CACHE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        QueryCache {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, repo: Option<&RepoFullName>, state: StateFilter) -> Option<Arc<Vec<Issue>>> {
        self.get_at(repo, state, Instant::now())
    }

    pub fn insert(&self, repo: Option<RepoFullName>, state: StateFilter, issues: Vec<Issue>) {
        self.insert_at(repo, state, issues, Instant::now());
    }

    /// Drops every entry. Called after any write to the issue mirror.
    pub fn invalidate_all(&self) {
        self.entries.write().expect("cache lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_at(
        &self,
        repo: Option<&RepoFullName>,
        state: StateFilter,
        now: Instant,
    ) -> Option<Arc<Vec<Issue>>> {
        let key = (repo.cloned(), state);
        let guard = self.entries.read().expect("cache lock poisoned");
        let entry = guard.get(&key)?;
        if now.duration_since(entry.fetched_at) >= self.ttl {
            return None;
        }
        Some(entry.issues.clone())
    }

    fn insert_at(
        &self,
        repo: Option<RepoFullName>,
        state: StateFilter,
        issues: Vec<Issue>,
        now: Instant,
    ) {
        self.entries.write().expect("cache lock poisoned").insert(
            (repo, state),
            CacheEntry {
                issues: Arc::new(issues),
                fetched_at: now,
            },
        );
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// One page of a sliced result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

/// Slices an already-sorted result set into one page.
///
/// Pages are 1-based. A page past the end yields an empty item list with
/// the bookkeeping still correct; `has_more` is true exactly when items
/// exist beyond this page's window.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    debug_assert!(page >= 1);
    debug_assert!(per_page >= 1);

    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let start = (page - 1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(total);

    let page_items = if start >= total {
        Vec::new()
    } else {
        items[start..end].to_vec()
    };

    Page {
        items: page_items,
        total,
        page,
        per_page,
        total_pages,
        has_more: end < total,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    use crate::types::{GithubId, IssueNumber, UserRef};

    use super::*;

    fn issue(n: u64) -> Issue {
        Issue {
            github_id: GithubId(n),
            number: IssueNumber(n),
            repo: RepoFullName::parse("acme/widgets").unwrap(),
            title: format!("issue {n}"),
            body: String::new(),
            state: IssueState::Open,
            labels: Vec::new(),
            author: UserRef {
                login: "octocat".to_string(),
                id: GithubId(1),
                avatar_url: None,
            },
            assignee: None,
            comments: 0,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            closed_at: None,
            locked: false,
            milestone: None,
            html_url: String::new(),
        }
    }

    #[test]
    fn cache_hit_within_ttl() {
        let cache = QueryCache::new();
        let start = Instant::now();
        cache.insert_at(None, StateFilter::Open, vec![issue(1)], start);

        let hit = cache.get_at(None, StateFilter::Open, start + Duration::from_secs(60));
        assert_eq!(hit.unwrap().len(), 1);
    }

    #[test]
    fn cache_entry_expires_at_ttl() {
        let cache = QueryCache::new();
        let start = Instant::now();
        cache.insert_at(None, StateFilter::Open, vec![issue(1)], start);

        assert!(cache.get_at(None, StateFilter::Open, start + CACHE_TTL).is_none());
    }

    #[test]
    fn filter_combinations_are_independent_entries() {
        let cache = QueryCache::new();
        let repo = RepoFullName::parse("acme/widgets").unwrap();
        let now = Instant::now();

        cache.insert_at(None, StateFilter::All, vec![issue(1), issue(2)], now);
        cache.insert_at(Some(repo.clone()), StateFilter::All, vec![issue(1)], now);
        cache.insert_at(Some(repo.clone()), StateFilter::Open, vec![issue(2)], now);

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.get_at(None, StateFilter::All, now).unwrap().len(), 2);
        assert_eq!(
            cache
                .get_at(Some(&repo), StateFilter::Open, now)
                .unwrap()
                .len(),
            1
        );
        assert!(cache.get_at(None, StateFilter::Open, now).is_none());
    }

    #[test]
    fn invalidate_all_empties_the_cache() {
        let cache = QueryCache::new();
        cache.insert(None, StateFilter::All, vec![issue(1)]);
        assert!(!cache.is_empty());

        cache.invalidate_all();
        assert!(cache.is_empty());
        assert!(cache.get(None, StateFilter::All).is_none());
    }

    #[test]
    fn state_filter_parsing() {
        assert_eq!(StateFilter::parse("open"), Some(StateFilter::Open));
        assert_eq!(StateFilter::parse("closed"), Some(StateFilter::Closed));
        assert_eq!(StateFilter::parse("all"), Some(StateFilter::All));
        assert_eq!(StateFilter::parse("Open"), None);
        assert_eq!(StateFilter::parse(""), None);
    }

    #[test]
    fn paginate_last_partial_page() {
        let items: Vec<u64> = (0..23).collect();
        let page = paginate(&items, 3, 10);

        assert_eq!(page.items, vec![20, 21, 22]);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);
        assert!(!page.has_more);
    }

    #[test]
    fn paginate_middle_page_has_more() {
        let items: Vec<u64> = (0..23).collect();
        let page = paginate(&items, 2, 10);

        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0], 10);
        assert!(page.has_more);
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let items: Vec<u64> = (0..5).collect();
        let page = paginate(&items, 4, 10);

        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_more);
    }

    #[test]
    fn paginate_empty_input() {
        let items: Vec<u64> = Vec::new();
        let page = paginate(&items, 1, 10);

        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 1);
        assert!(!page.has_more);
    }

    proptest! {
        /// Walking all pages in order yields exactly the input, once.
        #[test]
        fn pages_partition_the_input(
            len in 0usize..200,
            per_page in 1usize..50,
        ) {
            let items: Vec<usize> = (0..len).collect();
            let mut reassembled = Vec::new();
            let mut page_no = 1;
            loop {
                let page = paginate(&items, page_no, per_page);
                prop_assert!(page.items.len() <= per_page);
                reassembled.extend(page.items.iter().copied());
                if !page.has_more {
                    break;
                }
                page_no += 1;
            }
            prop_assert_eq!(reassembled, items);
        }

        /// `has_more` is true exactly when later items exist.
        #[test]
        fn has_more_matches_window_position(
            len in 0usize..200,
            page in 1usize..30,
            per_page in 1usize..50,
        ) {
            let items: Vec<usize> = (0..len).collect();
            let result = paginate(&items, page, per_page);
            let consumed = (page - 1) * per_page + result.items.len();
            prop_assert_eq!(result.has_more, consumed < len);
        }
    }
}
