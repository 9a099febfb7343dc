//! Derives the display-ready feed page from the raw collections.
//!
//! The pipeline is sort, then filter, then paginate. Everything here is a
//! pure function of its inputs; the store caches the sorted order and calls
//! the later stages on every render.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::api::types::{Post, User};

pub const DEFAULT_PAGE_SIZE: usize = 10;

// ---------------------------------------------------------------------------
// Filter state
// ---------------------------------------------------------------------------

/// Post ordering by id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!("unknown sort order: {other} (expected asc or desc)")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Client-held search/sort/page parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewFilter {
    pub search_term: String,
    pub sort_order: SortOrder,
    /// 1-based.
    pub page: usize,
    /// Always > 0.
    pub page_size: usize,
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_order: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// ---------------------------------------------------------------------------
// Joins
// ---------------------------------------------------------------------------

/// A post joined with its (possibly missing) author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedEntry<'a> {
    pub post: &'a Post,
    pub author: Option<&'a User>,
}

/// Author lookup by user id. Duplicate ids resolve to the first user.
#[derive(Debug, Default)]
pub struct AuthorIndex<'a> {
    by_id: HashMap<u64, &'a User>,
}

impl<'a> AuthorIndex<'a> {
    pub fn new(users: &'a [User]) -> Self {
        let mut by_id = HashMap::with_capacity(users.len());
        for user in users {
            by_id.entry(user.id).or_insert(user);
        }
        Self { by_id }
    }

    pub fn author_of(&self, post: &Post) -> Option<&'a User> {
        self.by_id.get(&post.user_id).copied()
    }
}

// ---------------------------------------------------------------------------
// Pipeline stages
// ---------------------------------------------------------------------------

/// Stable in-place sort by post id. Works on owned posts or references.
pub fn sort_posts<P: Borrow<Post>>(posts: &mut [P], order: SortOrder) {
    match order {
        SortOrder::Ascending => posts.sort_by_key(|p| p.borrow().id),
        SortOrder::Descending => posts.sort_by(|a, b| b.borrow().id.cmp(&a.borrow().id)),
    }
}

/// Case-insensitive substring match on the title or the author's name.
///
/// `needle` must already be lowercased. An empty needle matches everything.
pub fn matches_search(post: &Post, author: Option<&User>, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    post.title.to_lowercase().contains(needle)
        || author.is_some_and(|u| u.name.to_lowercase().contains(needle))
}

/// Join posts to authors and keep the ones matching `search_term`.
/// Input order is preserved.
pub fn filter_posts<'a, I>(
    posts: I,
    authors: &AuthorIndex<'a>,
    search_term: &str,
) -> Vec<FeedEntry<'a>>
where
    I: IntoIterator<Item = &'a Post>,
{
    let needle = search_term.to_lowercase();
    posts
        .into_iter()
        .map(|post| FeedEntry {
            post,
            author: authors.author_of(post),
        })
        .filter(|entry| matches_search(entry.post, entry.author, &needle))
        .collect()
}

/// The contiguous slice `[(page-1)*size, page*size)` clipped to `items`.
///
/// Returns an empty slice when the page starts past the end.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// One page of the filtered feed plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage<'a> {
    pub entries: Vec<FeedEntry<'a>>,
    pub total: usize,
}

/// Filter and paginate posts that are already in display order.
pub fn select_page<'a, I>(
    sorted: I,
    authors: &AuthorIndex<'a>,
    filter: &ViewFilter,
) -> FeedPage<'a>
where
    I: IntoIterator<Item = &'a Post>,
{
    let filtered = filter_posts(sorted, authors, &filter.search_term);
    FeedPage {
        entries: paginate(&filtered, filter.page, filter.page_size).to_vec(),
        total: filtered.len(),
    }
}

/// Sort, filter and paginate borrowed collections.
pub fn build_page<'a>(
    posts: &'a [Post],
    users: &'a [User],
    filter: &ViewFilter,
) -> FeedPage<'a> {
    let mut sorted: Vec<&Post> = posts.iter().collect();
    sort_posts(&mut sorted, filter.sort_order);
    select_page(sorted, &AuthorIndex::new(users), filter)
}

// ---------------------------------------------------------------------------
// Pager helpers
// ---------------------------------------------------------------------------

/// Number of pages needed for `total` items. Zero items need zero pages.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size.max(1))
}

/// Clamp `page` into `1..=max(1, page_count)`.
pub fn clamp_page(page: usize, total: usize, page_size: usize) -> usize {
    page.clamp(1, page_count(total, page_size).max(1))
}

/// 1-based item range shown by the pager, e.g. "11-20 of 100 items".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRange {
    pub first: usize,
    pub last: usize,
    pub total: usize,
}

impl PageRange {
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let start = page.saturating_sub(1).saturating_mul(page_size);
        if start >= total {
            return Self {
                first: 0,
                last: 0,
                total,
            };
        }
        Self {
            first: start + 1,
            last: start.saturating_add(page_size).min(total),
            total,
        }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} of {} items", self.first, self.last, self.total)
    }
}
