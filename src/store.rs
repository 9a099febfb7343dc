//! Single authoritative feed state.
//!
//! [`FeedStore`] owns the fetched collections, the view filter, the like
//! registry and the selected-post detail. All mutation goes through its
//! action methods; the presentation layer reads [`FeedView`] snapshots.

use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Range;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::api::types::{Collections, Comment, Post, User};
use crate::view_model::{
    self, AuthorIndex, PageRange, SortOrder, ViewFilter, clamp_page, filter_posts, page_count,
    select_page, sort_posts,
};

/// Initial like counts are drawn from this range.
pub const LIKE_SEED_RANGE: Range<u32> = 0..100;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("unknown post id {0}")]
    UnknownPost(u64),
}

// ---------------------------------------------------------------------------
// Like state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub count: u32,
    pub liked: bool,
}

impl LikeState {
    pub fn seeded(count: u32) -> Self {
        Self {
            count,
            liked: false,
        }
    }

    /// Flip `liked`, moving `count` by one in the same direction.
    pub fn toggle(&mut self) {
        if self.liked {
            self.count = self.count.saturating_sub(1);
        } else {
            self.count = self.count.saturating_add(1);
        }
        self.liked = !self.liked;
    }
}

/// Per-post like state for the loaded post collection.
#[derive(Debug, Default)]
pub struct LikeRegistry {
    entries: HashMap<u64, LikeState>,
}

impl LikeRegistry {
    /// Align the registry with `posts`: surviving posts keep their state,
    /// new posts get a fresh seed, vanished posts are dropped.
    pub fn reconcile<R: RngExt + ?Sized>(&mut self, posts: &[Post], rng: &mut R) {
        let mut entries = HashMap::with_capacity(posts.len());
        for post in posts {
            let state = self
                .entries
                .get(&post.id)
                .copied()
                .unwrap_or_else(|| LikeState::seeded(rng.random_range(LIKE_SEED_RANGE)));
            entries.insert(post.id, state);
        }
        self.entries = entries;
    }

    pub fn get(&self, post_id: u64) -> Option<LikeState> {
        self.entries.get(&post_id).copied()
    }

    pub fn toggle(&mut self, post_id: u64) -> Result<LikeState, StoreError> {
        let state = self
            .entries
            .get_mut(&post_id)
            .ok_or(StoreError::UnknownPost(post_id))?;
        state.toggle();
        Ok(*state)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Detail view
// ---------------------------------------------------------------------------

/// The open detail view: a post, its comments in source order, and the
/// single demo like toggle shared by every comment in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedPostDetail {
    pub post: Post,
    pub author: Option<User>,
    pub comments: Vec<Comment>,
    pub comment_like: LikeState,
}

// ---------------------------------------------------------------------------
// Load state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready { loaded_at: DateTime<Utc> },
    /// The initial fetch failed. Nothing was published.
    Failed,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Pull the page back into range whenever the filtered set shrinks.
    pub clamp_page_on_filter: bool,
    /// Fixed seed for like counts; drawn from the thread RNG when unset.
    pub seed: Option<u64>,
    pub page_size: Option<usize>,
    pub sort_order: SortOrder,
}

pub struct FeedStore {
    /// Kept sorted by `filter.sort_order`.
    posts: Vec<Post>,
    users: Vec<User>,
    comments: Vec<Comment>,
    comment_counts: HashMap<u64, usize>,
    filter: ViewFilter,
    likes: LikeRegistry,
    detail: Option<SelectedPostDetail>,
    comment_like_seed: u32,
    load_state: LoadState,
    generation: u64,
    clamp_page_on_filter: bool,
    rng: StdRng,
}

impl Default for FeedStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl FeedStore {
    pub fn new(options: StoreOptions) -> Self {
        let seed = options.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = StdRng::seed_from_u64(seed);
        let comment_like_seed = rng.random_range(LIKE_SEED_RANGE);

        let filter = ViewFilter {
            sort_order: options.sort_order,
            page_size: options
                .page_size
                .unwrap_or(view_model::DEFAULT_PAGE_SIZE)
                .max(1),
            ..Default::default()
        };

        Self {
            posts: Vec::new(),
            users: Vec::new(),
            comments: Vec::new(),
            comment_counts: HashMap::new(),
            filter,
            likes: LikeRegistry::default(),
            detail: None,
            comment_like_seed,
            load_state: LoadState::Loading,
            generation: 0,
            clamp_page_on_filter: options.clamp_page_on_filter,
            rng,
        }
    }

    // -- Filter actions -----------------------------------------------------

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.filter.search_term = term.into();
        self.reconcile_page();
    }

    pub fn set_sort(&mut self, order: SortOrder) {
        if self.filter.sort_order == order {
            return;
        }
        self.filter.sort_order = order;
        sort_posts(&mut self.posts, order);
    }

    /// Pages are 1-based; 0 is treated as 1.
    pub fn set_page(&mut self, page: usize) {
        self.filter.page = page.max(1);
        self.reconcile_page();
    }

    /// Page sizes are positive; 0 is treated as 1.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.filter.page_size = page_size.max(1);
        self.reconcile_page();
    }

    /// Advance one page, stopping at the last page of the filtered set.
    pub fn next_page(&mut self) {
        if self.filter.page < self.page_count() {
            self.filter.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.filter.page = self.filter.page.saturating_sub(1).max(1);
    }

    fn reconcile_page(&mut self) {
        if self.clamp_page_on_filter && self.is_ready() {
            self.filter.page = clamp_page(
                self.filter.page,
                self.filtered_total(),
                self.filter.page_size,
            );
        }
    }

    // -- Interaction actions ------------------------------------------------

    pub fn toggle_like(&mut self, post_id: u64) -> Result<LikeState, StoreError> {
        let state = self.likes.toggle(post_id)?;
        tracing::debug!(post_id, count = state.count, liked = state.liked, "like toggled");
        Ok(state)
    }

    /// Open (or replace) the detail view for `post_id`.
    pub fn open_detail(&mut self, post_id: u64) -> Result<&SelectedPostDetail, StoreError> {
        let detail = self.build_detail(post_id)?;
        Ok(self.detail.insert(detail))
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Flip the shared comment like. No-op while the detail view is closed.
    pub fn toggle_comment_like(&mut self) -> Option<LikeState> {
        let detail = self.detail.as_mut()?;
        detail.comment_like.toggle();
        Some(detail.comment_like)
    }

    fn build_detail(&self, post_id: u64) -> Result<SelectedPostDetail, StoreError> {
        let post = self.post(post_id).ok_or(StoreError::UnknownPost(post_id))?;
        let author = AuthorIndex::new(&self.users).author_of(post).cloned();
        Ok(SelectedPostDetail {
            post: post.clone(),
            author,
            comments: self.comments_for(post_id).cloned().collect(),
            comment_like: LikeState::seeded(self.comment_like_seed),
        })
    }

    // -- Fetch bookkeeping --------------------------------------------------

    /// Start a new fetch and return its generation token. Only a result
    /// carrying the latest token is applied.
    pub fn begin_fetch(&mut self) -> u64 {
        self.generation += 1;
        if !self.is_ready() {
            self.load_state = LoadState::Loading;
        }
        tracing::debug!(generation = self.generation, "fetch started");
        self.generation
    }

    /// Apply a completed fetch. Returns `false` when the result is stale.
    pub fn apply_fetch<E: Display>(
        &mut self,
        generation: u64,
        result: Result<Collections, E>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale fetch result"
            );
            return false;
        }

        match result {
            Ok(collections) => self.load(collections),
            Err(e) if self.is_ready() => {
                tracing::warn!("reload failed, keeping previous collections: {e}");
            }
            Err(e) => {
                tracing::error!("error during load: {e}");
                self.load_state = LoadState::Failed;
            }
        }
        true
    }

    fn load(&mut self, collections: Collections) {
        let Collections {
            mut posts,
            users,
            comments,
        } = collections;

        sort_posts(&mut posts, self.filter.sort_order);

        let mut comment_counts = HashMap::new();
        for comment in &comments {
            *comment_counts.entry(comment.post_id).or_insert(0) += 1;
        }

        self.likes.reconcile(&posts, &mut self.rng);
        self.posts = posts;
        self.users = users;
        self.comments = comments;
        self.comment_counts = comment_counts;
        self.load_state = LoadState::Ready {
            loaded_at: Utc::now(),
        };

        // Keep an open detail in step with the new collections.
        if let Some(post_id) = self.detail.as_ref().map(|d| d.post.id) {
            self.detail = self.build_detail(post_id).ok();
        }
        self.reconcile_page();
    }

    // -- Queries ------------------------------------------------------------

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.load_state, LoadState::Ready { .. })
    }

    /// True until collections are available, including after a failed
    /// initial fetch.
    pub fn is_loading(&self) -> bool {
        !self.is_ready()
    }

    /// Posts in the current sort order.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[cfg(test)]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn post(&self, post_id: u64) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }

    /// Comments on `post_id`, in source order.
    pub fn comments_for(&self, post_id: u64) -> impl Iterator<Item = &Comment> {
        self.comments.iter().filter(move |c| c.post_id == post_id)
    }

    pub fn comment_count(&self, post_id: u64) -> usize {
        self.comment_counts.get(&post_id).copied().unwrap_or(0)
    }

    pub fn like(&self, post_id: u64) -> Option<LikeState> {
        self.likes.get(post_id)
    }

    #[cfg(test)]
    pub fn likes(&self) -> &LikeRegistry {
        &self.likes
    }

    pub fn detail(&self) -> Option<&SelectedPostDetail> {
        self.detail.as_ref()
    }

    pub fn filtered_total(&self) -> usize {
        let authors = AuthorIndex::new(&self.users);
        filter_posts(&self.posts, &authors, &self.filter.search_term).len()
    }

    pub fn page_count(&self) -> usize {
        page_count(self.filtered_total(), self.filter.page_size)
    }

    /// Read-only projection for the presentation layer.
    pub fn view(&self) -> FeedView<'_> {
        let authors = AuthorIndex::new(&self.users);
        let page = select_page(&self.posts, &authors, &self.filter);
        let total = page.total;

        let rows = page
            .entries
            .iter()
            .map(|entry| FeedRow {
                post: entry.post,
                author: entry.author,
                like: self.likes.get(entry.post.id).unwrap_or_default(),
                comment_count: self.comment_count(entry.post.id),
            })
            .collect();

        FeedView {
            rows,
            loading: self.is_loading(),
            filter: &self.filter,
            filtered_total: total,
            page_count: page_count(total, self.filter.page_size),
            range: PageRange::new(self.filter.page, self.filter.page_size, total),
            detail: self.detail.as_ref(),
            load_state: self.load_state(),
        }
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedRow<'a> {
    pub post: &'a Post,
    pub author: Option<&'a User>,
    pub like: LikeState,
    pub comment_count: usize,
}

#[derive(Debug)]
pub struct FeedView<'a> {
    pub rows: Vec<FeedRow<'a>>,
    pub loading: bool,
    pub filter: &'a ViewFilter,
    pub filtered_total: usize,
    pub page_count: usize,
    pub range: PageRange,
    pub detail: Option<&'a SelectedPostDetail>,
    pub load_state: LoadState,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collections(post_count: u64) -> Collections {
        let posts = (1..=post_count)
            .map(|id| Post {
                id,
                user_id: (id - 1) % 3 + 1,
                title: format!("post number {id}"),
                body: format!("body {id}"),
            })
            .collect();
        let users = vec![
            User {
                id: 1,
                name: "Leanne Graham".into(),
            },
            User {
                id: 2,
                name: "Ervin Howell".into(),
            },
        ];
        let comments = vec![
            comment(10, 2, "first on two"),
            comment(11, 1, "only on one"),
            comment(12, 2, "second on two"),
        ];
        Collections {
            posts,
            users,
            comments,
        }
    }

    fn comment(id: u64, post_id: u64, name: &str) -> Comment {
        Comment {
            id,
            post_id,
            name: name.into(),
            email: format!("{id}@example.com"),
            body: String::new(),
        }
    }

    fn loaded_store(post_count: u64) -> FeedStore {
        let mut store = FeedStore::new(StoreOptions {
            seed: Some(7),
            ..Default::default()
        });
        let generation = store.begin_fetch();
        assert!(store.apply_fetch::<String>(generation, Ok(collections(post_count))));
        store
    }

    fn page_ids(store: &FeedStore) -> Vec<u64> {
        store.view().rows.iter().map(|r| r.post.id).collect()
    }

    #[test]
    fn view_agrees_with_pure_page_builder() {
        let source = collections(23);
        let mut store = loaded_store(23);
        for order in [SortOrder::Ascending, SortOrder::Descending] {
            for term in ["", "graham", "7", "HOWELL", "nothing matches"] {
                for size in [1, 4, 10, 30] {
                    for page in 1..=8 {
                        store.set_sort(order);
                        store.set_search(term);
                        store.set_page_size(size);
                        store.set_page(page);

                        let expected = crate::view_model::build_page(
                            &source.posts,
                            &source.users,
                            store.filter(),
                        );
                        let view = store.view();
                        let got: Vec<u64> = view.rows.iter().map(|r| r.post.id).collect();
                        let want: Vec<u64> = expected.entries.iter().map(|e| e.post.id).collect();
                        assert_eq!(got, want, "{order} {term:?} size={size} page={page}");
                        assert_eq!(view.filtered_total, expected.total);
                    }
                }
            }
        }
    }

    #[test]
    fn starts_loading_with_empty_registry() {
        let store = FeedStore::default();
        assert!(store.is_loading());
        assert!(store.likes().is_empty());
        assert!(store.view().rows.is_empty());
    }

    #[test]
    fn every_post_gets_a_seeded_like_entry() {
        let store = loaded_store(100);
        assert_eq!(store.likes().len(), 100);
        for post in store.posts() {
            let like = store.like(post.id).unwrap();
            assert!(LIKE_SEED_RANGE.contains(&like.count));
            assert!(!like.liked);
        }
    }

    #[test]
    fn double_toggle_restores_like_state() {
        let mut store = loaded_store(5);
        let before = store.like(3).unwrap();

        let liked = store.toggle_like(3).unwrap();
        assert!(liked.liked);
        assert_eq!(liked.count, before.count + 1);

        let unliked = store.toggle_like(3).unwrap();
        assert_eq!(unliked, before);
    }

    #[test]
    fn toggles_on_different_posts_are_independent() {
        let mut store = loaded_store(5);
        let other = store.like(2).unwrap();
        store.toggle_like(1).unwrap();
        assert_eq!(store.like(2), Some(other));
    }

    #[test]
    fn toggle_unknown_post_is_an_error() {
        let mut store = loaded_store(5);
        assert_eq!(store.toggle_like(99), Err(StoreError::UnknownPost(99)));
    }

    #[test]
    fn first_page_of_hundred_posts() {
        let store = loaded_store(100);
        assert_eq!(page_ids(&store), (1..=10).collect::<Vec<_>>());
        let view = store.view();
        assert_eq!(view.filtered_total, 100);
        assert_eq!(view.page_count, 10);
        assert_eq!(view.range.to_string(), "1-10 of 100 items");
    }

    #[test]
    fn set_sort_reverses_order() {
        let mut store = loaded_store(30);
        store.set_page_size(30);
        let asc = page_ids(&store);
        store.set_sort(SortOrder::Descending);
        let mut desc = page_ids(&store);
        desc.reverse();
        assert_eq!(asc, desc);
    }

    #[test]
    fn rows_carry_author_like_and_comment_count() {
        let store = loaded_store(3);
        let view = store.view();
        let row = view.rows.iter().find(|r| r.post.id == 2).unwrap();
        assert_eq!(row.author.map(|u| u.name.as_str()), Some("Ervin Howell"));
        assert_eq!(row.comment_count, 2);
        assert_eq!(Some(row.like), store.like(2));

        // user 3 does not exist: renders without an author
        let orphan = view.rows.iter().find(|r| r.post.id == 3).unwrap();
        assert!(orphan.author.is_none());
        assert_eq!(orphan.comment_count, 0);
    }

    #[test]
    fn unmatched_search_shows_empty_page() {
        let mut store = loaded_store(100);
        store.set_search("no post or author has this");
        let view = store.view();
        assert!(view.rows.is_empty());
        assert_eq!(view.filtered_total, 0);
    }

    #[test]
    fn narrowing_search_keeps_page_by_default() {
        let mut store = loaded_store(100);
        store.set_page(5);
        store.set_search("ervin");
        assert_eq!(store.filter().page, 5);
        // 33 matches, pages 1..=4
        assert!(store.view().rows.is_empty());
    }

    #[test]
    fn narrowing_search_clamps_page_when_enabled() {
        let mut store = FeedStore::new(StoreOptions {
            clamp_page_on_filter: true,
            seed: Some(1),
            ..Default::default()
        });
        let generation = store.begin_fetch();
        store.apply_fetch::<String>(generation, Ok(collections(100)));
        store.set_page(5);
        store.set_search("ervin");
        assert_eq!(store.filter().page, 4);
        assert!(!store.view().rows.is_empty());
    }

    #[test]
    fn page_and_size_setters_reject_zero() {
        let mut store = loaded_store(10);
        store.set_page(0);
        store.set_page_size(0);
        assert_eq!(store.filter().page, 1);
        assert_eq!(store.filter().page_size, 1);
    }

    #[test]
    fn next_page_stops_at_last_page() {
        let mut store = loaded_store(25);
        store.next_page();
        store.next_page();
        store.next_page();
        assert_eq!(store.filter().page, 3);
        store.prev_page();
        assert_eq!(store.filter().page, 2);
    }

    #[test]
    fn open_detail_collects_matching_comments_in_order() {
        let mut store = loaded_store(5);
        let detail = store.open_detail(2).unwrap();
        let ids: Vec<u64> = detail.comments.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert!(!detail.comment_like.liked);

        store.close_detail();
        assert!(store.detail().is_none());
    }

    #[test]
    fn opening_while_open_replaces_selection() {
        let mut store = loaded_store(5);
        store.open_detail(2).unwrap();
        store.open_detail(1).unwrap();
        let detail = store.detail().unwrap();
        assert_eq!(detail.post.id, 1);
        assert_eq!(detail.comments.len(), 1);
    }

    #[test]
    fn open_detail_for_post_without_comments() {
        let mut store = loaded_store(5);
        assert!(store.open_detail(4).unwrap().comments.is_empty());
        assert_eq!(store.open_detail(42), Err(StoreError::UnknownPost(42)));
    }

    #[test]
    fn comment_like_resets_to_store_seed_on_open() {
        let mut store = loaded_store(5);
        let seed = store.open_detail(1).unwrap().comment_like;
        let toggled = store.toggle_comment_like().unwrap();
        assert_eq!(toggled.count, seed.count + 1);

        let reopened = store.open_detail(2).unwrap().comment_like;
        assert_eq!(reopened, seed);

        store.close_detail();
        assert_eq!(store.toggle_comment_like(), None);
    }

    #[test]
    fn failed_initial_fetch_publishes_nothing() {
        let mut store = FeedStore::default();
        let generation = store.begin_fetch();
        assert!(store.apply_fetch(generation, Err::<Collections, _>("comments: 500")));
        assert_eq!(store.load_state(), LoadState::Failed);
        let view = store.view();
        assert!(view.loading);
        assert_eq!(view.load_state, LoadState::Failed);
        assert!(view.rows.is_empty());
        assert!(store.likes().is_empty());
    }

    #[test]
    fn failed_reload_keeps_previous_collections() {
        let mut store = loaded_store(5);
        let generation = store.begin_fetch();
        store.apply_fetch(generation, Err::<Collections, _>("offline"));
        assert!(store.is_ready());
        assert_eq!(store.posts().len(), 5);
    }

    #[test]
    fn stale_fetch_result_is_ignored() {
        let mut store = FeedStore::new(StoreOptions {
            seed: Some(3),
            ..Default::default()
        });
        let stale = store.begin_fetch();
        let current = store.begin_fetch();

        assert!(store.apply_fetch::<String>(current, Ok(collections(4))));
        assert!(!store.apply_fetch::<String>(stale, Ok(collections(50))));
        assert_eq!(store.posts().len(), 4);
    }

    #[test]
    fn reload_keeps_like_state_of_surviving_posts() {
        let mut store = loaded_store(5);
        let liked = store.toggle_like(2).unwrap();

        let generation = store.begin_fetch();
        store.apply_fetch::<String>(generation, Ok(collections(8)));

        assert_eq!(store.like(2), Some(liked));
        assert_eq!(store.likes().len(), 8);

        let generation = store.begin_fetch();
        store.apply_fetch::<String>(generation, Ok(collections(3)));
        assert_eq!(store.likes().len(), 3);
        assert_eq!(store.like(5), None);
    }

    #[test]
    fn reload_refreshes_open_detail() {
        let mut store = loaded_store(5);
        store.open_detail(5).unwrap();

        let generation = store.begin_fetch();
        store.apply_fetch::<String>(generation, Ok(collections(3)));
        assert!(store.detail().is_none());
    }

    #[test]
    fn same_seed_gives_same_like_counts() {
        let a = loaded_store(20);
        let b = loaded_store(20);
        for post in a.posts() {
            assert_eq!(a.like(post.id), b.like(post.id));
        }
    }
}
