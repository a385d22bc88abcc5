//! The feed paginator — an ordered, deduplicated window over a review feed.
//!
//! One instance backs one feed view. An instance is constructed in exactly
//! one of two modes:
//!
//! - **paged**: pull-based, cursor-driven fetches of bounded pages via
//!   [`ReviewSource::fetch_page`], scope pushed down to the backend;
//! - **realtime**: push-based full snapshots via [`ReviewSource::subscribe`],
//!   scope filtered record-by-record on the client.
//!
//! Every merge deduplicates by review id. A cancellation token is checked
//! before any state mutation that follows an await, so a fetch resolving
//! after teardown mutates nothing.

use std::sync::{
  Arc, Mutex, PoisonError,
  atomic::{AtomicBool, Ordering},
};

use tokio_util::sync::CancellationToken;

use crate::{
  review::Review,
  store::{FeedScope, PageCursor, ReviewSource, ReviewSubscription},
};

/// Default page size, matching the mobile feed view.
pub const DEFAULT_PAGE_SIZE: usize = 20;

// ─── Mode and phase ──────────────────────────────────────────────────────────

/// How a paginator instance sources its reviews. Fixed at construction;
/// the two modes are mutually exclusive per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
  Realtime,
  Paged,
}

/// Observable lifecycle phase of the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
  Uninitialized,
  Loading,
  Ready,
  LoadingMore,
  Refreshing,
}

/// What a `load_more`/`refresh` call actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
  /// New records merged onto the end of the list (count after dedup).
  Appended(usize),
  /// The list was replaced by a fresh first page.
  Refreshed(usize),
  /// Live mode already reflects current state; nothing was fetched.
  Live,
  /// No further pages are available; nothing was fetched.
  NoMorePages,
  /// Another fetch is in flight; the request was dropped, not queued.
  AlreadyLoading,
  /// The feed was torn down; nothing was fetched or mutated.
  Cancelled,
}

// ─── State ───────────────────────────────────────────────────────────────────

struct FeedState {
  reviews:  Vec<Review>,
  cursor:   Option<PageCursor>,
  has_more: bool,
  phase:    FeedPhase,
}

// ─── Paginator ───────────────────────────────────────────────────────────────

/// Ordered, deduplicated, newest-first window over one feed scope.
///
/// All methods take `&self`; at most one fetch is in flight at a time,
/// enforced by a compare-and-swap guard rather than a queue — concurrent
/// requests beyond the first are dropped.
pub struct FeedPaginator<S: ReviewSource> {
  source:    Arc<S>,
  scope:     FeedScope,
  mode:      FeedMode,
  page_size: usize,
  state:     Mutex<FeedState>,
  in_flight: AtomicBool,
  cancel:    CancellationToken,
}

impl<S: ReviewSource> FeedPaginator<S> {
  /// A paged feed over `scope` with the given page size.
  pub fn paged(source: Arc<S>, scope: FeedScope, page_size: usize) -> Self {
    Self::new(source, scope, FeedMode::Paged, page_size)
  }

  /// A realtime feed over `scope`; drive it with [`Self::run_realtime`].
  pub fn realtime(source: Arc<S>, scope: FeedScope) -> Self {
    Self::new(source, scope, FeedMode::Realtime, DEFAULT_PAGE_SIZE)
  }

  fn new(source: Arc<S>, scope: FeedScope, mode: FeedMode, page_size: usize) -> Self {
    Self {
      source,
      scope,
      mode,
      page_size,
      state: Mutex::new(FeedState {
        reviews:  Vec::new(),
        cursor:   None,
        has_more: true,
        phase:    FeedPhase::Uninitialized,
      }),
      in_flight: AtomicBool::new(false),
      cancel: CancellationToken::new(),
    }
  }

  // ── Observers ─────────────────────────────────────────────────────────

  /// Snapshot of the materialised list, newest first.
  pub fn reviews(&self) -> Vec<Review> {
    self.lock().reviews.clone()
  }

  pub fn phase(&self) -> FeedPhase {
    self.lock().phase
  }

  pub fn has_more(&self) -> bool {
    self.lock().has_more
  }

  pub fn is_loading(&self) -> bool {
    self.in_flight.load(Ordering::SeqCst)
  }

  pub fn mode(&self) -> FeedMode {
    self.mode
  }

  pub fn scope(&self) -> &FeedScope {
    &self.scope
  }

  // ── Teardown ──────────────────────────────────────────────────────────

  /// Tear the feed down. In-flight fetches still resolve but apply no state
  /// update; the realtime loop exits on its next snapshot.
  pub fn cancel(&self) {
    self.cancel.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// Clone of the teardown token, for owners that tie it to a view scope.
  pub fn cancellation_token(&self) -> CancellationToken {
    self.cancel.clone()
  }

  // ── Paged operations ──────────────────────────────────────────────────

  /// Fetch the next sequential page and append it.
  ///
  /// Ignored (not queued) when no more pages are available or another fetch
  /// is already in flight. A failed fetch leaves prior state untouched and
  /// is not retried.
  pub async fn load_more(&self) -> Result<LoadOutcome, S::Error> {
    if self.mode == FeedMode::Realtime {
      // The live subscription already reflects current state.
      return Ok(LoadOutcome::Live);
    }
    if self.cancel.is_cancelled() {
      return Ok(LoadOutcome::Cancelled);
    }
    if !self.lock().has_more {
      return Ok(LoadOutcome::NoMorePages);
    }
    if !self.begin_fetch() {
      return Ok(LoadOutcome::AlreadyLoading);
    }

    let (cursor, prior_phase) = {
      let mut st = self.lock();
      let prior = st.phase;
      st.phase = if prior == FeedPhase::Uninitialized {
        FeedPhase::Loading
      } else {
        FeedPhase::LoadingMore
      };
      (st.cursor.clone(), prior)
    };

    let fetched = self
      .source
      .fetch_page(self.scope.clone(), self.page_size, cursor)
      .await;

    let page = match fetched {
      Ok(page) => page,
      Err(e) => {
        self.lock().phase = prior_phase;
        self.end_fetch();
        tracing::warn!(error = %e, "feed page fetch failed");
        return Err(e);
      }
    };

    if self.cancel.is_cancelled() {
      self.end_fetch();
      return Ok(LoadOutcome::Cancelled);
    }

    let fetched_len = page.reviews.len();
    let appended = {
      let mut st = self.lock();
      let appended = merge_append(&mut st.reviews, page.reviews);
      if fetched_len == 0 && page.next_cursor.is_none() {
        st.has_more = false;
      } else {
        if page.next_cursor.is_some() {
          st.cursor = page.next_cursor;
        }
        // The heuristic works on the raw page length. Dedup can shrink what
        // was appended without meaning the feed is exhausted.
        st.has_more = page.has_more.unwrap_or(fetched_len == self.page_size);
      }
      st.phase = FeedPhase::Ready;
      appended
    };

    self.end_fetch();
    Ok(LoadOutcome::Appended(appended))
  }

  /// Discard the cursor and reload the first page, replacing the list.
  ///
  /// In realtime mode this is a no-op observation point (it exists to
  /// satisfy a pull-to-refresh gesture) and resolves immediately.
  pub async fn refresh(&self) -> Result<LoadOutcome, S::Error> {
    if self.mode == FeedMode::Realtime {
      return Ok(LoadOutcome::Live);
    }
    if self.cancel.is_cancelled() {
      return Ok(LoadOutcome::Cancelled);
    }
    if !self.begin_fetch() {
      return Ok(LoadOutcome::AlreadyLoading);
    }

    let prior_phase = {
      let mut st = self.lock();
      let prior = st.phase;
      st.phase = if prior == FeedPhase::Uninitialized {
        FeedPhase::Loading
      } else {
        FeedPhase::Refreshing
      };
      prior
    };

    let fetched = self
      .source
      .fetch_page(self.scope.clone(), self.page_size, None)
      .await;

    let page = match fetched {
      Ok(page) => page,
      Err(e) => {
        self.lock().phase = prior_phase;
        self.end_fetch();
        tracing::warn!(error = %e, "feed refresh failed");
        return Err(e);
      }
    };

    if self.cancel.is_cancelled() {
      self.end_fetch();
      return Ok(LoadOutcome::Cancelled);
    }

    let fetched_len = page.reviews.len();
    let count = {
      let mut st = self.lock();
      st.reviews = dedup_by_id(page.reviews);
      let count = st.reviews.len();
      st.cursor = page.next_cursor;
      st.has_more = page.has_more.unwrap_or(fetched_len == self.page_size);
      st.phase = FeedPhase::Ready;
      count
    };

    self.end_fetch();
    Ok(LoadOutcome::Refreshed(count))
  }

  // ── Realtime operations ───────────────────────────────────────────────

  /// Subscribe and apply snapshots until the feed closes or the paginator is
  /// cancelled. Paged instances return immediately.
  ///
  /// The subscription handle is dropped (released) exactly once, when this
  /// loop exits.
  pub async fn run_realtime(&self) -> Result<(), S::Error> {
    if self.mode == FeedMode::Paged {
      return Ok(());
    }

    {
      let mut st = self.lock();
      if st.phase == FeedPhase::Uninitialized {
        st.phase = FeedPhase::Loading;
      }
    }

    let mut subscription = match self.source.subscribe().await {
      Ok(sub) => sub,
      Err(e) => {
        self.lock().phase = FeedPhase::Uninitialized;
        tracing::warn!(error = %e, "feed subscription failed");
        return Err(e);
      }
    };

    while let Some(snapshot) = subscription.next_snapshot().await {
      if self.cancel.is_cancelled() {
        break;
      }
      self.apply_snapshot(snapshot);
    }

    Ok(())
  }

  /// Replace the materialised list with an unfiltered snapshot, applying the
  /// scope filter record-by-record and deduplicating by id.
  pub fn apply_snapshot(&self, snapshot: Vec<Review>) {
    if self.cancel.is_cancelled() {
      return;
    }
    let filtered = snapshot
      .into_iter()
      .filter(|r| self.scope.matches(r))
      .collect();

    let mut st = self.lock();
    st.reviews = dedup_by_id(filtered);
    st.phase = FeedPhase::Ready;
  }

  // ── Internals ─────────────────────────────────────────────────────────

  fn lock(&self) -> std::sync::MutexGuard<'_, FeedState> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Claim the single in-flight slot. `false` means a fetch is running.
  fn begin_fetch(&self) -> bool {
    self
      .in_flight
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_ok()
  }

  fn end_fetch(&self) {
    self.in_flight.store(false, Ordering::SeqCst);
  }
}

// ─── Merge helpers ───────────────────────────────────────────────────────────

/// Append `incoming` to `existing`, dropping records whose id is already
/// materialised. Returns the number actually appended.
fn merge_append(existing: &mut Vec<Review>, incoming: Vec<Review>) -> usize {
  let mut seen: std::collections::HashSet<uuid::Uuid> =
    existing.iter().map(|r| r.review_id).collect();
  let mut appended = 0;
  for review in incoming {
    if seen.insert(review.review_id) {
      existing.push(review);
      appended += 1;
    }
  }
  appended
}

/// Drop duplicate ids, keeping first occurrences in order.
fn dedup_by_id(reviews: Vec<Review>) -> Vec<Review> {
  let mut out = Vec::with_capacity(reviews.len());
  merge_append(&mut out, reviews);
  out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
