//! Orchestrator and watcher tests against an in-memory SQLite store and a
//! recording fake gateway.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};

use dinebook_core::{
  gateway::{Ack, RemoteGateway},
  query::Selection,
  restaurant::{Restaurant, RestaurantId},
  review::{MAX_COMMENT_CHARS, NewReview, PendingId, PendingReview, Review, ReviewId},
  store::{LocalStore, Partition},
};
use dinebook_store_sqlite::SqliteStore;
use tokio::sync::{Notify, Semaphore, mpsc};

use crate::{
  Directory, NetworkState, ReplayReport, SubmitOutcome, SyncConfig, SyncError,
};

// ─── Fake gateway ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
  FetchRestaurants,
  FetchReviews(RestaurantId),
  PostReview(String),
  SetFavorite(RestaurantId, bool),
}

#[derive(Debug, thiserror::Error)]
#[error("origin unreachable")]
struct Unreachable;

#[derive(Default)]
struct FakeGateway {
  restaurants:   Vec<Restaurant>,
  reviews:       Vec<Review>,
  calls:         Mutex<Vec<Call>>,
  /// Every call fails while set.
  down:          AtomicBool,
  /// Posts by this reviewer fail.
  reject_name:   Mutex<Option<String>>,
  next_id:       AtomicI64,
  /// When present, each post waits for a permit before answering.
  gate:          Option<Arc<Semaphore>>,
  /// Notified whenever a post starts.
  entered:       Notify,
  in_flight:     AtomicUsize,
  max_in_flight: AtomicUsize,
}

impl FakeGateway {
  fn serving(restaurants: Vec<Restaurant>) -> Self {
    Self { restaurants, ..Default::default() }
  }

  fn gated(gate: Arc<Semaphore>) -> Self { Self { gate: Some(gate), ..Default::default() } }

  fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  fn posts(&self) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::PostReview(name) => Some(name),
        _ => None,
      })
      .collect()
  }

  fn record(&self, call: Call) { self.calls.lock().unwrap().push(call); }

  fn set_down(&self, down: bool) { self.down.store(down, Ordering::SeqCst); }

  fn reject(&self, name: Option<&str>) {
    *self.reject_name.lock().unwrap() = name.map(str::to_owned);
  }

  fn check(&self) -> Result<(), Unreachable> {
    if self.down.load(Ordering::SeqCst) { Err(Unreachable) } else { Ok(()) }
  }
}

impl RemoteGateway for FakeGateway {
  type Error = Unreachable;

  async fn fetch_restaurants(&self) -> Result<Vec<Restaurant>, Unreachable> {
    self.record(Call::FetchRestaurants);
    self.check()?;
    Ok(self.restaurants.clone())
  }

  async fn fetch_reviews(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>, Unreachable> {
    self.record(Call::FetchReviews(restaurant_id));
    self.check()?;
    Ok(
      self
        .reviews
        .iter()
        .filter(|r| r.restaurant_id == restaurant_id)
        .cloned()
        .collect(),
    )
  }

  async fn post_review(&self, review: &NewReview) -> Result<Review, Unreachable> {
    self.record(Call::PostReview(review.name.clone()));
    let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    self.max_in_flight.fetch_max(now, Ordering::SeqCst);
    self.entered.notify_one();

    if let Some(gate) = &self.gate {
      gate.acquire().await.unwrap().forget();
    }
    self.in_flight.fetch_sub(1, Ordering::SeqCst);

    self.check()?;
    let rejected = self.reject_name.lock().unwrap().as_deref() == Some(review.name.as_str());
    if rejected {
      return Err(Unreachable);
    }
    let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    Ok(Review { id: Some(ReviewId(id)), ..Review::from(review.clone()) })
  }

  async fn set_favorite(
    &self,
    restaurant_id: RestaurantId,
    is_favorite: bool,
  ) -> Result<Ack, Unreachable> {
    self.record(Call::SetFavorite(restaurant_id, is_favorite));
    self.check()?;
    Ok(Ack)
  }
}

// ─── Flaky store ─────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error("injected store failure")]
  Injected,
  #[error(transparent)]
  Store(#[from] dinebook_store_sqlite::Error),
}

/// A [`SqliteStore`] whose next `remove_pending` can be made to fail.
struct FlakyStore {
  inner:       SqliteStore,
  fail_remove: AtomicBool,
}

impl LocalStore for FlakyStore {
  type Error = FlakyError;

  async fn schema_version(&self) -> Result<u32, FlakyError> {
    Ok(self.inner.schema_version().await?)
  }

  async fn all_restaurants(&self) -> Result<Vec<Restaurant>, FlakyError> {
    Ok(self.inner.all_restaurants().await?)
  }

  async fn get_restaurant(&self, id: RestaurantId) -> Result<Option<Restaurant>, FlakyError> {
    Ok(self.inner.get_restaurant(id).await?)
  }

  async fn put_restaurant(&self, restaurant: &Restaurant) -> Result<(), FlakyError> {
    Ok(self.inner.put_restaurant(restaurant).await?)
  }

  async fn put_restaurants(&self, restaurants: &[Restaurant]) -> Result<(), FlakyError> {
    Ok(self.inner.put_restaurants(restaurants).await?)
  }

  async fn all_reviews(&self) -> Result<Vec<Review>, FlakyError> {
    Ok(self.inner.all_reviews().await?)
  }

  async fn reviews_for(&self, restaurant_id: RestaurantId) -> Result<Vec<Review>, FlakyError> {
    Ok(self.inner.reviews_for(restaurant_id).await?)
  }

  async fn put_review(&self, review: &Review) -> Result<(), FlakyError> {
    Ok(self.inner.put_review(review).await?)
  }

  async fn put_reviews(&self, reviews: &[Review]) -> Result<(), FlakyError> {
    Ok(self.inner.put_reviews(reviews).await?)
  }

  async fn pending_reviews(&self) -> Result<Vec<PendingReview>, FlakyError> {
    Ok(self.inner.pending_reviews().await?)
  }

  async fn put_pending(&self, review: &NewReview) -> Result<PendingReview, FlakyError> {
    Ok(self.inner.put_pending(review).await?)
  }

  async fn remove_pending(&self, ids: &[PendingId]) -> Result<(), FlakyError> {
    if self.fail_remove.swap(false, Ordering::SeqCst) {
      return Err(FlakyError::Injected);
    }
    Ok(self.inner.remove_pending(ids).await?)
  }

  async fn clear(&self, partition: Partition) -> Result<(), FlakyError> {
    Ok(self.inner.clear(partition).await?)
  }
}

// ─── Harness ─────────────────────────────────────────────────────────────────

struct Harness {
  store:     Arc<SqliteStore>,
  gateway:   Arc<FakeGateway>,
  directory: Directory<SqliteStore, FakeGateway>,
}

async fn harness_with(
  initial: NetworkState,
  gateway: FakeGateway,
  config: SyncConfig,
) -> Harness {
  let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
  let gateway = Arc::new(gateway);
  let directory = Directory::new(store.clone(), gateway.clone(), initial, config);
  Harness { store, gateway, directory }
}

async fn harness(initial: NetworkState, gateway: FakeGateway) -> Harness {
  harness_with(initial, gateway, SyncConfig::default()).await
}

fn catalog() -> Vec<Restaurant> {
  vec![
    Restaurant::new(RestaurantId(1), "Mission Chinese Food", "Asian", "Manhattan"),
    Restaurant::new(RestaurantId(2), "Emily", "Pizza", "Brooklyn"),
    Restaurant::new(RestaurantId(3), "Kang Ho Dong Baekjeong", "Asian", "Manhattan"),
    Restaurant::new(RestaurantId(4), "Katz's Delicatessen", "American", "Manhattan"),
    Restaurant::new(RestaurantId(5), "Roberta's Pizza", "Pizza", "Brooklyn"),
  ]
}

impl Harness {
  async fn seed_restaurant(&self, id: i64) {
    let r = Restaurant::new(RestaurantId(id), format!("R{id}"), "Pizza", "Brooklyn");
    self.store.put_restaurant(&r).await.unwrap();
  }

  async fn submit(&self, name: &str) -> SubmitOutcome {
    self
      .directory
      .submit_review(RestaurantId(1), name, 4, "fine")
      .await
      .unwrap()
  }

  async fn pending_names(&self) -> Vec<String> {
    self
      .directory
      .pending_reviews()
      .await
      .unwrap()
      .into_iter()
      .map(|p| p.review.name)
      .collect()
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_fetches_and_writes_through() {
  let h = harness(
    NetworkState::Online,
    FakeGateway::serving(vec![Restaurant::new(RestaurantId(1), "One", "Pizza", "Queens")]),
  )
  .await;

  let fetched = h.directory.fetch_restaurants().await.unwrap();
  assert_eq!(fetched.len(), 1);
  assert_eq!(fetched[0].id, RestaurantId(1));

  let stored = h.store.all_restaurants().await.unwrap();
  assert_eq!(stored, fetched);
  assert_eq!(h.gateway.calls(), vec![Call::FetchRestaurants]);
}

#[tokio::test]
async fn cached_restaurants_never_touch_the_network() {
  let h = harness(NetworkState::Online, FakeGateway::serving(catalog())).await;
  h.seed_restaurant(42).await;

  for _ in 0..3 {
    let restaurants = h.directory.fetch_restaurants().await.unwrap();
    assert_eq!(restaurants.len(), 1);
    assert_eq!(restaurants[0].id, RestaurantId(42));
  }
  assert!(h.gateway.calls().is_empty());

  h.store.clear(Partition::Restaurants).await.unwrap();
  let restaurants = h.directory.fetch_restaurants().await.unwrap();
  assert_eq!(restaurants.len(), 5);
  assert_eq!(h.gateway.calls(), vec![Call::FetchRestaurants]);
}

#[tokio::test]
async fn failed_fetch_is_a_network_error_without_side_effects() {
  let gateway = FakeGateway::serving(catalog());
  gateway.set_down(true);
  let h = harness(NetworkState::Online, gateway).await;

  let err = h.directory.fetch_restaurants().await.unwrap_err();
  assert!(err.is_network());
  assert!(h.store.all_restaurants().await.unwrap().is_empty());
}

#[tokio::test]
async fn reviews_are_cache_first_per_restaurant() {
  let gateway = FakeGateway {
    reviews: vec![
      Review {
        id: Some(ReviewId(1)),
        ..Review::from(NewReview::new(RestaurantId(1), "Steve", 4, "good").unwrap())
      },
      Review {
        id: Some(ReviewId(2)),
        ..Review::from(NewReview::new(RestaurantId(2), "Morgan", 5, "great").unwrap())
      },
    ],
    ..Default::default()
  };
  let h = harness(NetworkState::Online, gateway).await;

  let first = h.directory.fetch_reviews(RestaurantId(1)).await.unwrap();
  assert_eq!(first.len(), 1);
  assert_eq!(first[0].name, "Steve");

  let again = h.directory.fetch_reviews(RestaurantId(1)).await.unwrap();
  assert_eq!(again, first);
  assert_eq!(h.gateway.calls(), vec![Call::FetchReviews(RestaurantId(1))]);

  // Another restaurant is still a miss.
  h.directory.fetch_reviews(RestaurantId(2)).await.unwrap();
  assert_eq!(h.gateway.calls().len(), 2);
  assert_eq!(h.store.all_reviews().await.unwrap().len(), 2);
}

#[tokio::test]
async fn query_helpers_run_over_the_cache() {
  let h = harness(NetworkState::Online, FakeGateway::serving(catalog())).await;
  let d = &h.directory;

  let all = d
    .fetch_restaurants_by_cuisine_and_neighborhood(&Selection::All, &Selection::All)
    .await
    .unwrap();
  assert_eq!(all.len(), 5);

  let pizza_brooklyn = d
    .fetch_restaurants_by_cuisine_and_neighborhood(
      &Selection::only("Pizza"),
      &Selection::only("Brooklyn"),
    )
    .await
    .unwrap();
  let ids: Vec<_> = pizza_brooklyn.iter().map(|r| r.id.0).collect();
  assert_eq!(ids, vec![2, 5]);

  assert_eq!(d.fetch_restaurants_by_cuisine("Asian").await.unwrap().len(), 2);
  assert_eq!(d.fetch_restaurants_by_neighborhood("Manhattan").await.unwrap().len(), 3);
  assert_eq!(d.fetch_cuisines().await.unwrap(), vec!["Asian", "Pizza", "American"]);
  assert_eq!(d.fetch_neighborhoods().await.unwrap(), vec!["Manhattan", "Brooklyn"]);

  assert_eq!(d.fetch_restaurant_by_id(RestaurantId(4)).await.unwrap().name, "Katz's Delicatessen");
  assert!(matches!(
    d.fetch_restaurant_by_id(RestaurantId(99)).await,
    Err(SyncError::NotFound(RestaurantId(99)))
  ));

  // Only the first read reached the origin.
  assert_eq!(h.gateway.calls(), vec![Call::FetchRestaurants]);
}

// ─── Submissions ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn offline_submit_is_stored_and_queued_without_network() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;

  let outcome = h.submit("Ann").await;
  let SubmitOutcome::Queued(pending) = outcome else {
    panic!("expected Queued, got {outcome:?}");
  };
  assert_eq!(pending.review.name, "Ann");

  let confirmed = h.store.reviews_for(RestaurantId(1)).await.unwrap();
  assert_eq!(confirmed.len(), 1);
  assert_eq!(confirmed[0].id, None);
  assert_eq!(h.pending_names().await, vec!["Ann"]);
  assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn online_submit_posts_without_queueing() {
  let h = harness(NetworkState::Online, FakeGateway::default()).await;
  h.seed_restaurant(1).await;

  let outcome = h.submit("Ann").await;
  let SubmitOutcome::Posted(created) = outcome else {
    panic!("expected Posted, got {outcome:?}");
  };
  assert_eq!(created.id, Some(ReviewId(1)));
  assert_eq!(h.store.reviews_for(RestaurantId(1)).await.unwrap().len(), 1);
  assert!(h.pending_names().await.is_empty());
  assert_eq!(h.gateway.posts(), vec!["Ann"]);
}

#[tokio::test]
async fn failed_online_submit_is_not_demoted_by_default() {
  let gateway = FakeGateway::default();
  gateway.set_down(true);
  let h = harness(NetworkState::Online, gateway).await;
  h.seed_restaurant(1).await;

  let err = h
    .directory
    .submit_review(RestaurantId(1), "Ann", 4, "fine")
    .await
    .unwrap_err();
  assert!(err.is_network());
  assert_eq!(h.store.reviews_for(RestaurantId(1)).await.unwrap().len(), 1);
  assert!(h.pending_names().await.is_empty());
}

#[tokio::test]
async fn failed_online_submit_is_queued_when_demotion_is_on() {
  let gateway = FakeGateway::default();
  gateway.set_down(true);
  let config = SyncConfig { demote_failed_submissions: true };
  let h = harness_with(NetworkState::Online, gateway, config).await;
  h.seed_restaurant(1).await;

  assert!(matches!(h.submit("Ann").await, SubmitOutcome::Queued(_)));
  assert_eq!(h.pending_names().await, vec!["Ann"]);
}

#[tokio::test]
async fn submit_on_cold_cache_resolves_restaurant_from_origin() {
  let h = harness(NetworkState::Online, FakeGateway::serving(catalog())).await;

  let outcome = h
    .directory
    .submit_review(RestaurantId(2), "Ann", 5, "crisp")
    .await
    .unwrap();
  assert!(matches!(outcome, SubmitOutcome::Posted(_)));
  assert_eq!(h.gateway.calls(), vec![
    Call::FetchRestaurants,
    Call::PostReview("Ann".into())
  ]);
  assert_eq!(h.store.all_restaurants().await.unwrap().len(), 5);
  assert_eq!(h.store.reviews_for(RestaurantId(2)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn submit_for_unknown_restaurant_is_not_found() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;

  let err = h
    .directory
    .submit_review(RestaurantId(7), "Ann", 4, "fine")
    .await
    .unwrap_err();
  assert!(matches!(err, SyncError::NotFound(RestaurantId(7))));
  assert!(h.store.all_reviews().await.unwrap().is_empty());
  assert!(h.pending_names().await.is_empty());
}

#[tokio::test]
async fn invalid_rating_is_rejected_before_storage() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;

  let err = h
    .directory
    .submit_review(RestaurantId(1), "Ann", 6, "fine")
    .await
    .unwrap_err();
  assert!(matches!(err, SyncError::Invalid(_)));
  assert!(h.store.all_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn long_comments_are_truncated_before_storage() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;
  let long: String = "é".repeat(200) + &"x".repeat(300);

  h.directory
    .submit_review(RestaurantId(1), "Ann", 3, &long)
    .await
    .unwrap();

  let stored = &h.store.reviews_for(RestaurantId(1)).await.unwrap()[0];
  assert_eq!(stored.comments.chars().count(), MAX_COMMENT_CHARS);
  assert_eq!(stored.comments, long.chars().take(MAX_COMMENT_CHARS).collect::<String>());
  let pending = &h.directory.pending_reviews().await.unwrap()[0];
  assert_eq!(pending.review.comments, stored.comments);
}

// ─── Favorites ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn favorite_is_mirrored_after_ack() {
  let h = harness(NetworkState::Online, FakeGateway::default()).await;
  h.seed_restaurant(1).await;

  let updated = h.directory.set_favorite(RestaurantId(1), true).await.unwrap();
  assert!(updated.unwrap().is_favorite);
  let cached = h.store.get_restaurant(RestaurantId(1)).await.unwrap().unwrap();
  assert!(cached.is_favorite);
  assert_eq!(h.gateway.calls(), vec![Call::SetFavorite(RestaurantId(1), true)]);
}

#[tokio::test]
async fn favorite_without_ack_changes_nothing() {
  let gateway = FakeGateway::default();
  gateway.set_down(true);
  let h = harness(NetworkState::Online, gateway).await;
  h.seed_restaurant(1).await;

  let err = h.directory.set_favorite(RestaurantId(1), true).await.unwrap_err();
  assert!(err.is_network());
  let cached = h.store.get_restaurant(RestaurantId(1)).await.unwrap().unwrap();
  assert!(!cached.is_favorite);
}

#[tokio::test]
async fn favorite_for_uncached_restaurant_is_acknowledged_only() {
  let h = harness(NetworkState::Online, FakeGateway::default()).await;

  let updated = h.directory.set_favorite(RestaurantId(9), true).await.unwrap();
  assert!(updated.is_none());
  assert!(h.store.all_restaurants().await.unwrap().is_empty());
}

// ─── Replay ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reconnect_replays_pending_and_empties_queue() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;
  h.submit("Ann").await;

  let report = h.directory.go_online().await.unwrap();
  assert_eq!(report, Some(ReplayReport { posted: 1, remaining: 0 }));
  assert_eq!(h.gateway.posts(), vec!["Ann"]);
  assert!(h.pending_names().await.is_empty());
  assert_eq!(h.directory.network_state(), NetworkState::Online);
}

#[tokio::test]
async fn replay_preserves_submission_order() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;
  for name in ["a", "b", "c", "d"] {
    h.submit(name).await;
  }

  h.directory.go_online().await.unwrap();
  assert_eq!(h.gateway.posts(), vec!["a", "b", "c", "d"]);
}

#[tokio::test]
async fn repeated_online_signals_replay_once() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;
  h.submit("Ann").await;

  let first = h.directory.go_online().await.unwrap();
  let second = h.directory.go_online().await.unwrap();
  let third = h.directory.go_online().await.unwrap();

  assert!(first.is_some());
  assert_eq!(second, None);
  assert_eq!(third, None);
  assert_eq!(h.gateway.posts().len(), 1);
}

#[tokio::test]
async fn partial_failure_keeps_unsent_entries() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;
  for name in ["a", "b", "c"] {
    h.submit(name).await;
  }
  h.gateway.reject(Some("b"));

  let report = h.directory.go_online().await.unwrap();
  assert_eq!(report, Some(ReplayReport { posted: 1, remaining: 2 }));
  assert_eq!(h.gateway.posts(), vec!["a", "b"]);
  assert_eq!(h.pending_names().await, vec!["b", "c"]);

  h.gateway.reject(None);
  h.directory.go_offline().await.unwrap();
  let report = h.directory.go_online().await.unwrap();
  assert_eq!(report, Some(ReplayReport { posted: 2, remaining: 0 }));
  assert_eq!(h.gateway.posts(), vec!["a", "b", "b", "c"]);
  assert!(h.pending_names().await.is_empty());
}

#[tokio::test]
async fn transition_during_replay_is_coalesced_not_concurrent() {
  let gate = Arc::new(Semaphore::new(0));
  let h = harness(NetworkState::Offline, FakeGateway::gated(gate.clone())).await;
  h.seed_restaurant(1).await;
  h.submit("first").await;

  let replay = h.directory.go_online();
  let interleaved = async {
    // The first replay is now blocked inside its post.
    h.gateway.entered.notified().await;
    h.directory.go_offline().await.unwrap();
    assert!(matches!(h.submit("second").await, SubmitOutcome::Queued(_)));
    let a = h.directory.go_online().await.unwrap();
    h.directory.go_offline().await.unwrap();
    let b = h.directory.go_online().await.unwrap();
    gate.add_permits(2);
    (a, b)
  };

  let (replayed, (a, b)) = tokio::join!(replay, interleaved);

  assert_eq!(a, None);
  assert_eq!(b, None);
  assert_eq!(replayed.unwrap(), Some(ReplayReport { posted: 2, remaining: 0 }));
  assert_eq!(h.gateway.posts(), vec!["first", "second"]);
  assert_eq!(h.gateway.max_in_flight.load(Ordering::SeqCst), 1);
  assert!(h.pending_names().await.is_empty());
}

#[tokio::test]
async fn run_drives_transitions_from_a_channel() {
  let h = harness(NetworkState::Offline, FakeGateway::default()).await;
  h.seed_restaurant(1).await;
  h.submit("Ann").await;

  let (tx, rx) = mpsc::channel(8);
  for state in [
    NetworkState::Online,
    NetworkState::Online,
    NetworkState::Offline,
    NetworkState::Online,
  ] {
    tx.send(state).await.unwrap();
  }
  drop(tx);

  h.directory.run_connectivity(rx).await;

  assert_eq!(h.gateway.posts(), vec!["Ann"]);
  assert!(h.pending_names().await.is_empty());
  assert_eq!(h.directory.network_state(), NetworkState::Online);
}

#[tokio::test]
async fn flush_with_nothing_pending_is_a_no_op() {
  let h = harness(NetworkState::Online, FakeGateway::default()).await;
  let report = h.directory.flush_pending().await.unwrap();
  assert_eq!(report, Some(ReplayReport::default()));
  assert!(h.gateway.calls().is_empty());
}

#[tokio::test]
async fn manual_flush_during_replay_does_not_post_twice() {
  let gate = Arc::new(Semaphore::new(0));
  let h = harness(NetworkState::Offline, FakeGateway::gated(gate.clone())).await;
  h.seed_restaurant(1).await;
  h.submit("first").await;

  let replay = h.directory.go_online();
  let manual = async {
    h.gateway.entered.notified().await;
    let flushed = h.directory.flush_pending().await.unwrap();
    gate.add_permits(1);
    flushed
  };

  let (replayed, flushed) = tokio::join!(replay, manual);

  assert_eq!(flushed, None);
  assert_eq!(replayed.unwrap(), Some(ReplayReport { posted: 1, remaining: 0 }));
  assert_eq!(h.gateway.posts(), vec!["first"]);
  assert_eq!(h.gateway.max_in_flight.load(Ordering::SeqCst), 1);
  assert!(h.pending_names().await.is_empty());
}

#[tokio::test]
async fn failed_pass_still_runs_queued_follow_up() {
  let gate = Arc::new(Semaphore::new(0));
  let store = Arc::new(FlakyStore {
    inner:       SqliteStore::open_in_memory().await.unwrap(),
    fail_remove: AtomicBool::new(false),
  });
  let gateway = Arc::new(FakeGateway::gated(gate.clone()));
  let directory =
    Directory::new(store.clone(), gateway.clone(), NetworkState::Offline, SyncConfig::default());

  store
    .put_restaurant(&Restaurant::new(RestaurantId(1), "R1", "Pizza", "Brooklyn"))
    .await
    .unwrap();
  directory.submit_review(RestaurantId(1), "first", 4, "").await.unwrap();
  store.fail_remove.store(true, Ordering::SeqCst);

  let replay = directory.go_online();
  let interleaved = async {
    gateway.entered.notified().await;
    directory.go_offline().await.unwrap();
    directory.submit_review(RestaurantId(1), "second", 4, "").await.unwrap();
    let queued = directory.go_online().await.unwrap();
    gate.add_permits(3);
    queued
  };

  let (replayed, queued) = tokio::join!(replay, interleaved);

  assert_eq!(queued, None);
  // The first pass failed to drop its delivered entry, so the follow-up
  // delivers it again along with the newcomer.
  assert_eq!(replayed.unwrap(), Some(ReplayReport { posted: 2, remaining: 0 }));
  assert_eq!(gateway.posts(), vec!["first", "first", "second"]);
  assert!(store.pending_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_pass_without_follow_up_reports_the_error() {
  let store = Arc::new(FlakyStore {
    inner:       SqliteStore::open_in_memory().await.unwrap(),
    fail_remove: AtomicBool::new(false),
  });
  let gateway = Arc::new(FakeGateway::default());
  let directory =
    Directory::new(store.clone(), gateway.clone(), NetworkState::Offline, SyncConfig::default());
  store
    .put_restaurant(&Restaurant::new(RestaurantId(1), "R1", "Pizza", "Brooklyn"))
    .await
    .unwrap();
  directory.submit_review(RestaurantId(1), "first", 4, "").await.unwrap();
  store.fail_remove.store(true, Ordering::SeqCst);

  let err = directory.go_online().await.unwrap_err();
  assert!(matches!(err, SyncError::Store(_)));
  assert_eq!(store.pending_reviews().await.unwrap().len(), 1);

  // The gate is free again: an explicit flush delivers the entry.
  let report = directory.flush_pending().await.unwrap();
  assert_eq!(report, Some(ReplayReport { posted: 1, remaining: 0 }));
}
