//! The shopping state store
//!
//! An observable, in-memory container for cart, favorites, catalog, and
//! theme state. Mutations are synchronous, total, and atomic per call;
//! unknown ids degrade to no-ops rather than errors. Every mutation
//! installs a fresh snapshot `Arc`, so views can detect changes by
//! reference comparison. Persistence runs on a background task fed with
//! coalesced snapshots and never blocks a mutation.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot, watch};

use crate::badge::BadgeDisplay;
use crate::models::{CartItem, Category, Product, Theme};
use crate::snapshot::{SnapshotStorage, StoreSnapshot};

/// Events broadcast when a region of the state changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Cart contents or quantities changed
    CartChanged,
    /// Favorites changed
    FavoritesChanged,
    /// Products or categories were replaced by the data loader
    CatalogReplaced,
    /// Theme preference changed
    ThemeChanged,
}

/// In-memory state, handed out as immutable snapshots
///
/// Callers obtain an `Arc<StoreState>` from [`ShoppingStore::state`] (or a
/// watch subscription) and must treat it as read-only; all mutation goes
/// through [`ShoppingStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Cart contents, at most one entry per product id
    pub cart_items: Vec<CartItem>,
    /// Favorite products, unique by id, insertion order preserved
    pub favorites: Vec<Product>,
    /// Catalog products in load order
    pub products: Vec<Product>,
    /// Catalog categories in load order
    pub categories: Vec<Category>,
    /// Theme preference
    pub theme: Theme,
}

impl StoreState {
    /// Sum of price times quantity over the cart
    pub fn cart_total(&self) -> f64 {
        self.cart_items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities over the cart, not the distinct product count
    pub fn cart_item_count(&self) -> u32 {
        self.cart_items.iter().map(|item| item.quantity).sum()
    }

    /// Whether any favorite has the given product id
    pub fn is_favorite(&self, product_id: &str) -> bool {
        self.favorites.iter().any(|p| p.id == product_id)
    }

    /// Products whose category matches, in load order
    pub fn products_by_category(&self, category_id: &str) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.category == category_id)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search over name, description, and category
    ///
    /// The empty query matches every product.
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Extract the persisted subset
    pub fn to_snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            cart_items: self.cart_items.clone(),
            favorites: self.favorites.clone(),
            theme: self.theme,
        }
    }

    /// Restore the persisted subset, leaving the catalog untouched
    pub fn apply_snapshot(&mut self, snapshot: StoreSnapshot) {
        self.cart_items = snapshot.cart_items;
        self.favorites = snapshot.favorites;
        self.theme = snapshot.theme;
    }
}

/// Latest snapshot pending persistence, tagged with its revision
type PersistJob = Option<(u64, StoreSnapshot)>;

/// Observable shopping state store
///
/// All mutation entry points live on this one type, so each call is atomic
/// from the caller's perspective. Mutations never fail and never suspend;
/// only the snapshot writer spawned by [`attach_persistence`] is async.
///
/// [`attach_persistence`]: ShoppingStore::attach_persistence
///
/// # Example
///
/// ```
/// use app_state::{Product, ShoppingStore};
///
/// let store = ShoppingStore::new();
/// let product = Product {
///     id: "p1".to_string(),
///     name: "Wireless Headphones".to_string(),
///     price: 99.99,
///     image: "https://example.com/headphones.jpg".to_string(),
///     description: "Over-ear, noise cancelling".to_string(),
///     category: "electronics".to_string(),
///     rating: 4.5,
///     reviews: 230,
///     original_price: None,
///     discount: None,
/// };
///
/// store.add_to_cart(product.clone());
/// store.add_to_cart(product);
/// assert_eq!(store.cart_item_count(), 2);
/// assert!((store.cart_total() - 199.98).abs() < 1e-9);
/// ```
pub struct ShoppingStore {
    /// Current state; replaced wholesale on every mutation
    state: RwLock<Arc<StoreState>>,
    /// Monotonic revision, incremented once per mutation
    revision: AtomicU64,
    /// Latest state for watch subscribers
    state_tx: watch::Sender<Arc<StoreState>>,
    /// Coarse-grained change events
    events_tx: broadcast::Sender<StoreEvent>,
    /// Latest snapshot pending persistence
    persist_tx: watch::Sender<PersistJob>,
}

impl ShoppingStore {
    /// Create an empty store
    pub fn new() -> Self {
        let initial = Arc::new(StoreState::default());
        let (state_tx, _) = watch::channel(Arc::clone(&initial));
        let (events_tx, _) = broadcast::channel(32);
        let (persist_tx, _) = watch::channel(None);

        ShoppingStore {
            state: RwLock::new(initial),
            revision: AtomicU64::new(0),
            state_tx,
            events_tx,
            persist_tx,
        }
    }

    /// Current state snapshot
    ///
    /// The returned `Arc` changes identity on every mutation, so views can
    /// detect changes with `Arc::ptr_eq`.
    pub fn state(&self) -> Arc<StoreState> {
        Arc::clone(&self.state.read())
    }

    /// Revision of the current state, incremented on every mutation
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Subscribe to state snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<StoreState>> {
        self.state_tx.subscribe()
    }

    /// Subscribe to coarse-grained change events
    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    /// Apply one mutation: clone the state, edit the clone, install it,
    /// and notify subscribers. `persist` is false for catalog updates,
    /// which are not part of the snapshot.
    fn mutate(&self, event: StoreEvent, persist: bool, f: impl FnOnce(&mut StoreState)) {
        let (next, revision) = {
            let mut guard = self.state.write();
            let mut draft = StoreState::clone(&guard);
            f(&mut draft);
            let next = Arc::new(draft);
            *guard = Arc::clone(&next);
            let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
            (next, revision)
        };

        self.state_tx.send_replace(Arc::clone(&next));
        let _ = self.events_tx.send(event);

        if persist {
            self.persist_tx
                .send_replace(Some((revision, next.to_snapshot())));
        }
    }

    // ========== Cart ==========

    /// Add a product to the cart
    ///
    /// An existing line with the same product id has its quantity
    /// incremented by one; otherwise a new line with quantity 1 is added.
    pub fn add_to_cart(&self, product: Product) {
        self.mutate(StoreEvent::CartChanged, true, |state| {
            if let Some(item) = state
                .cart_items
                .iter_mut()
                .find(|item| item.product.id == product.id)
            {
                item.quantity += 1;
            } else {
                state.cart_items.push(CartItem { product, quantity: 1 });
            }
        });
    }

    /// Remove a cart line; no-op when the id is absent
    pub fn remove_from_cart(&self, product_id: &str) {
        self.mutate(StoreEvent::CartChanged, true, |state| {
            state.cart_items.retain(|item| item.product.id != product_id);
        });
    }

    /// Replace the quantity of a cart line
    ///
    /// A quantity of zero or below removes the line, same as
    /// [`remove_from_cart`]; unknown ids are a no-op.
    ///
    /// [`remove_from_cart`]: ShoppingStore::remove_from_cart
    pub fn update_quantity(&self, product_id: &str, quantity: i64) {
        self.mutate(StoreEvent::CartChanged, true, |state| {
            if quantity <= 0 {
                state.cart_items.retain(|item| item.product.id != product_id);
            } else if let Some(item) = state
                .cart_items
                .iter_mut()
                .find(|item| item.product.id == product_id)
            {
                item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
            }
        });
    }

    /// Empty the cart unconditionally
    pub fn clear_cart(&self) {
        self.mutate(StoreEvent::CartChanged, true, |state| {
            state.cart_items.clear();
        });
    }

    /// Sum of price times quantity over the cart; 0 for an empty cart
    pub fn cart_total(&self) -> f64 {
        self.state.read().cart_total()
    }

    /// Sum of quantities over the cart, not the distinct product count
    pub fn cart_item_count(&self) -> u32 {
        self.state.read().cart_item_count()
    }

    /// Cart item count clamped for tab badge display
    pub fn cart_badge(&self) -> BadgeDisplay {
        BadgeDisplay::from_count(self.cart_item_count())
    }

    // ========== Favorites ==========

    /// Add a product to favorites; a second add with the same id is a no-op
    pub fn add_to_favorites(&self, product: Product) {
        self.mutate(StoreEvent::FavoritesChanged, true, |state| {
            if !state.favorites.iter().any(|p| p.id == product.id) {
                state.favorites.push(product);
            }
        });
    }

    /// Remove a product from favorites; no-op when the id is absent
    pub fn remove_from_favorites(&self, product_id: &str) {
        self.mutate(StoreEvent::FavoritesChanged, true, |state| {
            state.favorites.retain(|p| p.id != product_id);
        });
    }

    /// Whether any favorite has the given product id
    pub fn is_favorite(&self, product_id: &str) -> bool {
        self.state.read().is_favorite(product_id)
    }

    // ========== Catalog ==========

    /// Replace the product list wholesale
    ///
    /// Called by the data loader on every start; products are not part of
    /// the persisted snapshot.
    pub fn set_products(&self, products: Vec<Product>) {
        self.mutate(StoreEvent::CatalogReplaced, false, |state| {
            state.products = products;
        });
    }

    /// Replace the category list wholesale
    pub fn set_categories(&self, categories: Vec<Category>) {
        self.mutate(StoreEvent::CatalogReplaced, false, |state| {
            state.categories = categories;
        });
    }

    /// Products whose category matches, in load order
    pub fn products_by_category(&self, category_id: &str) -> Vec<Product> {
        self.state.read().products_by_category(category_id)
    }

    /// Case-insensitive substring search over name, description, and category
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        self.state.read().search_products(query)
    }

    // ========== Theme ==========

    /// Replace the theme preference
    pub fn set_theme(&self, theme: Theme) {
        self.mutate(StoreEvent::ThemeChanged, true, |state| {
            state.theme = theme;
        });
    }

    /// Flip between light and dark
    pub fn toggle_theme(&self) {
        self.mutate(StoreEvent::ThemeChanged, true, |state| {
            state.theme = state.theme.toggled();
        });
    }

    /// Current theme preference
    pub fn theme(&self) -> Theme {
        self.state.read().theme
    }

    // ========== Persistence ==========

    /// Restore the persisted subset from the snapshot backend
    ///
    /// A missing snapshot leaves the defaults in place; a corrupt or
    /// incompatible one is logged and skipped. Never fails: the session
    /// continues in memory either way.
    pub async fn hydrate<S: SnapshotStorage>(&self, backend: &S) {
        match backend.load().await {
            Ok(Some((revision, snapshot))) => {
                let next = {
                    let mut guard = self.state.write();
                    let mut draft = StoreState::clone(&guard);
                    draft.apply_snapshot(snapshot);
                    let next = Arc::new(draft);
                    *guard = Arc::clone(&next);
                    // Resume the revision counter so later writes supersede
                    // the stored snapshot
                    self.revision.store(revision, Ordering::SeqCst);
                    next
                };

                self.state_tx.send_replace(next);
                tracing::debug!("restored persisted state at revision {}", revision);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("failed to restore persisted state: {}", e);
            }
        }
    }

    /// Spawn the background snapshot writer
    ///
    /// The writer always picks up the latest pending snapshot, so bursts
    /// of mutations coalesce into a single write and a slow write can
    /// never clobber newer state. Write failures are logged; persistence
    /// is best-effort. Dropping the returned handle stops the writer.
    pub fn attach_persistence<S>(&self, backend: S) -> PersistenceHandle
    where
        S: SnapshotStorage + 'static,
    {
        let mut jobs = self.persist_tx.subscribe();
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    changed = jobs.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let job = jobs.borrow_and_update().clone();
                        write_snapshot(&backend, job).await;
                    }
                    _ = &mut stop_rx => {
                        // Final drain so the last mutation lands before exit
                        let job = jobs.borrow_and_update().clone();
                        write_snapshot(&backend, job).await;
                        break;
                    }
                }
            }
        });

        PersistenceHandle { stop_tx: Some(stop_tx), handle }
    }
}

impl Default for ShoppingStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_snapshot<S: SnapshotStorage>(backend: &S, job: PersistJob) {
    if let Some((revision, snapshot)) = job {
        match backend.persist(revision, &snapshot).await {
            Ok(true) => tracing::debug!("persisted snapshot at revision {}", revision),
            Ok(false) => {
                tracing::debug!("snapshot at revision {} superseded by newer write", revision)
            }
            Err(e) => tracing::warn!("snapshot write failed at revision {}: {}", revision, e),
        }
    }
}

/// Handle controlling the background snapshot writer
///
/// Dropping the handle requests a stop; [`shutdown`] additionally waits
/// for the final write to land.
///
/// [`shutdown`]: PersistenceHandle::shutdown
pub struct PersistenceHandle {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

impl PersistenceHandle {
    /// Stop the writer and wait for the final drain to complete
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.handle).await;
    }
}

impl Drop for PersistenceHandle {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}
