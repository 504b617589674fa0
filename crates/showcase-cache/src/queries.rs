//! The catalog's reads wired through their caches.

use std::sync::Arc;

use futures::FutureExt;
use showcase_core::{CacheConfig, Category, CategorySlug, Product, ProductId, ProductPage};
use showcase_data::CatalogApi;
use tokio::sync::{broadcast, watch};

use crate::cache::{Fetcher, QueryCache};
use crate::event::{QueryEvent, EVENT_CAPACITY};
use crate::key::QueryKey;
use crate::policy::QueryPolicy;
use crate::state::QueryState;

/// One page of the listing, optionally scoped to a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    pub category: Option<CategorySlug>,
    pub limit: u32,
    pub skip: u32,
}

impl PageRequest {
    /// Create a request. An empty slug means "all categories".
    pub fn new(category: Option<CategorySlug>, limit: u32, skip: u32) -> Self {
        Self {
            category: category.filter(|slug| !slug.is_empty()),
            limit,
            skip,
        }
    }

    /// Cache key for this request.
    pub fn key(&self) -> QueryKey {
        match &self.category {
            Some(slug) => QueryKey::products_by_category(slug, self.limit, self.skip),
            None => QueryKey::products(self.limit, self.skip),
        }
    }
}

/// Cached access to the remote catalog.
///
/// Product pages and single products use the product staleness window,
/// the category list uses the category window. All three caches publish
/// to one event channel.
#[derive(Clone)]
pub struct CatalogQueries {
    api: Arc<dyn CatalogApi>,
    pages: QueryCache<ProductPage>,
    products: QueryCache<Product>,
    categories: QueryCache<Vec<Category>>,
    product_policy: QueryPolicy,
    category_policy: QueryPolicy,
    events: broadcast::Sender<QueryEvent>,
}

impl CatalogQueries {
    /// Wire `api` through caches configured by `config`.
    pub fn new(api: Arc<dyn CatalogApi>, config: &CacheConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            pages: QueryCache::with_events(events.clone()),
            products: QueryCache::with_events(events.clone()),
            categories: QueryCache::with_events(events.clone()),
            product_policy: QueryPolicy::products(config),
            category_policy: QueryPolicy::categories(config),
            events,
        }
    }

    /// Override the policy used for pages and single products.
    pub fn with_product_policy(mut self, policy: QueryPolicy) -> Self {
        self.product_policy = policy;
        self
    }

    /// Override the policy used for the category list.
    pub fn with_category_policy(mut self, policy: QueryPolicy) -> Self {
        self.category_policy = policy;
        self
    }

    /// A page of products.
    pub async fn page(&self, request: &PageRequest) -> QueryState<ProductPage> {
        self.pages
            .query(&request.key(), &self.product_policy, self.page_fetcher(request))
            .await
    }

    /// Force a re-fetch of a page.
    pub async fn refetch_page(&self, request: &PageRequest) -> QueryState<ProductPage> {
        let key = request.key();
        if self.pages.entry_info(&key).is_none() {
            return self.page(request).await;
        }
        self.pages.refetch(&key).await
    }

    /// Watch a page for background updates.
    pub fn subscribe_page(&self, request: &PageRequest) -> watch::Receiver<QueryState<ProductPage>> {
        self.pages.subscribe(&request.key())
    }

    /// Current state of a page without fetching.
    pub fn page_snapshot(&self, request: &PageRequest) -> QueryState<ProductPage> {
        self.pages.snapshot(&request.key())
    }

    /// A single product. Id 0 is treated as "no selection" and never fetched.
    pub async fn product(&self, id: ProductId) -> QueryState<Product> {
        let policy = self.product_policy.clone().with_enabled(id.get() != 0);
        self.products
            .query(&QueryKey::product(id), &policy, self.product_fetcher(id))
            .await
    }

    /// Force a re-fetch of a single product.
    pub async fn refetch_product(&self, id: ProductId) -> QueryState<Product> {
        let key = QueryKey::product(id);
        if self.products.entry_info(&key).is_none() {
            return self.product(id).await;
        }
        self.products.refetch(&key).await
    }

    /// The category list.
    pub async fn categories(&self) -> QueryState<Vec<Category>> {
        self.categories
            .query(&QueryKey::categories(), &self.category_policy, self.categories_fetcher())
            .await
    }

    /// Force a re-fetch of the category list.
    pub async fn refetch_categories(&self) -> QueryState<Vec<Category>> {
        let key = QueryKey::categories();
        if self.categories.entry_info(&key).is_none() {
            return self.categories().await;
        }
        self.categories.refetch(&key).await
    }

    /// Current state of the category list without fetching.
    pub fn categories_snapshot(&self) -> QueryState<Vec<Category>> {
        self.categories.snapshot(&QueryKey::categories())
    }

    /// Subscribe to fetch failures and settlements across all reads.
    pub fn events(&self) -> broadcast::Receiver<QueryEvent> {
        self.events.subscribe()
    }

    /// Window regained focus. Returns the number of re-fetches started.
    pub fn focus(&self) -> usize {
        self.pages.focus() + self.products.focus() + self.categories.focus()
    }

    /// Drop every cached result.
    pub fn clear(&self) {
        self.pages.clear();
        self.products.clear();
        self.categories.clear();
    }

    /// The page cache, for diagnostics.
    pub fn page_cache(&self) -> &QueryCache<ProductPage> {
        &self.pages
    }

    fn page_fetcher(&self, request: &PageRequest) -> Fetcher<ProductPage> {
        let api = Arc::clone(&self.api);
        let request = request.clone();
        Arc::new(move || {
            let api = Arc::clone(&api);
            let request = request.clone();
            async move {
                match &request.category {
                    Some(slug) => {
                        api.list_products_by_category(slug, request.limit, request.skip)
                            .await
                    }
                    None => api.list_products(request.limit, request.skip).await,
                }
            }
            .boxed()
        })
    }

    fn product_fetcher(&self, id: ProductId) -> Fetcher<Product> {
        let api = Arc::clone(&self.api);
        Arc::new(move || {
            let api = Arc::clone(&api);
            async move { api.get_product(id).await }.boxed()
        })
    }

    fn categories_fetcher(&self) -> Fetcher<Vec<Category>> {
        let api = Arc::clone(&self.api);
        Arc::new(move || {
            let api = Arc::clone(&api);
            async move { api.list_categories().await }.boxed()
        })
    }
}
