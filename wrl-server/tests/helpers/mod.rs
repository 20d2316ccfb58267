//! Shared test fixtures: stub catalog providers and sample items
//!
//! Each test binary uses a different subset.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wrl_server::providers::{
    Album, Book, CatalogItem, CatalogProvider, Movie, ProviderError,
};
use wrl_server::SearchAggregator;

type Respond<T> = Box<dyn Fn(&str) -> Result<Vec<T>, ProviderError> + Send + Sync>;

/// In-process provider with scripted answers
pub struct StubProvider<T> {
    name: &'static str,
    respond: Respond<T>,
    delay: Duration,
    finished: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl<T: CatalogItem + Clone> StubProvider<T> {
    /// Always answers with `items`
    pub fn returning(name: &'static str, items: Vec<T>) -> Self {
        Self::with_fn(name, move |_| Ok(items.clone()))
    }
}

impl<T: CatalogItem> StubProvider<T> {
    /// Always fails with an API error
    pub fn failing(name: &'static str) -> Self {
        Self::with_fn(name, |_| {
            Err(ProviderError::Api(503, "service unavailable".to_string()))
        })
    }

    /// Answer computed from the query
    pub fn with_fn<F>(name: &'static str, respond: F) -> Self
    where
        F: Fn(&str) -> Result<Vec<T>, ProviderError> + Send + Sync + 'static,
    {
        Self {
            name,
            respond: Box::new(respond),
            delay: Duration::ZERO,
            finished: Arc::new(AtomicBool::new(false)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set once a search has run to completion
    pub fn finished_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.finished)
    }

    /// Number of searches started
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl<T: CatalogItem> CatalogProvider for StubProvider<T> {
    type Item = T;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn search(&self, query: &str) -> Result<Vec<T>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = (self.respond)(query);
        self.finished.store(true, Ordering::SeqCst);
        result
    }
}

pub fn movie(title: &str, imdb_id: &str) -> Movie {
    Movie {
        title: title.to_string(),
        year: "2021".to_string(),
        imdb_id: imdb_id.to_string(),
        kind: "movie".to_string(),
        poster: Some(format!("https://img.example.com/{}.jpg", imdb_id)),
    }
}

pub fn book(title: &str, key: &str) -> Book {
    Book {
        key: key.to_string(),
        title: title.to_string(),
        authors: vec!["Frank Herbert".to_string()],
        first_publish_year: Some(1965),
        cover_id: Some(11481354),
    }
}

pub fn album(title: &str, id: &str) -> Album {
    Album {
        id: id.to_string(),
        name: title.to_string(),
        artists: Vec::new(),
        images: Vec::new(),
        external_urls: Default::default(),
        release_date: Some("2021-09-17".to_string()),
    }
}

/// Aggregator answering the "dune" example: two movies, one book, no albums
pub fn dune_aggregator() -> SearchAggregator {
    let movies = StubProvider::returning(
        "omdb",
        vec![movie("Dune", "tt1160419"), movie("Dune", "tt0087182")],
    );
    let books = StubProvider::returning("open_library", vec![book("Dune", "/works/OL893415W")]);
    let albums = StubProvider::<Album>::returning("spotify", Vec::new());

    SearchAggregator::new(Arc::new(movies), Arc::new(books), Arc::new(albums))
}
