//! Fan-out search across the movie, book and music catalogs
//!
//! One query is dispatched to all three providers at once. Each branch owns
//! its own copy of the query and a handle to its provider, normalizes item
//! titles, and fills only its own slot of the [`ResultBundle`]. The caller
//! gets the bundle once every branch has completed or failed; a failed
//! provider leaves an empty slot plus a logged [`ProviderSearchFailed`].

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::fanout::{BranchOutcome, FanOut, ProviderSearchFailed};
use crate::providers::{Album, Book, CatalogItem, CatalogProvider, Movie};

/// Titles shorter than this are shown unchanged
pub const MAX_TITLE_CHARS: usize = 60;
/// Appended to a title cut at [`MAX_TITLE_CHARS`]
pub const TRUNCATION_SUFFIX: &str = "...";

/// Shorten a display title
///
/// Titles with fewer than 60 characters are returned unchanged. Longer ones
/// keep their first 60 characters followed by `...`, so the result may be
/// up to 63 characters long. Length is counted in `char`s.
pub fn truncate_title(title: &str) -> String {
    if title.chars().count() < MAX_TITLE_CHARS {
        return title.to_string();
    }

    let cut = title
        .char_indices()
        .nth(MAX_TITLE_CHARS)
        .map(|(idx, _)| idx)
        .unwrap_or(title.len());
    format!("{}{}", &title[..cut], TRUNCATION_SUFFIX)
}

/// Apply [`truncate_title`] to every item, keeping provider order
pub fn normalize_titles<I: CatalogItem>(items: Vec<I>) -> Vec<I> {
    items
        .into_iter()
        .map(|mut item| {
            let title = truncate_title(item.title());
            item.set_title(title);
            item
        })
        .collect()
}

/// Joined output of one search across all three providers
#[derive(Debug, Clone)]
pub struct ResultBundle {
    pub query: String,
    pub movies: BranchOutcome<Vec<Movie>>,
    pub books: BranchOutcome<Vec<Book>>,
    pub albums: BranchOutcome<Vec<Album>>,
}

impl ResultBundle {
    /// Movie results, empty if the movie provider failed
    pub fn movies(&self) -> &[Movie] {
        self.movies.value().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Book results, empty if the book provider failed
    pub fn books(&self) -> &[Book] {
        self.books.value().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Album results, empty if the music provider failed
    pub fn albums(&self) -> &[Album] {
        self.albums.value().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Per-provider failures, in movie/book/album order
    pub fn failures(&self) -> Vec<&ProviderSearchFailed> {
        [self.movies.error(), self.books.error(), self.albums.error()]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl Serialize for ResultBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let errors: BTreeMap<&str, &ProviderSearchFailed> = self
            .failures()
            .into_iter()
            .map(|f| (f.provider, f))
            .collect();

        let mut state = serializer.serialize_struct("ResultBundle", 5)?;
        state.serialize_field("query", &self.query)?;
        state.serialize_field("movies", self.movies())?;
        state.serialize_field("books", self.books())?;
        state.serialize_field("albums", self.albums())?;
        state.serialize_field("errors", &errors)?;
        state.end()
    }
}

/// Searches all three catalogs concurrently
#[derive(Clone)]
pub struct SearchAggregator {
    movies: Arc<dyn CatalogProvider<Item = Movie>>,
    books: Arc<dyn CatalogProvider<Item = Book>>,
    albums: Arc<dyn CatalogProvider<Item = Album>>,
    timeout: Option<Duration>,
}

impl SearchAggregator {
    pub fn new(
        movies: Arc<dyn CatalogProvider<Item = Movie>>,
        books: Arc<dyn CatalogProvider<Item = Book>>,
        albums: Arc<dyn CatalogProvider<Item = Album>>,
    ) -> Self {
        Self {
            movies,
            books,
            albums,
            timeout: None,
        }
    }

    /// Bound each search; providers still running at the deadline fail
    /// with a timeout instead of blocking the caller
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Names of the movie, book and music providers, in that order
    pub fn provider_names(&self) -> [&'static str; 3] {
        [self.movies.name(), self.books.name(), self.albums.name()]
    }

    /// Search all providers and wait for every branch
    pub async fn search(&self, query: &str) -> ResultBundle {
        self.search_with_cancellation(query, CancellationToken::new())
            .await
    }

    /// Like [`search`](Self::search), but branches still running when
    /// `cancel` fires resolve as failed
    pub async fn search_with_cancellation(
        &self,
        query: &str,
        cancel: CancellationToken,
    ) -> ResultBundle {
        let mut fanout = FanOut::new().with_cancellation(cancel);
        if let Some(timeout) = self.timeout {
            fanout = fanout.with_timeout(timeout);
        }

        let movies = spawn_branch(&fanout, Arc::clone(&self.movies), query);
        let books = spawn_branch(&fanout, Arc::clone(&self.books), query);
        let albums = spawn_branch(&fanout, Arc::clone(&self.albums), query);

        let (movies, books, albums) = tokio::join!(movies.join(), books.join(), albums.join());

        let bundle = ResultBundle {
            query: query.to_string(),
            movies,
            books,
            albums,
        };

        info!(
            query = %query,
            movies = bundle.movies().len(),
            books = bundle.books().len(),
            albums = bundle.albums().len(),
            failed = bundle.failures().len(),
            "Search complete"
        );

        bundle
    }
}

/// Start one provider branch with its own owned copy of the query
fn spawn_branch<I: CatalogItem>(
    fanout: &FanOut,
    provider: Arc<dyn CatalogProvider<Item = I>>,
    query: &str,
) -> crate::fanout::Branch<Vec<I>> {
    let query = query.to_owned();
    let name = provider.name();
    fanout.spawn(name, async move {
        provider.search(&query).await.map(normalize_titles)
    })
}
