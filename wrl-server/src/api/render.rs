//! HTML page rendering
//!
//! Pages are assembled with `format!`. Every value that came from a user or
//! a provider passes through `html_escape` before it is interpolated.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use std::collections::BTreeMap;
use wrl_common::{MediaType, SavedEntry};

use crate::providers::CatalogItem;
use crate::search::ResultBundle;

/// Navigation tab highlighted in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Search,
    List,
}

const STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #1a1a1a; color: #e0e0e0; line-height: 1.6; }
        header { background-color: #2a2a2a; border-bottom: 1px solid #3a3a3a; padding: 16px 20px; display: flex; justify-content: space-between; align-items: center; }
        header h1 { font-size: 24px; color: #4a9eff; }
        nav a { color: #888; margin-left: 16px; text-decoration: none; }
        nav a.active { color: #4a9eff; font-weight: 600; }
        main { padding: 20px; }
        form.search { display: flex; gap: 8px; margin-bottom: 24px; }
        form.search input[type=text] { flex: 1; padding: 8px; background: #2a2a2a; color: #e0e0e0; border: 1px solid #3a3a3a; border-radius: 4px; }
        button { padding: 6px 12px; background: #4a9eff; color: #fff; border: none; border-radius: 4px; cursor: pointer; }
        section { margin-bottom: 28px; }
        section h2 { font-size: 18px; color: #4a9eff; margin-bottom: 10px; }
        .items { display: grid; grid-template-columns: repeat(auto-fill, minmax(220px, 1fr)); gap: 12px; }
        .item { background: #2a2a2a; border: 1px solid #3a3a3a; border-radius: 6px; padding: 10px; }
        .item img { width: 64px; height: 64px; object-fit: cover; float: left; margin-right: 10px; }
        .item .subtitle { color: #888; font-size: 13px; }
        .item form { clear: both; margin-top: 8px; }
        .unavailable, .empty { color: #888; font-style: italic; }
"#;

/// Common page frame
pub fn layout(title: &str, active: Page, body: &str) -> String {
    let nav_class = |page: Page| if page == active { "active" } else { "" };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Watch Read Listen</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <h1>Watch Read Listen</h1>
        <nav>
            <a href="/" class="{home}">Search</a>
            <a href="/list" class="{list}">My list</a>
        </nav>
    </header>
    <main>
{body}
    </main>
</body>
</html>
"#,
        title = text(title),
        style = STYLE,
        home = nav_class(Page::Home),
        list = nav_class(Page::List),
        body = body,
    )
}

fn search_form(query: &str) -> String {
    format!(
        r#"        <form class="search" action="/search" method="get">
            <input type="text" name="q" value="{}" placeholder="Movie, book or album" autofocus>
            <button type="submit">Search</button>
        </form>"#,
        attr(query)
    )
}

/// GET /
pub fn home_page() -> String {
    layout("Home", Page::Home, &search_form(""))
}

/// One result card with its save form
fn item_card<I: CatalogItem>(item: &I, subtitle: &str) -> String {
    let image = item.image_url().unwrap_or_default();
    let thumbnail = if image.is_empty() {
        String::new()
    } else {
        format!(r#"<img src="{}" alt="">"#, attr(&image))
    };

    format!(
        r#"            <div class="item">
                {thumbnail}
                <a href="{link}">{title}</a>
                <div class="subtitle">{subtitle}</div>
                <form action="/save" method="post">
                    <input type="hidden" name="title" value="{title_attr}">
                    <input type="hidden" name="link" value="{link}">
                    <input type="hidden" name="image_url" value="{image}">
                    <input type="hidden" name="media_type" value="{media_type}">
                    <button type="submit">Save</button>
                </form>
            </div>"#,
        thumbnail = thumbnail,
        link = attr(&item.link()),
        title = text(item.title()),
        title_attr = attr(item.title()),
        subtitle = text(subtitle),
        image = attr(&image),
        media_type = item.media_type(),
    )
}

fn result_section(heading: &str, failed: bool, cards: Vec<String>) -> String {
    let content = if failed {
        r#"<p class="unavailable">This catalog is unavailable right now.</p>"#.to_string()
    } else if cards.is_empty() {
        r#"<p class="empty">No results.</p>"#.to_string()
    } else {
        format!("<div class=\"items\">\n{}\n        </div>", cards.join("\n"))
    };

    format!(
        "        <section>\n            <h2>{}</h2>\n            {}\n        </section>",
        text(heading),
        content
    )
}

fn with_year(prefix: String, year: Option<String>) -> String {
    match (prefix.is_empty(), year) {
        (_, None) => prefix,
        (true, Some(year)) => year,
        (false, Some(year)) => format!("{} ({})", prefix, year),
    }
}

/// GET /search/:query
pub fn search_page(bundle: &ResultBundle) -> String {
    let movies = bundle
        .movies()
        .iter()
        .map(|m| item_card(m, &m.year))
        .collect();
    let books = bundle
        .books()
        .iter()
        .map(|b| {
            let year = b.first_publish_year.map(|y| y.to_string());
            item_card(b, &with_year(b.author_line(), year))
        })
        .collect();
    let albums = bundle
        .albums()
        .iter()
        .map(|a| {
            let year = a.release_date.as_ref().map(|d| d.chars().take(4).collect());
            item_card(a, &with_year(a.artist_line(), year))
        })
        .collect();

    let body = [
        search_form(&bundle.query),
        result_section("Movies", !bundle.movies.is_completed(), movies),
        result_section("Books", !bundle.books.is_completed(), books),
        result_section("Albums", !bundle.albums.is_completed(), albums),
    ]
    .join("\n");

    layout(&format!("Results for {}", bundle.query), Page::Search, &body)
}

fn entry_card(entry: &SavedEntry) -> String {
    let thumbnail = if entry.image_url.is_empty() {
        String::new()
    } else {
        format!(r#"<img src="{}" alt="">"#, attr(&entry.image_url))
    };

    format!(
        r#"            <div class="item">
                {thumbnail}
                <a href="{link}">{title}</a>
                <div class="subtitle">saved {saved_at}</div>
                <form action="/remove" method="post">
                    <input type="hidden" name="id" value="{id}">
                    <button type="submit">Remove</button>
                </form>
            </div>"#,
        thumbnail = thumbnail,
        link = attr(&entry.link),
        title = text(&entry.title),
        saved_at = entry.saved_at.format("%Y-%m-%d"),
        id = attr(&entry.id),
    )
}

/// GET /list
pub fn list_page(groups: &BTreeMap<MediaType, Vec<SavedEntry>>) -> String {
    let body = if groups.is_empty() {
        r#"        <p class="empty">Nothing saved yet. <a href="/">Search</a> for something to watch, read or listen to.</p>"#
            .to_string()
    } else {
        MediaType::ALL
            .iter()
            .filter_map(|media_type| {
                let entries = groups.get(media_type)?;
                Some(result_section(
                    media_type.label(),
                    false,
                    entries.iter().map(entry_card).collect(),
                ))
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    layout("My list", Page::List, &body)
}
