use super::{send_checked, BookSource, UpstreamError, MAX_RESULTS_PER_SOURCE};
use crate::models::responses::{BookResult, SourceKind};
use async_trait::async_trait;
use reqwest::Client;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};
use url::Url;

pub const GUTENBERG_BASE_URL: &str = "https://www.gutenberg.org";

/// Project Gutenberg's HTML search page.
pub struct GutenbergSource {
    base_url: Url,
}

struct Selectors {
    item: Selector,
    title: Selector,
    subtitle: Selector,
    link: Selector,
}

static SELECTORS: Lazy<Selectors> = Lazy::new(|| Selectors {
    item: Selector::parse("li.booklink").expect("valid booklink selector"),
    title: Selector::parse(".title").expect("valid title selector"),
    subtitle: Selector::parse(".subtitle").expect("valid subtitle selector"),
    link: Selector::parse("a.link").expect("valid link selector"),
});

impl GutenbergSource {
    /// `base_url` may carry a path prefix, e.g. a mirror under `/gutenberg`.
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { base_url })
    }

    fn search_url(&self) -> Result<Url, UpstreamError> {
        self.base_url
            .join("ebooks/search/")
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }

    /// Extracts up to [`MAX_RESULTS_PER_SOURCE`] books from a search page.
    pub fn parse_results(&self, html: &str) -> Vec<BookResult> {
        let selectors = &*SELECTORS;
        let document = Html::parse_document(html);

        document
            .select(&selectors.item)
            .filter_map(|item| self.parse_item(item, selectors))
            .take(MAX_RESULTS_PER_SOURCE)
            .collect()
    }

    fn parse_item(&self, item: ElementRef<'_>, selectors: &Selectors) -> Option<BookResult> {
        let title = item.select(&selectors.title).next().map(element_text);
        let title = match title {
            Some(title) if !title.is_empty() => title,
            _ => {
                debug!("Skipping Gutenberg item without a title");
                return None;
            }
        };

        let author = item
            .select(&selectors.subtitle)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let href = item
            .select(&selectors.link)
            .next()
            .and_then(|link| link.value().attr("href"));
        let url = match href.map(|href| self.base_url.join(href)) {
            Some(Ok(url)) => url,
            _ => {
                debug!("Skipping Gutenberg item '{}' without a usable link", title);
                return None;
            }
        };

        Some(BookResult::new(
            SourceKind::ProjectGutenberg,
            title,
            author,
            url.to_string(),
            None,
        ))
    }
}

/// Text content with runs of whitespace collapsed.
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl BookSource for GutenbergSource {
    fn kind(&self) -> SourceKind {
        SourceKind::ProjectGutenberg
    }

    async fn fetch(&self, client: &Client, query: &str) -> Result<Vec<BookResult>, UpstreamError> {
        let url = self.search_url()?;
        info!("Searching Project Gutenberg for '{}'", query);

        let response = send_checked(client.get(url).query(&[("query", query)])).await?;
        let html = response.text().await?;

        Ok(self.parse_results(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booklink(href: &str, title: &str, subtitle: &str) -> String {
        format!(
            r#"<li class="booklink">
                <a class="link" href="{href}">
                    <span class="cell content">
                        <span class="title">{title}</span>
                        <span class="subtitle">{subtitle}</span>
                    </span>
                </a>
            </li>"#
        )
    }

    fn page(items: &[String]) -> String {
        format!(
            "<html><body><ul class=\"results\">{}</ul></body></html>",
            items.join("\n")
        )
    }

    fn source() -> GutenbergSource {
        GutenbergSource::new(GUTENBERG_BASE_URL).unwrap()
    }

    #[test]
    fn test_parse_single_result() {
        let html = page(&[booklink("/ebooks/345", "Dracula", "Bram Stoker")]);

        let books = source().parse_results(&html);

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].source, SourceKind::ProjectGutenberg);
        assert_eq!(books[0].title, "Dracula");
        assert_eq!(books[0].author, "Bram Stoker");
        assert_eq!(books[0].url, "https://www.gutenberg.org/ebooks/345");
        assert_eq!(books[0].cover_image_url, None);
        assert_eq!(books[0].action_label, "Download");
    }

    #[test]
    fn test_parse_caps_results() {
        let items: Vec<String> = (1..=12)
            .map(|i| booklink(&format!("/ebooks/{i}"), &format!("Book {i}"), "Someone"))
            .collect();

        let books = source().parse_results(&page(&items));

        assert_eq!(books.len(), MAX_RESULTS_PER_SOURCE);
        assert_eq!(books[0].title, "Book 1");
        assert_eq!(books[4].title, "Book 5");
    }

    #[test]
    fn test_parse_skips_malformed_items() {
        let items = vec![
            r#"<li class="booklink"><span class="title">No Link</span></li>"#.to_string(),
            booklink("/ebooks/1", "", "Nobody"),
            booklink("/ebooks/84", "Frankenstein", "Mary Wollstonecraft Shelley"),
        ];

        let books = source().parse_results(&page(&items));

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Frankenstein");
    }

    #[test]
    fn test_parse_missing_subtitle_gives_empty_author() {
        let item = r#"<li class="booklink">
            <a class="link" href="/ebooks/10"><span class="title">The Bible</span></a>
        </li>"#
            .to_string();

        let books = source().parse_results(&page(&[item]));

        assert_eq!(books.len(), 1);
        assert_eq!(books[0].author, "");
    }

    #[test]
    fn test_parse_collapses_whitespace() {
        let html = page(&[booklink("/ebooks/2701", "  Moby\n   Dick ", "\n Herman Melville ")]);

        let books = source().parse_results(&html);

        assert_eq!(books[0].title, "Moby Dick");
        assert_eq!(books[0].author, "Herman Melville");
    }

    #[test]
    fn test_parse_keeps_absolute_links() {
        let html = page(&[booklink("https://mirror.example/ebooks/1", "Mirror", "")]);

        let books = source().parse_results(&html);

        assert_eq!(books[0].url, "https://mirror.example/ebooks/1");
    }

    #[test]
    fn test_parse_page_without_results() {
        let books = source()
            .parse_results("<html><body><p>No records found.</p></body></html>");
        assert!(books.is_empty());
    }

    #[test]
    fn test_search_url_keeps_base_path() {
        let mirror = GutenbergSource::new("http://mirror.example/gutenberg").unwrap();
        assert_eq!(
            mirror.search_url().unwrap().as_str(),
            "http://mirror.example/gutenberg/ebooks/search/"
        );

        let root = GutenbergSource::new(GUTENBERG_BASE_URL).unwrap();
        assert_eq!(
            root.search_url().unwrap().as_str(),
            "https://www.gutenberg.org/ebooks/search/"
        );
    }

    #[tokio::test]
    async fn test_fetch_under_base_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gutenberg/ebooks/search/")
            .match_query(mockito::Matcher::UrlEncoded("query".into(), "emma".into()))
            .with_status(200)
            .with_body(page(&[booklink("/ebooks/158", "Emma", "Jane Austen")]))
            .create_async()
            .await;

        let source = GutenbergSource::new(&format!("{}/gutenberg", server.url())).unwrap();
        let books = source.fetch(&Client::new(), "emma").await.unwrap();

        mock.assert_async().await;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Emma");
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect() {
        let mut server = mockito::Server::new_async().await;
        let redirect = server
            .mock("GET", "/ebooks/search/")
            .match_query(mockito::Matcher::UrlEncoded("query".into(), "dracula".into()))
            .with_status(302)
            .with_header("location", "/ebooks/search/results")
            .create_async()
            .await;
        let results = server
            .mock("GET", "/ebooks/search/results")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(page(&[booklink("/ebooks/345", "Dracula", "Bram Stoker")]))
            .create_async()
            .await;

        let source = GutenbergSource::new(&server.url()).unwrap();
        let books = source.fetch(&Client::new(), "dracula").await.unwrap();

        redirect.assert_async().await;
        results.assert_async().await;
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].url, format!("{}/ebooks/345", server.url()));
    }

    #[tokio::test]
    async fn test_fetch_reports_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/ebooks/search/")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let source = GutenbergSource::new(&server.url()).unwrap();
        let result = source.fetch(&Client::new(), "dracula").await;

        assert!(matches!(result, Err(UpstreamError::Status(status)) if status.as_u16() == 503));
    }
}
