//! Page fetching.
//!
//! One blocking client per worker thread, configured from [`Config`]:
//! headers, timeout and a bounded retry loop with linear backoff. A fetched
//! page is transcoded to UTF-8 before parsing, then checked for the
//! sentinel heading the site serves instead of a 404 when a school
//! identifier maps to nothing.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, warn};

use crate::config::Config;
use crate::dom::{self, Document};
use crate::encoding;
use crate::error::{Error, Result};
use crate::page::Page;

/// Outcome of fetching one page.
pub(crate) enum PageFetch {
    /// The page rendered a school; reduced to its data region.
    Page(Document),
    /// The site served its empty-result shell for this identifier.
    NoData,
}

pub(crate) struct Fetcher {
    client: Client,
    empty_h1: String,
    retries: u32,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| Error::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            empty_h1: config.empty_h1.clone(),
            retries: config.retries,
        })
    }

    /// Fetch one page of one school.
    pub fn fetch(&self, config: &Config, school_id: u32, page: Page) -> Result<PageFetch> {
        let url = config.page_url(school_id, page);
        let body = self.get_with_retries(&url)?;
        let html = encoding::transcode_to_utf8(&body);
        let doc = dom::parse(&html);

        let h1 = doc.select("h1");
        if h1.exists() && dom::cell_text(&h1.first()) == self.empty_h1 {
            return Ok(PageFetch::NoData);
        }
        debug!(school_id, %page, "fetched");
        Ok(PageFetch::Page(reduce_page(&doc)))
    }

    fn get_with_retries(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.get_once(url) {
                Ok(body) => return Ok(body),
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(url, attempt, %err, "retrying fetch");
                    thread::sleep(Duration::from_secs(u64::from(attempt)));
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn get_once(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Transport {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.bytes()?.to_vec())
    }
}

/// Reduce a full page to the parts extraction reads: the `<h1>` heading and
/// the tab content wrapper holding every data table. Everything else on the
/// page is navigation and ads.
pub(crate) fn reduce_page(doc: &Document) -> Document {
    let h1 = doc.select("h1");
    let heading = if h1.exists() {
        dom::cell_text(&h1.first())
    } else {
        String::new()
    };
    let wrap = doc.select("div#tabcontwrap");
    let content = if wrap.exists() {
        wrap.first().html().to_string()
    } else {
        String::new()
    };
    dom::parse(&format!(
        "<html><body><h1>{}</h1>{content}</body></html>",
        dom::escape_html(&heading)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduce_keeps_heading_and_tab_content() {
        let doc = dom::parse(
            "<html><body><div id=\"nav\">menu</div><h1>Example College</h1>\
             <div id=\"tabcontwrap\"><table><tbody>\
             <tr><th>City</th><td>Springfield</td></tr>\
             </tbody></table></div>\
             <div id=\"footer\">links</div></body></html>",
        );
        let reduced = reduce_page(&doc);
        assert_eq!(dom::cell_text(&reduced.select("h1").first()), "Example College");
        assert!(reduced.select("table").exists());
        assert!(!reduced.select("div#nav").exists());
        assert!(!reduced.select("div#footer").exists());
    }

    #[test]
    fn reduce_tolerates_missing_regions() {
        let doc = dom::parse("<html><body><p>bare</p></body></html>");
        let reduced = reduce_page(&doc);
        assert_eq!(dom::cell_text(&reduced.select("h1").first()), "");
        assert!(!reduced.select("table").exists());
    }

    #[test]
    fn fetcher_rejects_malformed_headers() {
        let mut config = Config::default();
        config
            .headers
            .insert("bad header".to_string(), "x".to_string());
        assert!(Fetcher::new(&config).is_err());
    }
}
