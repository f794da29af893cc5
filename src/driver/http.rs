use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use once_cell::sync::Lazy;
use tracing::{debug, info, warn};
use url::Url;

use super::PlanDriver;
use crate::config::Config;
use crate::error::ScrapeError;
use crate::parsers::{element_text, has_table};

static FORM_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("form").expect("Invalid form selector"));
static INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input").expect("Invalid input selector"));
static PASSWORD_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"input[type="password"]"#).expect("Invalid password selector"));
static USERNAME_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"input[type="text"], input[name*="user"], input[id*="user"]"#)
        .expect("Invalid username selector")
});
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href], [data-href]").expect("Invalid link selector"));
static IFRAME_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("iframe[src]").expect("Invalid iframe selector"));
static NEXT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img.control-next").expect("Invalid next control selector"));

/// URL fragment the portal redirects to after a successful login.
const LOGGED_IN_MARKER: &str = "default.aspx";

/// Sub-document reachable by plain HTTP: the page itself or an `iframe[src]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFrame {
    pub url: Url,
}

struct LoadedPage {
    url: Url,
    html: String,
}

struct LoginForm {
    action: Url,
    use_get: bool,
    fields: Vec<(String, String)>,
}

enum NextControl {
    Missing,
    Disabled,
    Unlinked,
    Target(Url),
}

/// Drives the portal with a cookie-keeping HTTP client instead of a browser.
pub struct HttpDriver {
    client: Client,
    config: Arc<Config>,
    current: Option<LoadedPage>,
    documents: HashMap<Url, String>,
}

impl HttpDriver {
    pub fn new(client: Client, config: Arc<Config>) -> Self {
        Self {
            client,
            config,
            current: None,
            documents: HashMap::new(),
        }
    }

    fn page(&self) -> Result<&LoadedPage> {
        self.current.as_ref().ok_or_else(|| anyhow!("Page not initialized"))
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<(Url, String)> {
        let response = request.send().await.context("Request failed")?;
        let status = response.status();
        let url = response.url().clone();
        if !status.is_success() {
            return Err(anyhow!("HTTP error {}: {}", status, url));
        }
        let html = response.text().await?;
        Ok((url, html))
    }

    fn load(&mut self, url: Url, html: String) {
        debug!("Loaded {}", url);
        self.documents.clear();
        self.documents.insert(url.clone(), html.clone());
        self.current = Some(LoadedPage { url, html });
    }

    pub async fn navigate(&mut self, url: &str) -> Result<()> {
        info!("Navigating to {}...", url);
        let (final_url, html) = self.fetch(self.client.get(url)).await?;
        self.load(final_url, html);
        Ok(())
    }

    async fn document(&mut self, frame: &HttpFrame) -> Result<String> {
        if let Some(html) = self.documents.get(&frame.url) {
            return Ok(html.clone());
        }
        let (_, html) = self
            .fetch(self.client.get(frame.url.clone()))
            .await
            .with_context(|| format!("Failed to load frame {}", frame.url))?;
        self.documents.insert(frame.url.clone(), html.clone());
        Ok(html)
    }
}

#[async_trait]
impl PlanDriver for HttpDriver {
    type Frame = HttpFrame;

    async fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        let base_url = self.config.base_url.clone();
        self.navigate(&base_url).await?;
        info!("Attempting to login...");

        let form = {
            let page = self.page()?;
            parse_login_form(&page.html, &page.url, username, password)
                .ok_or_else(|| ScrapeError::LoginFormNotFound(page.url.to_string()))?
        };

        let request = if form.use_get {
            self.client.get(form.action.clone()).query(&form.fields)
        } else {
            let body = serde_urlencoded::to_string(&form.fields)?;
            self.client
                .post(form.action.clone())
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body)
        };
        let (final_url, html) = self.fetch(request).await.context("Login request failed")?;
        self.load(final_url, html);

        let current_url = self.page()?.url.as_str();
        if current_url.contains(LOGGED_IN_MARKER) {
            info!("Login successful! Redirected to: {}", current_url);
            Ok(true)
        } else {
            warn!("Login may have failed. Current URL: {}", current_url);
            Ok(false)
        }
    }

    async fn open_plan(&mut self) -> Result<()> {
        let link_text = self.config.plan_link_text.clone();
        info!("Looking for {} element...", link_text);

        let target = {
            let page = self.page()?;
            find_link(&page.html, &page.url, &link_text)
                .ok_or_else(|| ScrapeError::PlanLinkNotFound(link_text.clone()))?
        };
        self.navigate(target.as_str()).await?;
        info!("Opened {}", link_text);
        Ok(())
    }

    async fn frames(&mut self) -> Result<Vec<HttpFrame>> {
        let page = self.page()?;
        let mut frames = vec![HttpFrame { url: page.url.clone() }];
        frames.extend(iframe_urls(&page.html, &page.url).into_iter().map(|url| HttpFrame { url }));
        Ok(frames)
    }

    async fn has_table(&mut self, frame: &HttpFrame) -> Result<bool> {
        let html = self.document(frame).await?;
        Ok(has_table(&html))
    }

    async fn frame_html(&mut self, frame: &HttpFrame) -> Result<String> {
        self.document(frame).await
    }

    async fn next_page(&mut self) -> Result<bool> {
        debug!("Looking for main page next button...");
        let control = {
            let page = self.page()?;
            next_control(&page.html, &page.url)
        };

        let target = match control {
            NextControl::Missing | NextControl::Disabled => {
                info!("Main page next button is disabled or missing");
                return Ok(false);
            }
            NextControl::Unlinked => {
                warn!("Main page next button has no link target");
                return Ok(false);
            }
            NextControl::Target(url) => url,
        };

        if let Err(e) = self.navigate(target.as_str()).await {
            warn!("Failed to follow main page next button: {}", e);
            return Ok(false);
        }
        tokio::time::sleep(self.config.settle_delay()).await;
        Ok(true)
    }
}

fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

fn parse_login_form(html: &str, page_url: &Url, username: &str, password: &str) -> Option<LoginForm> {
    let document = Html::parse_document(html);
    let form = document
        .select(&FORM_SELECTOR)
        .find(|form| form.select(&PASSWORD_SELECTOR).next().is_some())?;

    let user_name = form
        .select(&USERNAME_SELECTOR)
        .find(|input| input.value().attr("type") != Some("password"))
        .and_then(|input| input.value().attr("name"))?;
    let password_name = form
        .select(&PASSWORD_SELECTOR)
        .next()
        .and_then(|input| input.value().attr("name"))?;

    let mut fields = Vec::new();
    let mut submit_taken = false;
    for input in form.select(&INPUT_SELECTOR) {
        let element = input.value();
        let Some(name) = element.attr("name") else {
            continue;
        };
        let kind = element.attr("type").unwrap_or("text").to_ascii_lowercase();
        let value = element.attr("value").unwrap_or_default();

        let value = if name == user_name {
            username
        } else if name == password_name {
            password
        } else {
            match kind.as_str() {
                "submit" | "image" if !submit_taken => {
                    submit_taken = true;
                    value
                }
                "submit" | "image" | "button" | "reset" | "file" => continue,
                "checkbox" | "radio" if element.attr("checked").is_none() => continue,
                _ => value,
            }
        };
        fields.push((name.to_string(), value.to_string()));
    }

    let action = match form.value().attr("action") {
        Some(action) if !action.trim().is_empty() => resolve(page_url, action)?,
        _ => page_url.clone(),
    };
    let use_get = form
        .value()
        .attr("method")
        .map(|method| method.eq_ignore_ascii_case("get"))
        .unwrap_or(false);

    Some(LoginForm { action, use_get, fields })
}

fn find_link(html: &str, page_url: &Url, text: &str) -> Option<Url> {
    let document = Html::parse_document(html);
    document
        .select(&LINK_SELECTOR)
        .filter(|link| element_text(*link).contains(text))
        .find_map(|link| {
            let element = link.value();
            element
                .attr("href")
                .or_else(|| element.attr("data-href"))
                .and_then(|href| resolve(page_url, href))
        })
}

fn iframe_urls(html: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    document
        .select(&IFRAME_SELECTOR)
        .filter_map(|frame| frame.value().attr("src"))
        .filter_map(|src| resolve(page_url, src))
        .collect()
}

fn next_control(html: &str, page_url: &Url) -> NextControl {
    let document = Html::parse_document(html);
    let Some(control) = document.select(&NEXT_SELECTOR).next() else {
        return NextControl::Missing;
    };
    if control.value().classes().any(|class| class == "disabled") {
        return NextControl::Disabled;
    }

    let own_target = control.value().attr("data-href");
    let link_target = control
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "a")
        .and_then(|anchor| anchor.value().attr("href"));

    match own_target.or(link_target).and_then(|href| resolve(page_url, href)) {
        Some(url) => NextControl::Target(url),
        None => NextControl::Unlinked,
    }
}
