//! [`MapPage`] over a Chromium instance driven through CDP.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetGeolocationOverrideParams, SetLocaleOverrideParams, SetTimezoneOverrideParams,
    SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use chromiumoxide::{Browser, BrowserConfig, Element, Handler, Page};
use futures::StreamExt;
use mapleads_core::BrowserSettings;

use super::stealth::{
    clear_input_script, count_script, network_idle_script, pick_user_agent,
    scroll_to_end_script, visibility_script, STEALTH_SCRIPT,
};
use super::wait::{bounded, poll_until_found, POLL_INTERVAL};
use super::{MapPage, ResultCard, Scope};
use crate::error::{BrowserError, ScraperError};

/// Budget for single-shot page scripts such as counting or scrolling the feed.
const SCRIPT_TIMEOUT: Duration = Duration::from_secs(5);

/// A launched browser with one configured page.
///
/// Call [`ChromiumSession::close`] before exiting so the browser process
/// and the CDP handler task are shut down.
pub struct ChromiumSession {
    browser: Browser,
    page: ChromiumPage,
    handler_task: tokio::task::JoinHandle<()>,
}

impl ChromiumSession {
    /// Launches Chromium and prepares a page: random user agent, locale,
    /// timezone, geolocation, and the stealth init script.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Launch`] if the browser cannot be started and
    /// [`ScraperError::Browser`] if page setup fails.
    pub async fn launch(settings: &BrowserSettings) -> Result<Self, ScraperError> {
        let mut builder = BrowserConfig::builder()
            .window_size(settings.window_width, settings.window_height)
            .viewport(None)
            .arg(format!("--lang={}", settings.locale));
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScraperError::Launch)?;

        let (mut browser, handler) = Browser::launch(config)
            .await
            .map_err(|e| ScraperError::Launch(e.to_string()))?;
        let handler_task = spawn_handler_task(handler);

        match prepare_page(&browser, settings).await {
            Ok(page) => {
                tracing::info!(headless = settings.headless, "browser session ready");
                Ok(Self {
                    browser,
                    page: ChromiumPage { page },
                    handler_task,
                })
            }
            Err(err) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn page(&self) -> &ChromiumPage {
        &self.page
    }

    /// Closes the browser, waits for the process to exit, and stops the handler.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "browser close command failed");
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!(error = %e, "waiting for browser exit failed");
        }
        self.handler_task.abort();
        tracing::info!("browser session closed");
    }
}

async fn prepare_page(browser: &Browser, settings: &BrowserSettings) -> Result<Page, BrowserError> {
    let page = browser.new_page("about:blank").await?;

    let user_agent = pick_user_agent();
    let mut ua_override = SetUserAgentOverrideParams::new(user_agent);
    ua_override.accept_language = Some(settings.locale.clone());
    page.execute(ua_override).await?;

    page.execute(
        SetLocaleOverrideParams::builder()
            .locale(settings.locale.clone())
            .build(),
    )
    .await?;
    page.execute(SetTimezoneOverrideParams::new(settings.timezone.clone()))
        .await?;

    browser
        .execute(GrantPermissionsParams::new(vec![PermissionType::Geolocation]))
        .await?;
    page.execute(
        SetGeolocationOverrideParams::builder()
            .latitude(settings.latitude)
            .longitude(settings.longitude)
            .accuracy(100.0)
            .build(),
    )
    .await?;

    page.execute(AddScriptToEvaluateOnNewDocumentParams::new(STEALTH_SCRIPT))
        .await?;

    tracing::debug!(user_agent, "page context configured");
    Ok(page)
}

fn spawn_handler_task(mut handler: Handler) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!(error = %e, "CDP handler event error");
            }
        }
    })
}

pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    async fn evaluate_bool(&self, script: String, context: &str) -> Result<bool, BrowserError> {
        self.page
            .evaluate(script)
            .await?
            .into_value::<bool>()
            .map_err(|e| BrowserError::Script {
                context: context.to_string(),
                reason: e.to_string(),
            })
    }

    async fn card(&self, card_selector: &str, card: ResultCard) -> Result<Element, BrowserError> {
        let cards = self.page.find_elements(card_selector).await?;
        cards
            .into_iter()
            .nth(card.index)
            .ok_or_else(|| BrowserError::not_found(format!("{card_selector} #{}", card.index)))
    }

    async fn locate(&self, scope: Scope<'_>, selector: &str) -> Result<Element, BrowserError> {
        match scope {
            Scope::Document => self
                .page
                .find_element(selector)
                .await
                .map_err(|_| BrowserError::not_found(selector)),
            Scope::Card {
                selector: card_selector,
                card,
            } => self
                .card(card_selector, card)
                .await?
                .find_element(selector)
                .await
                .map_err(|_| BrowserError::not_found(selector)),
        }
    }
}

#[async_trait]
impl MapPage for ChromiumPage {
    async fn goto(&self, url: &str, timeout: Duration) -> Result<(), BrowserError> {
        bounded(&format!("navigate to {url}"), timeout, async {
            self.page.goto(url).await?;
            Ok(())
        })
        .await
    }

    async fn wait_for_visible(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        let script = visibility_script(selector);
        bounded(&format!("wait for {selector}"), timeout, async {
            loop {
                if self
                    .evaluate_bool(script.clone(), "visibility check")
                    .await
                    .unwrap_or(false)
                {
                    return Ok(());
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        })
        .await
    }

    async fn wait_for_network_idle(&self, timeout: Duration) -> Result<(), BrowserError> {
        let timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        // The script enforces its own deadline; the outer bound covers a stalled CDP call.
        let idle = bounded(
            "network idle",
            timeout + Duration::from_secs(1),
            self.evaluate_bool(network_idle_script(timeout_ms), "network idle"),
        )
        .await?;
        if idle {
            Ok(())
        } else {
            Err(BrowserError::timeout("network idle", timeout))
        }
    }

    async fn count(&self, selector: &str) -> Result<usize, BrowserError> {
        bounded(&format!("count {selector}"), SCRIPT_TIMEOUT, async {
            self.page
                .evaluate(count_script(selector))
                .await?
                .into_value::<usize>()
                .map_err(|e| BrowserError::Script {
                    context: format!("count of {selector}"),
                    reason: e.to_string(),
                })
        })
        .await
    }

    async fn text(
        &self,
        scope: Scope<'_>,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<String>, BrowserError> {
        poll_until_found(&format!("read text of {selector}"), timeout, || async move {
            let element = self.locate(scope, selector).await?;
            Ok(element.inner_text().await?)
        })
        .await
    }

    async fn attribute(
        &self,
        scope: Scope<'_>,
        selector: &str,
        name: &str,
        timeout: Duration,
    ) -> Result<Option<String>, BrowserError> {
        poll_until_found(&format!("read {name} of {selector}"), timeout, || async move {
            let element = self.locate(scope, selector).await?;
            Ok(element.attribute(name).await?)
        })
        .await
    }

    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> Result<(), BrowserError> {
        bounded(&format!("fill {selector}"), timeout, async {
            let element = self.locate(Scope::Document, selector).await?;
            element.click().await?;
            if !self
                .evaluate_bool(clear_input_script(selector), "clear input")
                .await?
            {
                return Err(BrowserError::not_found(selector));
            }
            element.type_str(value).await?;
            Ok(())
        })
        .await
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError> {
        bounded(&format!("click {selector}"), timeout, async {
            self.locate(Scope::Document, selector)
                .await?
                .click()
                .await?;
            Ok(())
        })
        .await
    }

    async fn open_card(
        &self,
        card_selector: &str,
        card: ResultCard,
        timeout: Duration,
    ) -> Result<(), BrowserError> {
        bounded(&format!("open card #{}", card.index), timeout, async {
            let element = self.card(card_selector, card).await?;
            element.scroll_into_view().await?;
            element.click().await?;
            Ok(())
        })
        .await
    }

    async fn scroll_to_end(&self, selector: &str) -> Result<(), BrowserError> {
        let scrolled = bounded(
            &format!("scroll {selector}"),
            SCRIPT_TIMEOUT,
            self.evaluate_bool(scroll_to_end_script(selector), "scroll feed"),
        )
        .await?;
        if scrolled {
            Ok(())
        } else {
            Err(BrowserError::not_found(selector))
        }
    }
}
