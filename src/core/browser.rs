use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::util::Timeout;
use headless_chrome::{Browser, LaunchOptions, Tab};
use tracing::{debug, info};

use super::config::BrowserSettings;
use super::errors::CoreError;

const WINDOW_SIZE: (u32, u32) = (1280, 800);
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// The single browser page the extractor drives.
#[async_trait]
pub trait PageSession: Send + Sync {
    /// Navigates and waits for the load to settle. Fails with `NavigationTimeout` past `timeout`,
    /// and only returns once the page has stopped waiting.
    async fn goto(&self, url: &str, timeout: Duration) -> anyhow::Result<()>;

    async fn has_element(&self, selector: &str) -> anyhow::Result<bool>;

    /// Returns `false` when the element did not appear within `timeout`.
    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> anyhow::Result<bool>;

    async fn content(&self) -> anyhow::Result<String>;

    async fn current_url(&self) -> String;

    async fn close(&self) -> anyhow::Result<()>;
}

/// Chrome driven through the DevTools protocol. Blocking calls run on the blocking pool.
pub struct ChromeSession {
    browser: Mutex<Option<Browser>>,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub async fn launch(settings: &BrowserSettings) -> anyhow::Result<Self> {
        let headless = settings.headless;
        let (browser, tab) = tokio::task::spawn_blocking(move || -> anyhow::Result<_> {
            let options = LaunchOptions::default_builder()
                .headless(headless)
                .window_size(Some(WINDOW_SIZE))
                .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
                .build()
                .map_err(|err| anyhow::anyhow!("invalid browser launch options: {err}"))?;

            let browser = Browser::new(options).context("failed to launch Chrome")?;
            let tab = browser.new_tab().context("failed to open browser tab")?;
            Ok((browser, tab))
        })
        .await??;

        info!(headless, "browser session started");
        Ok(Self {
            browser: Mutex::new(Some(browser)),
            tab,
        })
    }

    async fn run_blocking<T, F>(&self, job: F) -> anyhow::Result<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Tab>) -> anyhow::Result<T> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || job(tab)).await?
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn goto(&self, url: &str, timeout: Duration) -> anyhow::Result<()> {
        let target = url.to_string();
        self.run_blocking(move |tab| {
            tab.set_default_timeout(timeout);
            tab.navigate_to(&target)?.wait_until_navigated()?;
            Ok(())
        })
        .await
        .map_err(|err| navigation_error(url, err))
    }

    async fn has_element(&self, selector: &str) -> anyhow::Result<bool> {
        let selector = selector.to_string();
        self.run_blocking(move |tab| presence(tab.find_element(&selector).map(|_| ())))
            .await
    }

    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> anyhow::Result<bool> {
        let selector = selector.to_string();
        self.run_blocking(move |tab| {
            presence(
                tab.wait_for_element_with_custom_timeout(&selector, timeout)
                    .map(|_| ()),
            )
        })
        .await
    }

    async fn content(&self) -> anyhow::Result<String> {
        self.run_blocking(|tab| tab.get_content()).await
    }

    async fn current_url(&self) -> String {
        self.tab.get_url()
    }

    async fn close(&self) -> anyhow::Result<()> {
        let browser = match self.browser.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        let Some(browser) = browser else {
            return Ok(());
        };

        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || {
            let _ = tab.close(true);
            drop(browser);
        })
        .await?;

        debug!("browser session closed");
        Ok(())
    }
}

/// The tab's own wait expiring becomes `NavigationTimeout`; anything else keeps its cause.
fn navigation_error(url: &str, err: anyhow::Error) -> anyhow::Error {
    if err.downcast_ref::<Timeout>().is_some() {
        return CoreError::NavigationTimeout {
            url: url.to_string(),
        }
        .into();
    }
    err.context(format!("navigation to {url} failed"))
}

/// `false` only when the element is missing or the wait ran out. Protocol failures propagate.
fn presence(lookup: anyhow::Result<()>) -> anyhow::Result<bool> {
    match lookup {
        Ok(()) => Ok(true),
        Err(err) if err.is::<NoElementFound>() || err.is::<Timeout>() => Ok(false),
        Err(err) => Err(err),
    }
}
