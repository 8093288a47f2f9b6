// ── Chrome DevTools driver ──
//
// `chromiumoxide`-backed implementation of the browser capability. Each
// launch spawns a private Chrome process with a single page; the CDP
// event handler runs on its own tokio task for the lifetime of the session.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::browser::{BrowserLauncher, BrowserSession, LaunchOptions, Selector, WaitCondition};
use crate::error::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

// Clicks and clears go through JS so overlays on the router UI can't swallow them.
const CLICK_JS: &str = "function() { this.click(); }";
const CLEAR_JS: &str = "function() { this.value = ''; }";
const IS_CLICKABLE_JS: &str =
    "function() { return !this.disabled && this.getClientRects().length > 0; }";

/// Launches a local Chrome/Chromium via the DevTools protocol.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeLauncher;

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>, Error> {
        let session = ChromeSession::launch(options).await?;
        Ok(Box::new(session))
    }
}

/// A running Chrome process plus the one page the reboot flow drives.
pub struct ChromeSession {
    browser: Option<Browser>,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeSession {
    async fn launch(options: &LaunchOptions) -> Result<Self, Error> {
        if let Some(ref path) = options.executable {
            if !path.exists() {
                return Err(Error::MissingExecutable { path: path.clone() });
            }
        }

        let (width, height) = options.window_size;
        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .request_timeout(options.request_timeout);
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = options.executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|reason| config_error(reason, options.executable.is_some()))?;

        let (mut browser, mut events) = Browser::launch(config).await.map_err(launch_error)?;
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!(error = %e, "devtools handler event failed");
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(e.into());
            }
        };

        debug!(headless = options.headless, "browser session started");
        Ok(Self {
            browser: Some(browser),
            page,
            handler,
        })
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.browser.is_some() {
            Ok(())
        } else {
            Err(Error::SessionClosed)
        }
    }

    async fn element(&self, selector: &Selector) -> Result<Element, Error> {
        self.ensure_open()?;
        self.page
            .find_element(selector.as_str())
            .await
            .map_err(|_| Error::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

/// Without a configured path, a failed build means auto-detection found
/// no browser.
fn config_error(reason: String, configured: bool) -> Error {
    if configured {
        Error::Launch(reason)
    } else {
        Error::MissingBrowser { reason }
    }
}

/// A spawn failing with `NotFound` means the executable is gone.
fn launch_error(err: CdpError) -> Error {
    let root: &(dyn std::error::Error + 'static) = &err;
    let not_found = std::iter::successors(Some(root), |e| e.source())
        .filter_map(|e| e.downcast_ref::<io::Error>())
        .any(|io| io.kind() == io::ErrorKind::NotFound);
    if not_found {
        Error::MissingBrowser {
            reason: err.to_string(),
        }
    } else {
        err.into()
    }
}

async fn is_clickable(element: &Element) -> bool {
    match element.call_js_fn(IS_CLICKABLE_JS, false).await {
        Ok(ret) => ret
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false),
        Err(_) => false,
    }
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), Error> {
        self.ensure_open()?;
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for(
        &mut self,
        selector: &Selector,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), Error> {
        self.ensure_open()?;

        let poll = async {
            loop {
                if let Ok(element) = self.page.find_element(selector.as_str()).await {
                    match condition {
                        WaitCondition::Present => return,
                        WaitCondition::Clickable if is_clickable(&element).await => return,
                        WaitCondition::Clickable => {}
                    }
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };

        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| Error::Timeout {
                what: selector.to_string(),
                timeout_secs: timeout.as_secs(),
            })
    }

    async fn click(&mut self, selector: &Selector) -> Result<(), Error> {
        let element = self.element(selector).await?;
        element.call_js_fn(CLICK_JS, false).await?;
        Ok(())
    }

    async fn fill(&mut self, selector: &Selector, text: &str) -> Result<(), Error> {
        let element = self.element(selector).await?;
        element.call_js_fn(CLEAR_JS, false).await?;
        element.focus().await?;
        element.type_str(text).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, Error> {
        self.ensure_open()?;
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn quit(&mut self) -> Result<(), Error> {
        let Some(mut browser) = self.browser.take() else {
            return Ok(());
        };

        let closed = browser.close().await;
        if let Err(e) = browser.wait().await {
            warn!(error = %e, "browser process did not exit cleanly");
        }
        self.handler.abort();
        debug!("browser session closed");

        closed?;
        Ok(())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autodetect_failure_is_environment_missing() {
        let err = config_error("Could not auto detect a chrome executable".into(), false);
        assert!(matches!(err, Error::MissingBrowser { .. }));
        assert!(err.is_environment_missing());
    }

    #[test]
    fn bad_configured_build_is_a_launch_failure() {
        let err = config_error("invalid window size".into(), true);
        assert!(matches!(err, Error::Launch(_)));
        assert!(!err.is_environment_missing());
    }

    #[test]
    fn spawn_not_found_is_environment_missing() {
        let err = launch_error(CdpError::from(io::Error::from(io::ErrorKind::NotFound)));
        assert!(err.is_environment_missing());

        let err = launch_error(CdpError::from(io::Error::from(io::ErrorKind::PermissionDenied)));
        assert!(!err.is_environment_missing());
    }
}
