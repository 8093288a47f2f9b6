// ── Browser automation capability ──
//
// The smallest driver surface the reboot sequence needs: launch/quit a
// session, navigate, wait for an element, click, and fill a field.
// Anything implementing these traits can drive the page flow, including
// scripted fakes in tests.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Error;

/// A CSS selector identifying one element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector(String);

impl Selector {
    pub fn css(selector: impl Into<String>) -> Self {
        Self(selector.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Selector {
    fn from(s: &str) -> Self {
        Self::css(s)
    }
}

/// What "ready" means for a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// The element exists in the DOM.
    Present,
    /// The element exists, is rendered, and is not disabled.
    Clickable,
}

/// How to start the browser process.
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Explicit browser binary. `None` lets the driver auto-detect.
    pub executable: Option<PathBuf>,
    pub headless: bool,
    pub window_size: (u32, u32),
    /// Upper bound on any single DevTools request.
    pub request_timeout: Duration,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            executable: None,
            headless: true,
            window_size: (1920, 1080),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Starts fresh, exclusive browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, options: &LaunchOptions) -> Result<Box<dyn BrowserSession>, Error>;
}

/// One live browser with a single page.
///
/// Sessions are never shared between operations. Callers must call
/// [`quit`](Self::quit) exactly once when done, whatever the outcome.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &str) -> Result<(), Error>;

    /// Block until `selector` satisfies `condition`, or fail with
    /// [`Error::Timeout`] once `timeout` elapses.
    async fn wait_for(
        &mut self,
        selector: &Selector,
        condition: WaitCondition,
        timeout: Duration,
    ) -> Result<(), Error>;

    async fn click(&mut self, selector: &Selector) -> Result<(), Error>;

    /// Clear the field, then type `text` into it.
    async fn fill(&mut self, selector: &Selector, text: &str) -> Result<(), Error>;

    async fn current_url(&mut self) -> Result<String, Error>;

    async fn quit(&mut self) -> Result<(), Error>;
}
