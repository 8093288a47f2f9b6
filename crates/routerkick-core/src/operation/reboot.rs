// ── DeviceRebootOperation ──
//
// Drives the router's web console through one fixed page flow:
// login as the regular user, open the management page, click reboot,
// confirm. Every wait is bounded; the first failing step aborts the
// whole sequence. The browser session is always quit exactly once.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::{debug, warn};

use routerkick_driver::{BrowserLauncher, BrowserSession, Selector, WaitCondition};

use crate::config::{Endpoints, RouterConfig};
use crate::error::CoreError;
use crate::event::ProgressSink;
use crate::operation::OperationResult;

const LANDING_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Named steps of the reboot sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum RebootStep {
    #[strum(to_string = "launch browser")]
    LaunchBrowser,
    #[strum(to_string = "open login page")]
    OpenLoginPage,
    #[strum(to_string = "switch user role")]
    SwitchRole,
    #[strum(to_string = "enter password")]
    EnterPassword,
    #[strum(to_string = "submit login")]
    SubmitLogin,
    #[strum(to_string = "await landing page")]
    AwaitLandingPage,
    #[strum(to_string = "open management page")]
    OpenManagementPage,
    #[strum(to_string = "click reboot")]
    ClickReboot,
    #[strum(to_string = "confirm reboot")]
    ConfirmReboot,
}

/// Selectors for the supported router web UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFlow {
    /// Link switching the login form to the non-admin user.
    pub role_switch: Selector,
    pub password_field: Selector,
    pub submit: Selector,
    pub reboot_button: Selector,
    pub confirm_button: Selector,
}

impl Default for PageFlow {
    fn default() -> Self {
        Self {
            role_switch: Selector::css("#role_user a.user"),
            password_field: Selector::css("input[name='skypsd']"),
            submit: Selector::css("input[type='submit']"),
            reboot_button: Selector::css("#Submit1"),
            confirm_button: Selector::css("#msgconfirmb"),
        }
    }
}

#[derive(Clone)]
pub struct DeviceReboot {
    launcher: Arc<dyn BrowserLauncher>,
    flow: PageFlow,
}

impl DeviceReboot {
    pub fn new(launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self::with_flow(launcher, PageFlow::default())
    }

    pub fn with_flow(launcher: Arc<dyn BrowserLauncher>, flow: PageFlow) -> Self {
        Self { launcher, flow }
    }

    pub fn flow(&self) -> &PageFlow {
        &self.flow
    }

    pub async fn execute(&self, config: &RouterConfig, sink: &ProgressSink) -> OperationResult {
        let endpoints = config.endpoints();

        sink.log("starting router reboot...");
        sink.progress(10, "launching browser");

        let mut session = match self.launcher.launch(&config.launch_options()).await {
            Ok(session) => session,
            Err(e) => return sink.fail(&CoreError::at_step(RebootStep::LaunchBrowser, e)),
        };
        sink.progress(20, "browser ready");

        let outcome = self
            .drive(session.as_mut(), config, &endpoints, sink)
            .await;

        if let Err(e) = session.quit().await {
            warn!(error = %e, "browser did not shut down cleanly");
        }
        sink.log("browser closed");

        match outcome {
            Ok(()) => {
                sink.log("reboot command sent, router should restart within 5-15 seconds");
                sink.progress(100, "reboot command sent");
                OperationResult::Success(Some(config.router_address.clone()))
            }
            Err(e) => sink.fail(&e),
        }
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        config: &RouterConfig,
        endpoints: &Endpoints,
        sink: &ProgressSink,
    ) -> Result<(), CoreError> {
        let timing = &config.timing;
        let flow = &self.flow;

        session
            .navigate(&endpoints.login)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::OpenLoginPage, e))?;
        sink.log(format!("opened login page {}", endpoints.login));
        sink.progress(30, "loading login page");

        session
            .wait_for(&flow.role_switch, WaitCondition::Clickable, timing.element_timeout)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::SwitchRole, e))?;
        session
            .click(&flow.role_switch)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::SwitchRole, e))?;
        sink.log(format!("switched to user login: {}", config.username));
        sink.progress(40, "switched user role");

        session
            .wait_for(&flow.password_field, WaitCondition::Present, timing.element_timeout)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::EnterPassword, e))?;
        session
            .fill(&flow.password_field, config.password.expose_secret())
            .await
            .map_err(|e| CoreError::at_step(RebootStep::EnterPassword, e))?;
        sink.log("password entered");
        sink.progress(50, "password entered");

        session
            .wait_for(&flow.submit, WaitCondition::Clickable, timing.element_timeout)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::SubmitLogin, e))?;
        session
            .click(&flow.submit)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::SubmitLogin, e))?;
        sink.log("login submitted");
        sink.progress(60, "logging in");

        let landed = await_landing(session, &endpoints.landing, timing.login_timeout).await?;
        sink.log(format!("logged in, now at {landed}"));

        session
            .navigate(&endpoints.manage)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::OpenManagementPage, e))?;
        sink.log(format!("opened management page {}", endpoints.manage));
        sink.progress(70, "on management page");

        session
            .wait_for(&flow.reboot_button, WaitCondition::Present, timing.element_timeout)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::ClickReboot, e))?;
        session
            .click(&flow.reboot_button)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::ClickReboot, e))?;
        sink.log("clicked reboot");
        sink.progress(80, "reboot clicked");

        session
            .wait_for(&flow.confirm_button, WaitCondition::Clickable, timing.element_timeout)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::ConfirmReboot, e))?;
        session
            .click(&flow.confirm_button)
            .await
            .map_err(|e| CoreError::at_step(RebootStep::ConfirmReboot, e))?;
        sink.log("reboot confirmed");
        sink.progress(90, "reboot confirmed");

        // The router reboots asynchronously to the click.
        tokio::time::sleep(timing.post_reboot_settle).await;
        Ok(())
    }
}

/// Poll the current address until it contains `landing`.
async fn await_landing(
    session: &mut dyn BrowserSession,
    landing: &str,
    timeout: Duration,
) -> Result<String, CoreError> {
    let poll = async {
        loop {
            let url = session.current_url().await?;
            if url.contains(landing) {
                return Ok::<_, routerkick_driver::Error>(url);
            }
            debug!(current = %url, expected = landing, "waiting for landing page");
            tokio::time::sleep(LANDING_POLL_INTERVAL).await;
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(result) => result.map_err(|e| CoreError::at_step(RebootStep::AwaitLandingPage, e)),
        Err(_) => Err(CoreError::Timeout {
            step: RebootStep::AwaitLandingPage.to_string(),
        }),
    }
}
