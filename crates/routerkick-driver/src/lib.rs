// routerkick-driver: the two external capabilities the automation core drives --
// a headless browser session and the OS "join known network" command.

pub mod browser;
pub mod chrome;
pub mod error;
pub mod network;

pub use browser::{BrowserLauncher, BrowserSession, LaunchOptions, Selector, WaitCondition};
pub use chrome::ChromeLauncher;
pub use error::Error;
pub use network::{JoinProgram, NetworkJoiner, SystemNetworkJoiner};
