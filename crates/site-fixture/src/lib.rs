//! Recorded sites for driving the navigation core without a browser
//!
//! A [`SiteFixture`] lists pages, their links, their clickable controls and
//! the items an inspector would extract from them. [`FixtureBrowser`] replays
//! it through the driver and inspector ports, keeping a log of every
//! navigation and click so tests can assert on driver interaction.

pub mod browser;
pub mod errors;
pub mod model;

pub use browser::{BrowserEvent, FixtureBrowser};
pub use errors::FixtureError;
pub use model::{FixtureControl, FixturePage, SiteFixture};
