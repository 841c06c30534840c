//! Current-conditions poller for the DHMZ vrijeme.hr city feed.
//!
//! A [`Coordinator`] owns one city: it fetches the XML feed on a schedule,
//! normalizes the city's raw fields into a [`Reading`] and publishes it as
//! an immutable snapshot. Consumers read the snapshot with
//! [`Coordinator::current`] or follow it with [`Coordinator::subscribe`].
//!
//! ```rust,ignore
//! use vrijeme::{Config, Coordinator};
//!
//! let coordinator = Coordinator::from_config(&Config::for_city("Zagreb-Grič"))?;
//! coordinator.first_refresh().await?;
//! if let Some(reading) = coordinator.current() {
//!     println!("{:?} °C", reading.temperature);
//! }
//! ```

pub mod condition;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod feed;
pub mod normalize;
pub mod reading;
pub mod runner;
pub mod sensor;

pub use condition::Condition;
pub use config::Config;
pub use coordinator::{Coordinator, RefreshStatus, Snapshot};
pub use error::{ConfigError, FailureKind, NodeError, RefreshError};
pub use feed::{available_cities, FeedSource, HttpFeed};
pub use reading::{Reading, WindDirection};
pub use sensor::{SensorKind, SensorValue, SENSORS};
