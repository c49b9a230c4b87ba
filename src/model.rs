use std::fmt;
use std::sync::Arc;

use tripscan_core::prelude::*;

/// Transit network shared between threads.
///
/// The network is read-only once built, so clones hand out the same
/// allocation and any number of queries can run on it concurrently.
#[derive(Debug, Clone)]
pub struct TransitModel {
    network: Arc<TransitNetwork>,
}

impl TransitModel {
    /// Reads the configured GTFS feeds and builds the network
    ///
    /// # Errors
    ///
    /// Fails when a feed directory or a required file is missing, or when
    /// the feeds do not form a valid network.
    pub fn load(config: &NetworkConfig) -> Result<Self, Error> {
        let network = create_transit_network(config)?;
        Ok(Self::from_network(network))
    }

    pub fn from_network(network: TransitNetwork) -> Self {
        Self {
            network: Arc::new(network),
        }
    }

    pub fn network(&self) -> &TransitNetwork {
        &self.network
    }

    pub fn shared_network(&self) -> Arc<TransitNetwork> {
        Arc::clone(&self.network)
    }

    pub fn calculator(&self) -> Calculator<'_> {
        Calculator::new(&self.network)
    }

    pub fn stop_count(&self) -> usize {
        self.network.stop_count()
    }

    pub fn route_count(&self) -> usize {
        self.network.route_count()
    }

    pub fn trip_count(&self) -> usize {
        self.network.trip_count()
    }

    /// Metadata of the loaded feeds as a JSON array
    pub fn feeds_info(&self) -> String {
        serde_json::to_string(self.network.feeds_info()).unwrap_or_default()
    }
}

impl From<TransitNetwork> for TransitModel {
    fn from(network: TransitNetwork) -> Self {
        Self::from_network(network)
    }
}

impl fmt::Display for TransitModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransitModel with {} stops, {} routes and {} trips",
            self.stop_count(),
            self.route_count(),
            self.trip_count()
        )
    }
}
