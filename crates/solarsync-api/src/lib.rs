// solarsync-api: async clients for solar monitoring vendors and the ingestion API

pub mod error;
pub mod ingest;
pub mod neteco;
pub mod transport;

pub use error::Error;
pub use ingest::{DeviceRegistration, IngestClient, LoggerPowerGen, PlantRegistration};
pub use neteco::NetEcoClient;
pub use neteco::models::{RawDevice, RawPlant, RawSunData, VendorResponse};
pub use transport::{TlsMode, TransportConfig};
