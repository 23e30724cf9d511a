//! Service modules for the schedule import workflow

pub mod batch_importer;
pub mod csv_reader;
pub mod job_orchestrator;
pub mod reference_loader;
pub mod remote_store;
pub mod rest_store;

pub use batch_importer::{CsvBatchImporter, ImportError, ImportOptions, ProgressSink};
pub use csv_reader::{CsvDocument, CsvReader};
pub use job_orchestrator::ImportJobOrchestrator;
pub use reference_loader::load_context;
pub use remote_store::{Reference, RemoteStore, StoreError};
pub use rest_store::RestStore;
