pub mod account_service;
pub use account_service::AccountService;
pub mod action_service;
pub use action_service::ActionService;
pub mod automation_service;
pub use automation_service::AutomationService;
pub mod board_service;
pub use board_service::BoardService;
pub mod cadence_service;
pub use cadence_service::CadenceService;
pub mod delinquency;
pub mod distribution_service;
pub use distribution_service::DistributionService;
pub mod import_service;
pub use import_service::{GoogleSheetsClient, ImportService, SheetSource};
pub mod metrics_service;
pub use metrics_service::MetricsService;
pub mod pix_service;
pub use pix_service::PixService;

#[cfg(test)]
pub mod test_support;
