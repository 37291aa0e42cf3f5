pub mod account_repo;
pub use account_repo::{AccountRepository, AccountStore};
pub mod action_repo;
pub use action_repo::{ActionRepository, ActionStore};
pub mod agent_repo;
pub use agent_repo::{AgentRepository, AgentStore};
pub mod automation_repo;
pub use automation_repo::AutomationRepository;
pub mod cadence_repo;
pub use cadence_repo::CadenceRepository;
pub mod metrics_repo;
pub use metrics_repo::MetricsRepository;
pub mod pix_repo;
pub use pix_repo::PixRepository;
