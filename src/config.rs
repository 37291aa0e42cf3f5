// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        AccountRepository, AccountStore, ActionRepository, ActionStore, AgentRepository, AgentStore,
        AutomationRepository, CadenceRepository, MetricsRepository, PixRepository,
    },
    models::agent::AgentRole,
    services::{
        AccountService, ActionService, AutomationService, BoardService, CadenceService,
        DistributionService, GoogleSheetsClient, ImportService, MetricsService, PixService, SheetSource,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_CONTACT_GOAL: i32 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    // Papéis que recebem cobranças na redistribuição
    pub redistribution_roles: Vec<AgentRole>,
    pub daily_contact_goal: i32,
    pub google_sheets_api_key: Option<String>,
}

/// "admin, user" -> [Admin, User]
pub fn parse_roles(raw: &str) -> anyhow::Result<Vec<AgentRole>> {
    let mut roles = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let role: AgentRole = part.parse().map_err(anyhow::Error::msg)?;
        if !roles.contains(&role) {
            roles.push(role);
        }
    }
    if roles.is_empty() {
        anyhow::bail!("REDISTRIBUTION_ROLES não pode ser vazio");
    }
    Ok(roles)
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v.parse().context("DB_MAX_CONNECTIONS inválido")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let redistribution_roles = match lookup("REDISTRIBUTION_ROLES") {
            Some(v) => parse_roles(&v)?,
            None => vec![AgentRole::Admin, AgentRole::User],
        };
        let daily_contact_goal = match lookup("DAILY_CONTACT_GOAL") {
            Some(v) => v.parse().context("DAILY_CONTACT_GOAL inválido")?,
            None => DEFAULT_CONTACT_GOAL,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
            redistribution_roles,
            daily_contact_goal,
            google_sheets_api_key: lookup("GOOGLE_SHEETS_API_KEY").filter(|k| !k.is_empty()),
        })
    }
}

/// Stores por trás dos serviços principais. Em produção, todos Postgres.
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub actions: Arc<dyn ActionStore>,
    pub agents: Arc<dyn AgentStore>,
    pub sheets: Arc<dyn SheetSource>,
}

impl Stores {
    pub fn postgres(pool: &PgPool, config: &Config) -> Self {
        Self {
            accounts: Arc::new(AccountRepository::new(pool.clone())),
            actions: Arc::new(ActionRepository::new(pool.clone())),
            agents: Arc::new(AgentRepository::new(pool.clone())),
            sheets: Arc::new(GoogleSheetsClient::new(config.google_sheets_api_key.clone())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_secret: String,
    pub agent_store: Arc<dyn AgentStore>,
    pub account_service: AccountService,
    pub action_service: ActionService,
    pub board_service: BoardService,
    pub distribution_service: DistributionService,
    pub import_service: ImportService,
    pub automation_service: AutomationService,
    pub cadence_service: CadenceService,
    pub metrics_service: MetricsService,
    pub pix_service: PixService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let stores = Stores::postgres(&db_pool, config);
        Ok(Self::build(db_pool, config, stores))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(db_pool: PgPool, config: &Config, stores: Stores) -> Self {
        let Stores { accounts, actions, agents, sheets } = stores;

        Self {
            jwt_secret: config.jwt_secret.clone(),
            agent_store: agents.clone(),
            account_service: AccountService::new(accounts.clone()),
            action_service: ActionService::new(accounts.clone(), actions),
            board_service: BoardService::new(accounts.clone()),
            distribution_service: DistributionService::new(
                accounts.clone(),
                agents,
                config.redistribution_roles.clone(),
            ),
            import_service: ImportService::new(accounts.clone(), sheets),
            automation_service: AutomationService::new(
                AutomationRepository::new(db_pool.clone()),
                accounts.clone(),
            ),
            cadence_service: CadenceService::new(CadenceRepository::new(db_pool.clone())),
            metrics_service: MetricsService::new(
                MetricsRepository::new(db_pool.clone()),
                config.daily_contact_goal,
            ),
            pix_service: PixService::new(PixRepository::new(db_pool.clone()), accounts),
            db_pool,
        }
    }
}
