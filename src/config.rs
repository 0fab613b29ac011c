// src/config.rs

use std::{env, net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use chrono::FixedOffset;
use sqlx::postgres::PgPoolOptions;

use crate::{
    common::CompanyCalendar,
    db::{EventStore, InMemoryEventStore, PgEventStore},
    services::{
        auth::TokenVerifier, reconciliation::WorkPolicy, AttendanceService, TimeClockService,
    },
};

/// Configuração lida das variáveis de ambiente (e do .env, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub jwt_secret: String,
    pub database_url: Option<String>,
    pub server_addr: SocketAddr,
    pub company_offset: FixedOffset,
    pub standard_work_minutes: u32,
    pub db_max_connections: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let server_addr = env_or("SERVER_ADDR", "0.0.0.0:3000")
            .parse()
            .context("SERVER_ADDR inválido")?;
        let company_offset = env_or("COMPANY_UTC_OFFSET", "+00:00")
            .parse::<FixedOffset>()
            .context("COMPANY_UTC_OFFSET deve estar no formato +HH:MM")?;
        let standard_work_minutes = parse_standard_work_minutes(&env_or("STANDARD_WORK_MINUTES", "480"))?;
        let db_max_connections = env_or("DB_MAX_CONNECTIONS", "5")
            .parse()
            .context("DB_MAX_CONNECTIONS deve ser um inteiro positivo")?;

        Ok(Self {
            jwt_secret,
            database_url,
            server_addr,
            company_offset,
            standard_work_minutes,
            db_max_connections,
        })
    }

    pub fn calendar(&self) -> CompanyCalendar {
        CompanyCalendar::new(self.company_offset)
    }

    pub fn work_policy(&self) -> WorkPolicy {
        WorkPolicy {
            standard_work_minutes: self.standard_work_minutes,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

// Uma jornada cabe em um dia: 1..=1440 minutos
fn parse_standard_work_minutes(raw: &str) -> anyhow::Result<u32> {
    let minutes: u32 = raw
        .trim()
        .parse()
        .context("STANDARD_WORK_MINUTES deve ser um inteiro positivo")?;
    if !(1..=MINUTES_PER_DAY).contains(&minutes) {
        anyhow::bail!("STANDARD_WORK_MINUTES deve estar entre 1 e {MINUTES_PER_DAY}, recebido {minutes}");
    }
    Ok(minutes)
}

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub token_verifier: TokenVerifier,
    pub time_clock_service: TimeClockService,
    pub attendance_service: AttendanceService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn EventStore> = match &settings.database_url {
            Some(database_url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(settings.db_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await
                    .context("Falha ao conectar no banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgEventStore::new(pool))
            }
            None => {
                tracing::warn!("DATABASE_URL não definida: usando armazenamento em memória (dados se perdem ao reiniciar)");
                Arc::new(InMemoryEventStore::new())
            }
        };

        Ok(Self::with_store(store, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(store: Arc<dyn EventStore>, settings: Settings) -> Self {
        let calendar = settings.calendar();
        let attendance_service = AttendanceService::new(store.clone(), calendar, settings.work_policy());
        let time_clock_service = TimeClockService::new(store, calendar, attendance_service.clone());
        let token_verifier = TokenVerifier::new(&settings.jwt_secret);

        Self {
            settings: Arc::new(settings),
            token_verifier,
            time_clock_service,
            attendance_service,
        }
    }
}
