// src/application/state.rs
//
// Application state shared by every command.
//
// All services are Arc-wrapped and built once per process. The exchange
// rate is fetched here, once, and stays fixed for the process lifetime.

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::broadcast;

use crate::application::dto::ProgressDto;
use crate::config::AppConfig;
use crate::domain::MechanicsVocabulary;
use crate::error::AppResult;
use crate::events::{create_event_bus, CardPageRendered, EventBus};
use crate::infrastructure::{DocumentStore, ImageCache};
use crate::integrations::{
    fetch_usd_to_eur, AdviceProvider, CardCatalog, ChatAdvisor, RateLimitedClient,
    ReqwestTransport, ScryfallGateway, StaticAdvice,
};
use crate::services::{MechanicsService, RenderJobService};

/// Buffered progress ticks per subscriber before the oldest are dropped.
const PROGRESS_CAPACITY: usize = 64;

pub struct AppState {
    pub config: AppConfig,
    pub event_bus: Arc<EventBus>,
    pub document_store: DocumentStore,
    pub render_service: Arc<RenderJobService>,
    pub mechanics_service: Arc<MechanicsService>,
    progress: broadcast::Sender<ProgressDto>,
}

impl AppState {
    /// Builds the production wiring: reqwest transport, rate-limited
    /// client, card-data gateway and chat advisor.
    pub async fn initialize(config: AppConfig) -> AppResult<Self> {
        let vocabulary = Arc::new(MechanicsVocabulary::load_or_bundled(
            config.vocabulary_path.as_deref(),
        )?);
        info!("Loaded {} mechanics", vocabulary.len());

        let transport = Arc::new(ReqwestTransport::new()?);
        let client = Arc::new(RateLimitedClient::new(transport, config.rate_limit.clone()));
        let usd_to_eur = fetch_usd_to_eur(
            &client,
            &config.exchange_rate_url,
            config.default_usd_to_eur,
        )
        .await;
        info!("USD → EUR rate for this session: {}", usd_to_eur);

        let images = ImageCache::new(&config.image_cache_dir);
        if let Err(e) = images.ensure_dir() {
            warn!("Image cache unavailable, images will be skipped: {}", e);
        }

        let catalog: Arc<dyn CardCatalog> = Arc::new(ScryfallGateway::new(
            client,
            config.card_api_base_url.clone(),
            config.localized_language.clone(),
            images,
            usd_to_eur,
        ));

        let advisor: Arc<dyn AdviceProvider> = match ChatAdvisor::new(config.advice.clone()) {
            Ok(advisor) => Arc::new(advisor),
            Err(e) => {
                warn!("Advice service unavailable, using the fixed suggestion: {}", e);
                Arc::new(StaticAdvice::fallback())
            }
        };

        Ok(Self::with_components(config, catalog, advisor, vocabulary))
    }

    /// Wires the services around already-built collaborators.
    pub fn with_components(
        config: AppConfig,
        catalog: Arc<dyn CardCatalog>,
        advisor: Arc<dyn AdviceProvider>,
        vocabulary: Arc<MechanicsVocabulary>,
    ) -> Self {
        let event_bus = Arc::new(create_event_bus());
        let document_store = DocumentStore::new(&config.documents_dir);

        let render_service = Arc::new(RenderJobService::new(
            catalog.clone(),
            advisor,
            vocabulary.clone(),
            document_store.clone(),
            event_bus.clone(),
            config.mana_symbols_dir.clone(),
        ));
        let mechanics_service = Arc::new(MechanicsService::new(catalog, vocabulary));

        let (progress, _) = broadcast::channel(PROGRESS_CAPACITY);
        let forward = progress.clone();
        event_bus.subscribe::<CardPageRendered, _>(move |event| {
            // No receivers is fine: nobody is watching this job.
            let _ = forward.send(ProgressDto::from(event));
        });

        Self {
            config,
            event_bus,
            document_store,
            render_service,
            mechanics_service,
            progress,
        }
    }

    /// Progress ticks of every render job started after this call.
    pub fn subscribe_progress(&self) -> broadcast::Receiver<ProgressDto> {
        self.progress.subscribe()
    }
}
