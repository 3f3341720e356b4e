use std::sync::Arc;

use paperlens::service::ResearchService;
use paperlens::session::SessionStore;
use paperlens::source::PaperSource;

use super::render::Renderer;

pub struct HandlerState<S: PaperSource + 'static> {
    pub service: Arc<ResearchService<S>>,

    pub sessions: SessionStore,

    pub renderer: Arc<Renderer>,
}

impl<S: PaperSource + 'static> Clone for HandlerState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: self.sessions.clone(),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

impl<S: PaperSource + 'static> HandlerState<S> {
    pub fn new(
        service: Arc<ResearchService<S>>,
        sessions: SessionStore,
        renderer: Arc<Renderer>,
    ) -> Self {
        Self {
            service,
            sessions,
            renderer,
        }
    }
}
