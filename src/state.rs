use std::rc::Rc;

use crate::config::BinderConfig;
use crate::dom::Document;
use crate::notify::{Severity, show_notification};
use crate::timer::Timer;
use crate::transport::Transport;

/// Optional tooltip integration supplied by the page's visual framework.
pub trait Tooltips<E> {
    fn attach(&self, element: &E);
}

/// Everything a handler may touch. Built once at bind time and cloned into
/// each delegated listener.
pub struct AppState<D: Document> {
    pub doc: Rc<D>,
    pub transport: Rc<dyn Transport>,
    pub timer: Rc<dyn Timer>,
    pub tooltips: Option<Rc<dyn Tooltips<D::Element>>>,
    pub config: Rc<BinderConfig>,
}

impl<D: Document> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            doc: Rc::clone(&self.doc),
            transport: Rc::clone(&self.transport),
            timer: Rc::clone(&self.timer),
            tooltips: self.tooltips.clone(),
            config: Rc::clone(&self.config),
        }
    }
}

impl<D: Document> AppState<D> {
    /// State configured from the page's config block.
    pub fn new(doc: Rc<D>, transport: Rc<dyn Transport>, timer: Rc<dyn Timer>) -> Self {
        let config = BinderConfig::from_page(doc.as_ref());
        Self {
            doc,
            transport,
            timer,
            tooltips: None,
            config: Rc::new(config),
        }
    }

    pub fn with_config(mut self, config: BinderConfig) -> Self {
        self.config = Rc::new(config);
        self
    }

    pub fn with_tooltips(mut self, tooltips: Rc<dyn Tooltips<D::Element>>) -> Self {
        self.tooltips = Some(tooltips);
        self
    }

    pub fn notify(&self, message: &str, severity: Severity) -> Option<D::Element> {
        show_notification(
            self.doc.as_ref(),
            &self.timer,
            self.config.timing.notification_ttl(),
            message,
            severity,
        )
    }
}
