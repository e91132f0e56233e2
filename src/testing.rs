//! Fixtures shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use async_trait::async_trait;

use crate::app::{DomEvent, EventKind, route};
use crate::dom::{Document, Element, MemoryDocument, MemoryElement};
use crate::errors::ActionError;
use crate::handlers;
use crate::state::AppState;
use crate::timer::ManualTimer;
use crate::transport::{CsrfHeader, Reply, RequestBody, Transport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: &'static str,
    pub url: String,
    pub body: Option<RequestBody>,
    pub csrf: Option<CsrfHeader>,
}

/// How a watched element looked when a request left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub loading: bool,
    pub disabled: bool,
    pub inner_html: String,
}

/// Replays queued replies and records every request.
#[derive(Default)]
pub struct StubTransport {
    replies: RefCell<VecDeque<Result<Reply, ActionError>>>,
    requests: RefCell<Vec<Recorded>>,
    watched: RefCell<Option<MemoryElement>>,
    in_flight: RefCell<Vec<InFlight>>,
}

impl StubTransport {
    pub fn reply(&self, status: u16, body: &str) {
        self.replies.borrow_mut().push_back(Ok(Reply {
            status,
            body: body.to_string(),
        }));
    }

    pub fn fail(&self, reason: &str) {
        self.replies
            .borrow_mut()
            .push_back(Err(ActionError::Transport(reason.to_string())));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.borrow().clone()
    }

    /// Captures `element` each time a request is sent.
    pub fn watch(&self, element: &MemoryElement) {
        *self.watched.borrow_mut() = Some(element.clone());
    }

    pub fn in_flight(&self) -> Vec<InFlight> {
        self.in_flight.borrow().clone()
    }

    fn next(&self, recorded: Recorded) -> Result<Reply, ActionError> {
        if let Some(element) = self.watched.borrow().as_ref() {
            self.in_flight.borrow_mut().push(InFlight {
                loading: element.has_class("loading"),
                disabled: element.is_disabled(),
                inner_html: element.inner_html(),
            });
        }
        self.requests.borrow_mut().push(recorded);
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ActionError::Transport("no stub reply queued".to_string())))
    }
}

#[async_trait(?Send)]
impl Transport for StubTransport {
    async fn get(&self, url: &str) -> Result<Reply, ActionError> {
        self.next(Recorded {
            method: "GET",
            url: url.to_string(),
            body: None,
            csrf: None,
        })
    }

    async fn post(
        &self,
        url: &str,
        body: RequestBody,
        csrf: Option<CsrfHeader>,
    ) -> Result<Reply, ActionError> {
        self.next(Recorded {
            method: "POST",
            url: url.to_string(),
            body: Some(body),
            csrf,
        })
    }
}

pub struct Harness {
    pub doc: Rc<MemoryDocument>,
    pub transport: Rc<StubTransport>,
    pub timer: Rc<ManualTimer>,
    pub state: AppState<MemoryDocument>,
}

impl Harness {
    pub fn new(html: &str) -> Self {
        let doc = Rc::new(MemoryDocument::parse(html));
        let transport = Rc::new(StubTransport::default());
        let timer = Rc::new(ManualTimer::new());
        let state = AppState::new(doc.clone(), transport.clone(), timer.clone());
        Self {
            doc,
            transport,
            timer,
            state,
        }
    }

    pub fn el(&self, selector: &str) -> MemoryElement {
        self.doc
            .query(selector)
            .unwrap_or_else(|| panic!("no element matches `{selector}`"))
    }

    /// Routes the event and runs every resulting action to completion.
    /// Returns whether the default action was prevented.
    pub async fn fire(&self, kind: EventKind, selector: &str) -> bool {
        let dispatch = route(&self.state, &DomEvent::new(kind, self.el(selector)));
        for action in dispatch.actions {
            handlers::run(&self.state, action).await;
        }
        dispatch.prevent_default
    }
}
