//! Background calls to the chef.
//!
//! Each request runs on its own thread with the blocking client; replies come back over
//! one channel that the UI thread drains between commands.
use crate::cafe::evaluator::MathEngine;
use crate::cafe::service::ChefService;
use crate::cafe::session::{CafeSession, ServiceOutcome, ServiceReply, ServiceRequest};
use log::{debug, warn};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Runs one request to completion on the calling thread.
pub fn fulfil(chef: &dyn ChefService, request: ServiceRequest) -> ServiceReply {
    match request {
        ServiceRequest::Explain {
            seq,
            kind,
            expression,
            results,
        } => ServiceReply {
            seq,
            outcome: ServiceOutcome::Explanation(chef.explain(kind, &expression, &results)),
        },
        ServiceRequest::ExtractExpression {
            seq,
            image_base64,
            mime,
        } => ServiceReply {
            seq,
            outcome: ServiceOutcome::Expression(chef.analyze_image(&image_base64, &mime)),
        },
    }
}

pub struct ServiceWorker {
    chef: Arc<dyn ChefService>,
    tx: Sender<ServiceReply>,
    rx: Receiver<ServiceReply>,
}

impl ServiceWorker {
    pub fn new(chef: Arc<dyn ChefService>) -> Self {
        let (tx, rx) = mpsc::channel();
        ServiceWorker { chef, tx, rx }
    }

    pub fn submit(&self, request: ServiceRequest) -> JoinHandle<()> {
        let chef = Arc::clone(&self.chef);
        let tx = self.tx.clone();
        debug!("submitting request #{}", request.seq());
        thread::spawn(move || {
            let reply = fulfil(chef.as_ref(), request);
            // the receiver is gone only when the session has ended
            let _ = tx.send(reply);
        })
    }

    /// Every reply that has already arrived.
    pub fn try_drain(&self) -> Vec<ServiceReply> {
        self.rx.try_iter().collect()
    }

    /// Next reply, waiting at most `timeout`.
    pub fn wait_next(&self, timeout: Duration) -> Option<ServiceReply> {
        match self.rx.recv_timeout(timeout) {
            Ok(reply) => Some(reply),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Applies replies to `session` and sends their follow-ups until nothing is due.
    /// Returns `false` when a reply did not come within `timeout`.
    pub fn settle<E: MathEngine>(&self, session: &mut CafeSession<E>, timeout: Duration) -> bool {
        for reply in self.try_drain() {
            if let Some(follow_up) = session.apply_reply(reply) {
                self.submit(follow_up);
            }
        }
        while session.is_loading() {
            match self.wait_next(timeout) {
                Some(reply) => {
                    if let Some(follow_up) = session.apply_reply(reply) {
                        self.submit(follow_up);
                    }
                }
                None => {
                    warn!("the chef is taking too long, carrying on");
                    return false;
                }
            }
        }
        true
    }
}
