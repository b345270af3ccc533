use std::{sync::Arc, time::Duration};

use crate::engine::{Engine, RequestContext};

#[derive(Clone)]
pub struct ApiContext {
    pub engine: Arc<Engine>,
    request_timeout: Duration,
}

impl ApiContext {
    pub fn new(engine: Arc<Engine>, request_timeout: Duration) -> Self {
        Self {
            engine,
            request_timeout,
        }
    }

    /// A fresh [`RequestContext`] bounded by the configured request timeout.
    pub fn request(&self) -> RequestContext {
        RequestContext::new().with_timeout(self.request_timeout)
    }
}
