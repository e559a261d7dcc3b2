//! Chain composition and the dispatcher builder.
//!
//! The interceptor list is fixed when the dispatcher is built and immutable
//! afterwards. A dispatcher holds no per-send state, so one instance can
//! serve any number of concurrent `send` calls independently.

use crate::dispatch::interceptor::{Interceptor, Next};
use crate::dispatch::transport::Transport;
use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

use std::fmt;
use std::sync::Arc;

/// Applies the configured interceptors around the terminal transport call.
///
/// Built via [`Dispatcher::builder`]:
///
/// ```rust,no_run
/// # use catena::dispatch::{Dispatcher, Transport};
/// # fn demo(transport: impl Transport + 'static) {
/// let dispatcher = Dispatcher::builder(transport)
///     .interceptor(catena::retry::RetryPolicy::new())
///     .build();
/// # }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    interceptors: Arc<[Arc<dyn Interceptor>]>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.interceptors.iter().map(|i| i.name()).collect();
        f.debug_struct("Dispatcher")
            .field("interceptors", &names)
            .finish()
    }
}

impl Dispatcher {
    /// Starts building a dispatcher around the given transport.
    pub fn builder(transport: impl Transport + 'static) -> DispatcherBuilder {
        DispatcherBuilder {
            transport: Arc::new(transport),
            interceptors: Vec::new(),
        }
    }

    /// Number of configured interceptors.
    pub fn interceptor_count(&self) -> usize {
        self.interceptors.len()
    }

    /// Sends `request` down the chain and returns the response that came
    /// back up.
    ///
    /// Failures are wrapped exactly once into [`crate::Error::Request`] with
    /// the method, target, body presence, any obtained response status, and
    /// a cause naming the failing interceptor or the transport.
    pub async fn send(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let target = request.target().clone();
        tracing::debug!(%method, %target, interceptors = self.interceptors.len(), "dispatching request");
        let outcome = Next::new(&*self.transport, &self.interceptors)
            .run(request)
            .await;
        match &outcome {
            Ok(response) => {
                tracing::debug!(%method, %target, status = %response.status(), "request completed")
            }
            Err(err) => tracing::warn!(%method, %target, error = %err, "request failed"),
        }
        outcome
    }
}

/// A builder used to create a [`Dispatcher`].
pub struct DispatcherBuilder {
    transport: Arc<dyn Transport>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl DispatcherBuilder {
    /// Appends an interceptor. Registration order is invocation order on
    /// the way down the chain.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends an already-shared interceptor.
    pub fn interceptor_arc(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Finalizes the dispatcher. The interceptor list is immutable from
    /// here on.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            transport: self.transport,
            interceptors: self.interceptors.into(),
        }
    }
}
