//! Per-call mock/live dispatch shared by every domain facade.
//!
//! [`DataRouter::run`] is the only place the mode is resolved. It resolves
//! exactly once, before the operation body runs, and hands the body a
//! [`Route`] fixed for the rest of the call. A mode toggle that lands while
//! the body is suspended therefore cannot split one operation across both
//! data paths.

use std::future::Future;
use std::sync::Arc;

use backoffice_core::Mode;
use metrics::counter;
use tracing::{debug, info_span, warn, Instrument};

use crate::error::DataError;
use crate::mode::ModeStore;

/// Data path selected for one operation.
pub enum Route<'a, B: ?Sized> {
    /// Serve from the live backend.
    Live(&'a B),
    /// Serve from the simulation or local persistence.
    Mock,
}

impl<B: ?Sized> Route<'_, B> {
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self {
            Route::Live(_) => Mode::Live,
            Route::Mock => Mode::Mock,
        }
    }
}

/// Resolves the mode and instruments one facade call.
pub struct DataRouter<B: ?Sized> {
    domain: &'static str,
    mode: Arc<ModeStore>,
    live: Arc<B>,
}

impl<B: ?Sized> DataRouter<B> {
    #[must_use]
    pub fn new(domain: &'static str, mode: Arc<ModeStore>, live: Arc<B>) -> Self {
        Self { domain, mode, live }
    }

    #[must_use]
    pub fn domain(&self) -> &'static str {
        self.domain
    }

    #[must_use]
    pub fn mode_store(&self) -> &Arc<ModeStore> {
        &self.mode
    }

    /// Runs `body` on the data path selected by a single mode resolution.
    ///
    /// The body's result is returned unchanged; failures are counted by kind.
    ///
    /// # Errors
    ///
    /// Whatever `body` returns.
    pub async fn run<'a, T, F, Fut>(&'a self, op: &'static str, body: F) -> Result<T, DataError>
    where
        F: FnOnce(Route<'a, B>) -> Fut,
        Fut: Future<Output = Result<T, DataError>>,
    {
        let mode = self.mode.resolve().await;
        let route = match mode {
            Mode::Live => Route::Live(&*self.live),
            Mode::Mock => Route::Mock,
        };

        counter!(
            "backoffice_data_ops_total",
            "domain" => self.domain,
            "op" => op,
            "mode" => mode.as_str()
        )
        .increment(1);

        let span = info_span!("data_op", domain = self.domain, op, mode = mode.as_str());
        let result = async {
            debug!("dispatching data operation");
            body(route).await
        }
        .instrument(span)
        .await;

        if let Err(e) = &result {
            let kind = e.kind().as_str();
            counter!(
                "backoffice_data_op_errors_total",
                "domain" => self.domain,
                "op" => op,
                "kind" => kind
            )
            .increment(1);
            warn!(domain = self.domain, op, mode = %mode, kind, error = %e, "data operation failed");
        }
        result
    }
}

impl<B: ?Sized> std::fmt::Debug for DataRouter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataRouter")
            .field("domain", &self.domain)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
