// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parser initialization and scoped model handles.

use crate::api::{IfcApi, ModelId};
use crate::error::{Error, Result};
use std::sync::{Mutex, PoisonError};

/// Initialization state of the parser runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitState {
    #[default]
    Uninitialized,
    Ready,
    /// Last attempt failed; the next call retries
    Failed,
}

/// Owns a parser and its one-time initialization.
///
/// Construct one per process (or per worker) and share it by reference.
/// Initialization runs lazily on the first [`open`](Self::open); concurrent
/// callers serialize on the state lock, so `init` never runs twice once it
/// has succeeded.
pub struct ParserContext<P: IfcApi> {
    api: P,
    state: Mutex<InitState>,
}

impl<P: IfcApi> ParserContext<P> {
    /// Wrap a parser; nothing is initialized yet
    pub fn new(api: P) -> Self {
        Self {
            api,
            state: Mutex::new(InitState::Uninitialized),
        }
    }

    /// Current initialization state
    pub fn state(&self) -> InitState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The wrapped parser
    #[inline]
    pub fn api(&self) -> &P {
        &self.api
    }

    /// Run parser initialization unless it already succeeded.
    ///
    /// A failure is logged and leaves the state at [`InitState::Failed`];
    /// it does not poison the context.
    pub fn ensure_initialized(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == InitState::Ready {
            return Ok(());
        }

        match self.api.init() {
            Ok(()) => {
                *state = InitState::Ready;
                tracing::debug!("IFC parser initialized");
                Ok(())
            }
            Err(e) => {
                *state = InitState::Failed;
                tracing::error!(error = %e, "IFC parser initialization failed");
                Err(e)
            }
        }
    }

    /// Open a model, initializing the parser first if needed.
    ///
    /// The returned guard closes the model when dropped.
    pub fn open(&self, data: &[u8]) -> Result<ModelGuard<'_, P>> {
        // Logged inside; opening cannot proceed without a runtime
        if self.ensure_initialized().is_err() {
            return Err(Error::NotInitialized);
        }

        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        let model = self.api.open_model(data)?;
        tracing::debug!(model = model.0, size = data.len(), "Opened IFC model");
        Ok(ModelGuard::new(&self.api, model))
    }
}

/// An opened model, closed exactly once when the guard goes away
pub struct ModelGuard<'a, P: IfcApi> {
    api: &'a P,
    model: ModelId,
    closed: bool,
}

impl<'a, P: IfcApi> ModelGuard<'a, P> {
    fn new(api: &'a P, model: ModelId) -> Self {
        Self {
            api,
            model,
            closed: false,
        }
    }

    #[inline]
    pub fn id(&self) -> ModelId {
        self.model
    }

    #[inline]
    pub fn api(&self) -> &'a P {
        self.api
    }

    /// Close now instead of at drop
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.closed {
            self.closed = true;
            self.api.close_model(self.model);
            tracing::debug!(model = self.model.0, "Closed IFC model");
        }
    }
}

impl<P: IfcApi> Drop for ModelGuard<'_, P> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MeshStream;
    use std::cell::Cell;

    /// Parser that fails `init` a configurable number of times
    #[derive(Default)]
    struct CountingApi {
        init_failures_left: Cell<u32>,
        init_calls: Cell<u32>,
        open_calls: Cell<u32>,
        close_calls: Cell<u32>,
        reject_open: bool,
    }

    impl IfcApi for CountingApi {
        type Geometry = ();

        fn init(&self) -> Result<()> {
            self.init_calls.set(self.init_calls.get() + 1);
            let left = self.init_failures_left.get();
            if left > 0 {
                self.init_failures_left.set(left - 1);
                return Err(Error::InitFailed("runtime missing".into()));
            }
            Ok(())
        }

        fn open_model(&self, _data: &[u8]) -> Result<ModelId> {
            self.open_calls.set(self.open_calls.get() + 1);
            if self.reject_open {
                return Err(Error::OpenFailed("not an IFC file".into()));
            }
            Ok(ModelId(7))
        }

        fn stream_all_meshes(&self, _model: ModelId) -> MeshStream<'_> {
            Box::new(std::iter::empty())
        }

        fn get_geometry(&self, _model: ModelId, _geometry_id: u32) -> Option<()> {
            None
        }

        fn vertex_array(&self, _geometry: &()) -> Vec<f32> {
            Vec::new()
        }

        fn index_array(&self, _geometry: &()) -> Vec<u32> {
            Vec::new()
        }

        fn close_model(&self, _model: ModelId) {
            self.close_calls.set(self.close_calls.get() + 1);
        }
    }

    #[test]
    fn test_init_runs_once() {
        let context = ParserContext::new(CountingApi::default());
        assert_eq!(context.state(), InitState::Uninitialized);

        context.ensure_initialized().unwrap();
        context.ensure_initialized().unwrap();
        drop(context.open(b"ISO-10303-21;").unwrap());

        assert_eq!(context.state(), InitState::Ready);
        assert_eq!(context.api().init_calls.get(), 1);
    }

    #[test]
    fn test_failed_init_is_retried() {
        let api = CountingApi::default();
        api.init_failures_left.set(1);
        let context = ParserContext::new(api);

        assert!(matches!(
            context.open(b"ISO-10303-21;"),
            Err(Error::NotInitialized)
        ));
        assert_eq!(context.state(), InitState::Failed);
        assert_eq!(context.api().open_calls.get(), 0);

        let model = context.open(b"ISO-10303-21;").unwrap();
        assert_eq!(model.id(), ModelId(7));
        assert_eq!(context.state(), InitState::Ready);
        assert_eq!(context.api().init_calls.get(), 2);
    }

    #[test]
    fn test_guard_closes_once() {
        let context = ParserContext::new(CountingApi::default());

        {
            let _model = context.open(b"data").unwrap();
        }
        assert_eq!(context.api().close_calls.get(), 1);

        let model = context.open(b"data").unwrap();
        model.close();
        assert_eq!(context.api().close_calls.get(), 2);
    }

    #[test]
    fn test_open_failure_closes_nothing() {
        let context = ParserContext::new(CountingApi {
            reject_open: true,
            ..Default::default()
        });

        let result = context.open(b"garbage");
        assert!(matches!(result, Err(Error::OpenFailed(_))));
        assert_eq!(context.api().close_calls.get(), 0);
    }

    #[test]
    fn test_empty_input_rejected() {
        let context = ParserContext::new(CountingApi::default());

        assert!(matches!(context.open(&[]), Err(Error::EmptyInput)));
        assert_eq!(context.api().open_calls.get(), 0);
    }
}
