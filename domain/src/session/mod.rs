//! Inference session domain.
//!
//! - [`stream::StreamEvent`]: one event of a streaming model response
//! - [`stream::PullProgress`]: one status update of a model download

pub mod stream;
