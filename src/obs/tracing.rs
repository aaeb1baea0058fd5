// crates.io
use ::tracing::{Instrument, Span, instrument::Instrumented};
// self
use crate::{_prelude::*, obs::OperationKind};

/// A span builder used by broker operations.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	span: Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation kind + stage.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		let span = ::tracing::info_span!(
			"bankdata_broker.operation",
			operation = kind.as_str(),
			stage
		);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}
