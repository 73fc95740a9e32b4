//! Outbound HTTP: transport seam, retry policy and the retrying invoker

mod invoker;
mod mock;
mod retry;
mod transport;

pub use invoker::RetryingHttpInvoker;
pub use mock::{MockReply, MockTransport};
pub use retry::{RetryPolicy, DEFAULT_RETRYABLE_STATUSES};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
