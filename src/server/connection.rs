//! One request per connection: frame, parse, dispatch, serialize, write.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Instant;

use super::error::FramingError;
use super::framing::MessageReader;
use super::request::parse_request;
use super::response::{serialize_response, write_response};
use crate::dispatcher::{Dispatcher, Response};
use crate::ids::ConnectionId;
use crate::logger::{Logger, PerfStatus};

/// Everything a connection coroutine needs, shared across all of them
#[derive(Clone)]
pub struct ConnectionHandler {
    dispatcher: Dispatcher,
    reader: MessageReader,
    logger: Arc<dyn Logger>,
}

impl ConnectionHandler {
    #[must_use]
    pub fn new(dispatcher: Dispatcher, reader: MessageReader, logger: Arc<dyn Logger>) -> Self {
        Self {
            dispatcher,
            reader,
            logger,
        }
    }

    #[must_use]
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Serve exactly one request on `stream`.
    ///
    /// Framing and parse failures are logged and answered with the empty
    /// default response. A peer that connects and closes without sending
    /// anything gets no response. Write failures are logged, never retried.
    pub fn serve<S: Read + Write>(&self, stream: &mut S, peer: &str) {
        let start = Instant::now();
        let id = ConnectionId::new();

        let message = match self.reader.read_message(stream) {
            Ok(message) => Some(message),
            Err(FramingError::ConnectionClosed { received: 0 }) => {
                self.logger.debug(
                    "ServerCore",
                    &format!("[{id}] {peer} closed without sending a request"),
                );
                return;
            }
            Err(e) => {
                self.logger.error("ServerCore", &format!("[{id}] {peer}: {e}"));
                None
            }
        };

        let mut protocol = String::new();
        let mut accept: Option<String> = None;
        let mut line = String::from("-");

        let response = match message.as_ref().map(parse_request) {
            Some(Ok(request)) => {
                protocol.clone_from(&request.protocol);
                accept = request.header("Accept").map(str::to_string);
                line = format!("{} - {{{{ {} }}}}", request.method, request.path);
                self.dispatcher.dispatch(request)
            }
            Some(Err(e)) => {
                self.logger.error("ServerCore", &format!("[{id}] {peer}: {e}"));
                Response::empty()
            }
            None => Response::empty(),
        };

        let status_code = response.status_code.unwrap_or(200);
        let bytes = serialize_response(response, &protocol, accept.as_deref());
        if let Err(e) = write_response(stream, &bytes) {
            self.logger.error(
                "ServerCore",
                &format!("[{id}] Error writing response to {peer}: {e}"),
            );
        }

        self.logger.perf_log(
            "RequestHandler",
            &format!("{peer} ==> {line}"),
            start.elapsed(),
            perf_status(status_code),
        );
    }
}

fn perf_status(status_code: u16) -> PerfStatus {
    match status_code {
        0..=399 => PerfStatus::Ok,
        400..=499 => PerfStatus::Warn,
        _ => PerfStatus::Error,
    }
}
