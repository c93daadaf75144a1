pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle, MAX_HEADERS};
pub use request::{parse_body, parse_query_params, parse_request, ParsedRequest, RequestBody};
pub use response::write_handler_response;
pub use service::AppService;
