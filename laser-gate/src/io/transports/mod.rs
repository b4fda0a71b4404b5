pub use http::HttpTransport;

mod http;
