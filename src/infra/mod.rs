pub mod html_extractor;
pub mod http_client;

pub use html_extractor::HtmlJobExtractor;
pub use http_client::ReqwestHttp;
