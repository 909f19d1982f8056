pub mod api_gateway;

pub use api_gateway::{ApiGateway, ApiRequest};
