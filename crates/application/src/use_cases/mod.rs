pub mod handle_message;
pub mod public_ip;
pub mod resolve;

pub use handle_message::{
    HandleMessageUseCase, Request, RequestEnvelope, Response, ResponseEnvelope, TabDataView,
};
pub use public_ip::PublicIpDetector;
pub use resolve::ResolveDomainUseCase;
