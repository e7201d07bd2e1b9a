//! Bridge to the operating system resolver over native messaging.
pub mod bridge;
pub mod codec;
pub mod host;
pub mod messenger;

pub use bridge::NativeResolverBridge;
pub use codec::{read_frame, read_message, write_frame, write_message, FrameError};
pub use host::NativeHost;
pub use messenger::{InProcessMessenger, NativeMessenger, ProcessMessenger};
