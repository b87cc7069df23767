pub mod gemini_client;

pub use gemini_client::{init_backend, BackendAvailability, GeminiBackend, GenerativeBackend};
