//! GL-side rendering: device abstraction, resource wrappers, frame driver.
//!
//! Every GPU call goes through the narrow [`device::GlApi`] trait so the
//! resource logic can run headless against [`backend::dummy::DummyBackend`]
//! in tests; [`backend::glow_backend::GlowBackend`] is the real thing.

pub mod backend;
pub mod device;
pub mod error;
pub mod framebuffer;
pub mod model;
pub mod scene;
pub mod shader;
pub mod texture;

pub use backend::dummy::DummyBackend;
pub use backend::glow_backend::GlowBackend;
pub use device::GlApi;
pub use error::DeviceError;
