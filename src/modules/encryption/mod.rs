mod registry;
mod scheme;
mod transforms;

pub use registry::{registry, TransformRegistry};
pub use scheme::Scheme;
pub use transforms::{
    Base64Transform, Md5Transform, PasswordTransform, ReverseTransform, SaltedSha256Transform,
    TransformError,
};
