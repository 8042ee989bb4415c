//! Directory provisioning services.

mod onboarding;

pub use onboarding::{DirectoryService, DirectoryServiceError, DirectoryServiceResult};
