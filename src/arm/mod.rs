//! Azure Resource Manager access.
//!
//! `ResourceManager` is the seam the shell talks to; `ArmClient` is the
//! REST implementation. Tests drive the shell through `memory::InMemoryManager`
//! and the client through `stub::StubServer`.

pub mod client;
pub mod credential;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod model;
#[cfg(test)]
pub mod stub;

pub use client::{ArmClient, ClientOptions};
pub use credential::DefaultCredential;
pub use error::{ArmError, ArmResult};
pub use model::{GenericResource, Location, ResourceGroup, Tags, TagsOperation, TagsPatch};

/// Resource group operations used by the shell and the one-shot commands.
pub trait ResourceManager {
    fn list_groups(&self) -> ArmResult<Vec<ResourceGroup>>;

    /// `true` when a group with this name exists in the subscription.
    fn group_exists(&self, name: &str) -> ArmResult<bool>;

    fn get_group(&self, name: &str) -> ArmResult<ResourceGroup>;

    fn create_group(&self, name: &str, location: &str) -> ArmResult<ResourceGroup>;

    /// Delete a group and everything in it; returns once the deletion finished.
    fn delete_group(&self, name: &str) -> ArmResult<()>;

    fn list_locations(&self) -> ArmResult<Vec<Location>>;

    /// Tags at a resource scope (a resource id such as a group's `id`).
    fn get_tags(&self, scope: &str) -> ArmResult<Tags>;

    fn patch_tags(&self, scope: &str, patch: &TagsPatch) -> ArmResult<Tags>;

    fn list_resources(&self, group: &str) -> ArmResult<Vec<GenericResource>>;
}
