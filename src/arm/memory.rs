//! In-memory `ResourceManager` for driving the shell in tests.

use std::cell::RefCell;
use std::collections::BTreeMap;

use super::error::{ArmError, ArmResult};
use super::model::{GenericResource, Location, ResourceGroup, Tags, TagsOperation, TagsPatch};
use super::ResourceManager;

#[derive(Default)]
struct State {
    /// Keyed by lower-cased name; group names are case-insensitive.
    groups: BTreeMap<String, ResourceGroup>,
    resources: BTreeMap<String, Vec<GenericResource>>,
    locations: Vec<Location>,
    failing: Option<&'static str>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct InMemoryManager {
    state: RefCell<State>,
}

impl InMemoryManager {
    pub fn new() -> Self {
        let mgr = Self::default();
        mgr.state.borrow_mut().locations = ["westeurope", "northeurope", "eastus"]
            .into_iter()
            .map(|n| Location {
                name: n.to_string(),
                display_name: None,
            })
            .collect();
        mgr
    }

    pub fn with_group(self, name: &str, location: &str, tags: &[(&str, &str)]) -> Self {
        let tags: Tags = tags
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.state.borrow_mut().groups.insert(
            name.to_ascii_lowercase(),
            ResourceGroup {
                id: group_id(name),
                name: name.to_string(),
                location: location.to_string(),
                tags: (!tags.is_empty()).then_some(tags),
                properties: None,
            },
        );
        self
    }

    pub fn with_resource(self, group: &str, name: &str, kind: &str) -> Self {
        self.state
            .borrow_mut()
            .resources
            .entry(group.to_ascii_lowercase())
            .or_default()
            .push(GenericResource {
                id: format!("{}/providers/{kind}/{name}", group_id(group)),
                name: name.to_string(),
                kind: kind.to_string(),
                location: None,
                created_time: None,
                changed_time: None,
            });
        self
    }

    /// Make the named operation fail with an API error.
    pub fn failing(self, operation: &'static str) -> Self {
        self.state.borrow_mut().failing = Some(operation);
        self
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.state
            .borrow()
            .groups
            .contains_key(&name.to_ascii_lowercase())
    }

    pub fn group(&self, name: &str) -> Option<ResourceGroup> {
        self.state
            .borrow()
            .groups
            .get(&name.to_ascii_lowercase())
            .cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn enter(&self, operation: &'static str, arg: &str) -> ArmResult<()> {
        let mut st = self.state.borrow_mut();
        st.calls.push(format!("{operation}({arg})"));
        if st.failing == Some(operation) {
            return Err(ArmError::api(500, "InternalServerError", format!("{operation} failed")));
        }
        Ok(())
    }

    fn find_by_scope<'a>(st: &'a mut State, scope: &str) -> ArmResult<&'a mut ResourceGroup> {
        st.groups
            .values_mut()
            .find(|g| g.id.eq_ignore_ascii_case(scope))
            .ok_or_else(|| ArmError::api(404, "ResourceNotFound", format!("scope {scope} not found")))
    }
}

fn group_id(name: &str) -> String {
    format!("/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/{name}")
}

fn not_found(name: &str) -> ArmError {
    ArmError::api(
        404,
        "ResourceGroupNotFound",
        format!("Resource group '{name}' could not be found."),
    )
}

impl ResourceManager for InMemoryManager {
    fn list_groups(&self) -> ArmResult<Vec<ResourceGroup>> {
        self.enter("list_groups", "")?;
        Ok(self.state.borrow().groups.values().cloned().collect())
    }

    fn group_exists(&self, name: &str) -> ArmResult<bool> {
        self.enter("group_exists", name)?;
        Ok(self.has_group(name))
    }

    fn get_group(&self, name: &str) -> ArmResult<ResourceGroup> {
        self.enter("get_group", name)?;
        self.group(name).ok_or_else(|| not_found(name))
    }

    fn create_group(&self, name: &str, location: &str) -> ArmResult<ResourceGroup> {
        self.enter("create_group", name)?;
        let rg = ResourceGroup {
            id: group_id(name),
            name: name.to_string(),
            location: location.to_string(),
            tags: None,
            properties: None,
        };
        self.state
            .borrow_mut()
            .groups
            .insert(name.to_ascii_lowercase(), rg.clone());
        Ok(rg)
    }

    fn delete_group(&self, name: &str) -> ArmResult<()> {
        self.enter("delete_group", name)?;
        let mut st = self.state.borrow_mut();
        st.resources.remove(&name.to_ascii_lowercase());
        st.groups
            .remove(&name.to_ascii_lowercase())
            .map(|_| ())
            .ok_or_else(|| not_found(name))
    }

    fn list_locations(&self) -> ArmResult<Vec<Location>> {
        self.enter("list_locations", "")?;
        Ok(self.state.borrow().locations.clone())
    }

    fn get_tags(&self, scope: &str) -> ArmResult<Tags> {
        self.enter("get_tags", scope)?;
        let mut st = self.state.borrow_mut();
        Ok(Self::find_by_scope(&mut st, scope)?
            .tags
            .clone()
            .unwrap_or_default())
    }

    fn patch_tags(&self, scope: &str, patch: &TagsPatch) -> ArmResult<Tags> {
        self.enter("patch_tags", scope)?;
        let mut st = self.state.borrow_mut();
        let group = Self::find_by_scope(&mut st, scope)?;
        let mut tags = group.tags.take().unwrap_or_default();
        match patch.operation {
            TagsOperation::Merge => tags.extend(patch.tags().clone()),
            TagsOperation::Delete => {
                tags.retain(|k, v| patch.tags().get(k) != Some(v));
            }
        }
        group.tags = (!tags.is_empty()).then(|| tags.clone());
        Ok(tags)
    }

    fn list_resources(&self, group: &str) -> ArmResult<Vec<GenericResource>> {
        self.enter("list_resources", group)?;
        Ok(self
            .state
            .borrow()
            .resources
            .get(&group.to_ascii_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}
