//! Input validators for resource group names and tags.
//!
//! Resource group names: 1-90 chars of `A-Z a-z 0-9 _ ( ) - .`, not ending with a period.
//! Tag names: 1-512 chars, tag values: 1-256 chars, neither containing `< > % & \ ? /`.

use regex::Regex;
use std::sync::LazyLock;

pub const MAX_GROUP_NAME_LEN: usize = 90;
pub const MAX_TAG_NAME_LEN: usize = 512;
pub const MAX_TAG_VALUE_LEN: usize = 256;

static GROUP_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[A-Za-z0-9_()\-.]{{1,{MAX_GROUP_NAME_LEN}}}$")).expect("static regex")
});

static TAG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[^<>%&\\?/]{{1,{MAX_TAG_NAME_LEN}}}$")).expect("static regex")
});

static TAG_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[^<>%&\\?/]{{1,{MAX_TAG_VALUE_LEN}}}$")).expect("static regex")
});

pub fn is_valid_resource_group_name(name: &str) -> bool {
    GROUP_NAME.is_match(name) && !name.ends_with('.')
}

pub fn is_valid_tag_name(name: &str) -> bool {
    TAG_NAME.is_match(name)
}

pub fn is_valid_tag_value(value: &str) -> bool {
    TAG_VALUE.is_match(value)
}
