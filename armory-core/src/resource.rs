use serde::Deserialize;

/// A REST collection managed by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Items,
    Weapons,
    Categories,
    Collections,
    Rarities,
    Types,
}

impl Resource {
    /// All resources in navigation order.
    pub const ALL: [Resource; 6] = [
        Resource::Items,
        Resource::Weapons,
        Resource::Categories,
        Resource::Collections,
        Resource::Rarities,
        Resource::Types,
    ];

    /// Collection path segment, e.g. `categories`.
    pub fn path(self) -> &'static str {
        match self {
            Resource::Items => "items",
            Resource::Weapons => "weapons",
            Resource::Categories => "categories",
            Resource::Collections => "collections",
            Resource::Rarities => "rarities",
            Resource::Types => "types",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Resource::Items => "Items",
            Resource::Weapons => "Weapons",
            Resource::Categories => "Categories",
            Resource::Collections => "Collections",
            Resource::Rarities => "Rarities",
            Resource::Types => "Types",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            Resource::Items => "Item",
            Resource::Weapons => "Weapon",
            Resource::Categories => "Category",
            Resource::Collections => "Collection",
            Resource::Rarities => "Rarity",
            Resource::Types => "Type",
        }
    }

    /// Delete policy a screen uses unless configured otherwise.
    ///
    /// Weapons and types deleted without asking; see [`DeletePolicy`].
    pub fn default_delete_policy(self) -> DeletePolicy {
        match self {
            Resource::Weapons | Resource::Types => DeletePolicy::Immediate,
            _ => DeletePolicy::Confirm,
        }
    }
}

impl std::str::FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Resource::ALL
            .into_iter()
            .find(|r| r.path() == wanted || r.singular().to_lowercase() == wanted)
            .ok_or_else(|| format!("unknown resource: {}", s))
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Whether deleting requires an explicit confirmation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    Confirm,
    Immediate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_path_and_singular() {
        assert_eq!("rarities".parse::<Resource>(), Ok(Resource::Rarities));
        assert_eq!("Rarity".parse::<Resource>(), Ok(Resource::Rarities));
        assert_eq!(" TYPES ".parse::<Resource>(), Ok(Resource::Types));
        assert!("armor".parse::<Resource>().is_err());
    }

    #[test]
    fn display_is_path() {
        for resource in Resource::ALL {
            assert_eq!(resource.to_string(), resource.path());
        }
    }

    #[test]
    fn observed_delete_policies() {
        assert_eq!(Resource::Items.default_delete_policy(), DeletePolicy::Confirm);
        assert_eq!(Resource::Categories.default_delete_policy(), DeletePolicy::Confirm);
        assert_eq!(Resource::Collections.default_delete_policy(), DeletePolicy::Confirm);
        assert_eq!(Resource::Rarities.default_delete_policy(), DeletePolicy::Confirm);
        assert_eq!(Resource::Weapons.default_delete_policy(), DeletePolicy::Immediate);
        assert_eq!(Resource::Types.default_delete_policy(), DeletePolicy::Immediate);
    }
}
