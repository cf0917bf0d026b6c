use serde::{Deserialize, Serialize};

use crate::draft::{parse_id, parse_integer, Draft, DraftError, Field, Reference};
use crate::entity::{ref_id, Entity, EntityId, EntityRef};
use crate::resource::Resource;

/// Draft shared by all entities that only carry a name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameDraft {
    pub name: String,
}

impl Draft for NameDraft {
    const FIELDS: &'static [Field] = &[Field::text("name", "Name")];

    fn name(&self) -> &str {
        &self.name
    }

    fn field(&self, key: &str) -> Option<String> {
        (key == "name").then(|| self.name.clone())
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        match key {
            "name" => {
                self.name = value.to_string();
                Ok(())
            }
            _ => Err(DraftError::UnknownField(key.to_string())),
        }
    }
}

macro_rules! named_entity {
    ($(#[$meta:meta])* $ty:ident => $resource:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $ty {
            pub id: EntityId,
            pub name: String,
        }

        impl Entity for $ty {
            const RESOURCE: Resource = $resource;

            type Draft = NameDraft;

            fn id(&self) -> EntityId {
                self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn to_draft(&self) -> NameDraft {
                NameDraft {
                    name: self.name.clone(),
                }
            }
        }
    };
}

named_entity!(Category => Resource::Categories);
named_entity!(Collection => Resource::Collections);
named_entity!(Rarity => Resource::Rarities);
named_entity!(
    /// Entry of the `types` resource, referenced by weapons and items.
    CatalogType => Resource::Types
);

/// Damage dealt per body part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyDamage {
    pub arms: i64,
    pub head: i64,
    pub legs: i64,
    pub chest: i64,
    pub stomach: i64,
}

impl BodyDamage {
    const PARTS: [&'static str; 5] = ["arms", "head", "legs", "chest", "stomach"];

    fn part(&self, part: &str) -> Option<i64> {
        match part {
            "arms" => Some(self.arms),
            "head" => Some(self.head),
            "legs" => Some(self.legs),
            "chest" => Some(self.chest),
            "stomach" => Some(self.stomach),
            _ => None,
        }
    }

    fn part_mut(&mut self, part: &str) -> Option<&mut i64> {
        match part {
            "arms" => Some(&mut self.arms),
            "head" => Some(&mut self.head),
            "legs" => Some(&mut self.legs),
            "chest" => Some(&mut self.chest),
            "stomach" => Some(&mut self.stomach),
            _ => None,
        }
    }

    fn summary(&self) -> String {
        Self::PARTS
            .iter()
            .filter_map(|p| self.part(p).map(|v| format!("{} {}", p, v)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Damage breakdown by armor state and body part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageInfo {
    pub armor: BodyDamage,
    pub no_armor: BodyDamage,
}

impl DamageInfo {
    /// Resolves a dotted key such as `damage_info.armor.head`.
    fn cell(&self, key: &str) -> Option<i64> {
        let (state, part) = split_damage_key(key)?;
        match state {
            "armor" => self.armor.part(part),
            "no_armor" => self.no_armor.part(part),
            _ => None,
        }
    }

    fn cell_mut(&mut self, key: &str) -> Option<&mut i64> {
        let (state, part) = split_damage_key(key)?;
        match state {
            "armor" => self.armor.part_mut(part),
            "no_armor" => self.no_armor.part_mut(part),
            _ => None,
        }
    }
}

fn split_damage_key(key: &str) -> Option<(&str, &str)> {
    key.strip_prefix("damage_info.")?.split_once('.')
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub weapon_type: Option<EntityRef>,
    pub damage: i64,
    pub fire_rate: i64,
    pub recoil: i64,
    pub range: i64,
    pub mobility: i64,
    pub armor_penetration: i64,
    pub penetration_power: i64,
    pub ammo: i64,
    pub cost: i64,
    #[serde(default)]
    pub damage_info: DamageInfo,
    #[serde(default)]
    pub slug: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDraft {
    pub name: String,
    pub type_id: EntityId,
    pub damage: i64,
    pub fire_rate: i64,
    pub recoil: i64,
    pub range: i64,
    pub mobility: i64,
    pub armor_penetration: i64,
    pub penetration_power: i64,
    pub ammo: i64,
    pub cost: i64,
    pub damage_info: DamageInfo,
}

impl WeaponDraft {
    fn stat(&self, key: &str) -> Option<i64> {
        match key {
            "damage" => Some(self.damage),
            "fire_rate" => Some(self.fire_rate),
            "recoil" => Some(self.recoil),
            "range" => Some(self.range),
            "mobility" => Some(self.mobility),
            "armor_penetration" => Some(self.armor_penetration),
            "penetration_power" => Some(self.penetration_power),
            "ammo" => Some(self.ammo),
            "cost" => Some(self.cost),
            _ => self.damage_info.cell(key),
        }
    }

    fn stat_mut(&mut self, key: &str) -> Option<&mut i64> {
        match key {
            "damage" => Some(&mut self.damage),
            "fire_rate" => Some(&mut self.fire_rate),
            "recoil" => Some(&mut self.recoil),
            "range" => Some(&mut self.range),
            "mobility" => Some(&mut self.mobility),
            "armor_penetration" => Some(&mut self.armor_penetration),
            "penetration_power" => Some(&mut self.penetration_power),
            "ammo" => Some(&mut self.ammo),
            "cost" => Some(&mut self.cost),
            _ => self.damage_info.cell_mut(key),
        }
    }
}

impl Draft for WeaponDraft {
    const FIELDS: &'static [Field] = &[
        Field::reference("type_id", "Type", Resource::Types),
        Field::text("name", "Name"),
        Field::integer("damage", "Damage"),
        Field::integer("fire_rate", "Fire Rate"),
        Field::integer("recoil", "Recoil"),
        Field::integer("range", "Range"),
        Field::integer("mobility", "Mobility"),
        Field::integer("armor_penetration", "Armor Penetration"),
        Field::integer("penetration_power", "Penetration Power"),
        Field::integer("ammo", "Ammo"),
        Field::integer("cost", "Cost"),
        Field::integer("damage_info.armor.arms", "Arms (Armor)"),
        Field::integer("damage_info.armor.head", "Head (Armor)"),
        Field::integer("damage_info.armor.legs", "Legs (Armor)"),
        Field::integer("damage_info.armor.chest", "Chest (Armor)"),
        Field::integer("damage_info.armor.stomach", "Stomach (Armor)"),
        Field::integer("damage_info.no_armor.arms", "Arms (No Armor)"),
        Field::integer("damage_info.no_armor.head", "Head (No Armor)"),
        Field::integer("damage_info.no_armor.legs", "Legs (No Armor)"),
        Field::integer("damage_info.no_armor.chest", "Chest (No Armor)"),
        Field::integer("damage_info.no_armor.stomach", "Stomach (No Armor)"),
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> Vec<Reference> {
        vec![Reference {
            field: "type_id",
            label: "Type",
            resource: Resource::Types,
            id: self.type_id,
        }]
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "type_id" => Some(self.type_id.to_string()),
            _ => self.stat(key).map(|v| v.to_string()),
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let label = crate::draft::field_label::<Self>(key);
        match key {
            "name" => self.name = value.to_string(),
            "type_id" => self.type_id = parse_id(label, value)?,
            _ => {
                let parsed = parse_integer(label, value)?;
                let slot = self
                    .stat_mut(key)
                    .ok_or_else(|| DraftError::UnknownField(key.to_string()))?;
                *slot = parsed;
            }
        }
        Ok(())
    }
}

impl Entity for Weapon {
    const RESOURCE: Resource = Resource::Weapons;

    type Draft = WeaponDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_draft(&self) -> WeaponDraft {
        WeaponDraft {
            name: self.name.clone(),
            type_id: ref_id(&self.weapon_type),
            damage: self.damage,
            fire_rate: self.fire_rate,
            recoil: self.recoil,
            range: self.range,
            mobility: self.mobility,
            armor_penetration: self.armor_penetration,
            penetration_power: self.penetration_power,
            ammo: self.ammo,
            cost: self.cost,
            damage_info: self.damage_info,
        }
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Type", ref_name(&self.weapon_type)),
            ("Damage", self.damage.to_string()),
            ("Fire Rate", self.fire_rate.to_string()),
            ("Recoil", self.recoil.to_string()),
            ("Range", self.range.to_string()),
            ("Mobility", self.mobility.to_string()),
            ("Armor Penetration", self.armor_penetration.to_string()),
            ("Penetration Power", self.penetration_power.to_string()),
            ("Ammo", self.ammo.to_string()),
            ("Cost", format!("${}", self.cost)),
            ("Damage (With Armor)", self.damage_info.armor.summary()),
            ("Damage (No Armor)", self.damage_info.no_armor.summary()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(rename = "type", default)]
    pub item_type: Option<EntityRef>,
    #[serde(default)]
    pub rarity: Option<EntityRef>,
    #[serde(default)]
    pub category: Option<EntityRef>,
    #[serde(default)]
    pub collection: Option<EntityRef>,
    #[serde(default)]
    pub weapon: Option<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub type_id: EntityId,
    pub rarity_id: EntityId,
    pub category_id: EntityId,
    pub collection_id: EntityId,
    pub weapon_id: EntityId,
}

impl ItemDraft {
    fn reference_mut(&mut self, key: &str) -> Option<&mut EntityId> {
        match key {
            "type_id" => Some(&mut self.type_id),
            "rarity_id" => Some(&mut self.rarity_id),
            "category_id" => Some(&mut self.category_id),
            "collection_id" => Some(&mut self.collection_id),
            "weapon_id" => Some(&mut self.weapon_id),
            _ => None,
        }
    }
}

impl Draft for ItemDraft {
    const FIELDS: &'static [Field] = &[
        Field::text("name", "Item Name"),
        Field::reference("weapon_id", "Weapon", Resource::Weapons),
        Field::reference("type_id", "Type", Resource::Types),
        Field::reference("rarity_id", "Rarity", Resource::Rarities),
        Field::reference("category_id", "Category", Resource::Categories),
        Field::reference("collection_id", "Collection", Resource::Collections),
        Field::photo("photo", "Photo"),
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn references(&self) -> Vec<Reference> {
        let reference = |field, label, resource, id| Reference {
            field,
            label,
            resource,
            id,
        };
        vec![
            reference("type_id", "Type", Resource::Types, self.type_id),
            reference("rarity_id", "Rarity", Resource::Rarities, self.rarity_id),
            reference("category_id", "Category", Resource::Categories, self.category_id),
            reference("collection_id", "Collection", Resource::Collections, self.collection_id),
            reference("weapon_id", "Weapon", Resource::Weapons, self.weapon_id),
        ]
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "photo" => Some(self.photo.clone().unwrap_or_default()),
            "type_id" => Some(self.type_id.to_string()),
            "rarity_id" => Some(self.rarity_id.to_string()),
            "category_id" => Some(self.category_id.to_string()),
            "collection_id" => Some(self.collection_id.to_string()),
            "weapon_id" => Some(self.weapon_id.to_string()),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), DraftError> {
        let label = crate::draft::field_label::<Self>(key);
        match key {
            "name" => self.name = value.to_string(),
            "photo" => {
                let trimmed = value.trim();
                self.photo = (!trimmed.is_empty()).then(|| trimmed.to_string());
            }
            _ => {
                let id = parse_id(label, value)?;
                let slot = self
                    .reference_mut(key)
                    .ok_or_else(|| DraftError::UnknownField(key.to_string()))?;
                *slot = id;
            }
        }
        Ok(())
    }

    fn photo_mut(&mut self) -> Option<&mut Option<String>> {
        Some(&mut self.photo)
    }
}

impl Entity for Item {
    const RESOURCE: Resource = Resource::Items;

    type Draft = ItemDraft;

    fn id(&self) -> EntityId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_draft(&self) -> ItemDraft {
        ItemDraft {
            name: self.name.clone(),
            photo: self.photo.clone(),
            type_id: ref_id(&self.item_type),
            rarity_id: ref_id(&self.rarity),
            category_id: ref_id(&self.category),
            collection_id: ref_id(&self.collection),
            weapon_id: ref_id(&self.weapon),
        }
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Weapon", ref_name(&self.weapon)),
            ("Type", ref_name(&self.item_type)),
            ("Rarity", ref_name(&self.rarity)),
            ("Category", ref_name(&self.category)),
            ("Collection", ref_name(&self.collection)),
        ];
        if let Some(created) = &self.created_at {
            lines.push(("Created", created.clone()));
        }
        lines
    }

    fn photo(&self) -> Option<&str> {
        self.photo.as_deref()
    }
}

fn ref_name(reference: &Option<EntityRef>) -> String {
    reference
        .as_ref()
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::UNSET_ID;

    fn sample_item() -> Item {
        Item {
            id: 7,
            name: "Dragon Lore".to_string(),
            photo: Some("uploads/dragon.png".to_string()),
            item_type: Some(EntityRef { id: 1, name: "Skin".to_string() }),
            rarity: Some(EntityRef { id: 2, name: "Covert".to_string() }),
            category: Some(EntityRef { id: 3, name: "Rifles".to_string() }),
            collection: None,
            weapon: Some(EntityRef { id: 5, name: "AWP".to_string() }),
            created_at: Some("2024-05-01T12:00:00".to_string()),
        }
    }

    #[test]
    fn item_draft_flattens_references() {
        let draft = sample_item().to_draft();
        assert_eq!(draft.name, "Dragon Lore");
        assert_eq!(draft.type_id, 1);
        assert_eq!(draft.rarity_id, 2);
        assert_eq!(draft.category_id, 3);
        assert_eq!(draft.collection_id, UNSET_ID);
        assert_eq!(draft.weapon_id, 5);
        assert_eq!(draft.photo.as_deref(), Some("uploads/dragon.png"));
    }

    #[test]
    fn item_draft_fields() {
        let mut draft = ItemDraft::default();
        draft.set_field("weapon_id", "12").unwrap();
        draft.set_field("photo", "  ").unwrap();
        draft.set_field("name", "Asiimov").unwrap();

        assert_eq!(draft.weapon_id, 12);
        assert_eq!(draft.photo, None);
        assert_eq!(draft.field("weapon_id").as_deref(), Some("12"));
        assert_eq!(draft.field("name").as_deref(), Some("Asiimov"));
        assert!(matches!(
            draft.set_field("owner_id", "1"),
            Err(DraftError::UnknownField(_))
        ));
        assert!(matches!(
            draft.set_field("rarity_id", "rare"),
            Err(DraftError::InvalidNumber { label: "Rarity", .. })
        ));
    }

    #[test]
    fn item_dependencies_cover_all_references() {
        let deps = ItemDraft::dependencies();
        assert_eq!(
            deps,
            vec![
                Resource::Weapons,
                Resource::Types,
                Resource::Rarities,
                Resource::Categories,
                Resource::Collections,
            ]
        );
        assert!(NameDraft::dependencies().is_empty());
        assert_eq!(WeaponDraft::dependencies(), vec![Resource::Types]);
    }

    #[test]
    fn weapon_damage_cells_are_addressable() {
        let mut draft = WeaponDraft::default();
        draft.set_field("damage_info.armor.head", "115").unwrap();
        draft.set_field("damage_info.no_armor.stomach", "").unwrap();
        draft.set_field("fire_rate", "600").unwrap();

        assert_eq!(draft.damage_info.armor.head, 115);
        assert_eq!(draft.damage_info.no_armor.stomach, 0);
        assert_eq!(draft.fire_rate, 600);
        assert_eq!(draft.field("damage_info.armor.head").as_deref(), Some("115"));
        assert!(draft.set_field("damage_info.shield.head", "1").is_err());
        assert!(draft.set_field("damage_info.armor.toes", "1").is_err());
    }

    #[test]
    fn every_weapon_field_round_trips_through_text() {
        let mut draft = WeaponDraft::default();
        for (n, field) in WeaponDraft::FIELDS.iter().enumerate() {
            let value = if field.key == "name" { "M4A4".to_string() } else { (n + 1).to_string() };
            draft.set_field(field.key, &value).unwrap();
            assert_eq!(draft.field(field.key), Some(value));
        }
    }

    #[test]
    fn weapon_draft_keeps_stats() {
        let weapon = Weapon {
            id: 4,
            name: "AK-47".to_string(),
            weapon_type: Some(EntityRef { id: 9, name: "Rifle".to_string() }),
            damage: 36,
            fire_rate: 600,
            recoil: 30,
            range: 80,
            mobility: 215,
            armor_penetration: 77,
            penetration_power: 200,
            ammo: 30,
            cost: 2700,
            damage_info: DamageInfo {
                armor: BodyDamage { arms: 27, head: 111, legs: 20, chest: 27, stomach: 34 },
                no_armor: BodyDamage { arms: 35, head: 143, legs: 26, chest: 35, stomach: 44 },
            },
            slug: "ak-47".to_string(),
        };

        let draft = weapon.to_draft();
        assert_eq!(draft.type_id, 9);
        assert_eq!(draft.cost, 2700);
        assert_eq!(draft.damage_info, weapon.damage_info);

        let details = weapon.details();
        assert!(details.contains(&("Cost", "$2700".to_string())));
        assert!(details.contains(&(
            "Damage (With Armor)",
            "arms 27, head 111, legs 20, chest 27, stomach 34".to_string()
        )));
    }

    #[test]
    fn named_entities_share_name_draft() {
        let rarity = Rarity { id: 1, name: "Covert".to_string() };
        assert_eq!(rarity.to_draft(), NameDraft { name: "Covert".to_string() });
        assert_eq!(CatalogType::RESOURCE, Resource::Types);
        assert_eq!(rarity.to_ref(), EntityRef { id: 1, name: "Covert".to_string() });
    }
}
