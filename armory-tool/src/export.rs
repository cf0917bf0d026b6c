//! JSON/YAML export of a resource collection.

use serde::Serialize;

use crate::error::ArmoryError;

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

/// Renders entities in the requested format.
pub fn export<T: Serialize>(entities: &[T], format: ExportFormat) -> Result<String, ArmoryError> {
    match format {
        ExportFormat::Json => {
            let mut out = serde_json::to_string_pretty(entities)?;
            out.push('\n');
            Ok(out)
        }
        ExportFormat::Yaml => Ok(serde_yaml::to_string(entities)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::{CatalogType, EntityRef, Item};

    fn item() -> Item {
        Item {
            id: 3,
            name: "Asiimov".to_string(),
            photo: None,
            item_type: Some(EntityRef { id: 1, name: "Sniper Rifle".to_string() }),
            rarity: None,
            category: None,
            collection: None,
            weapon: None,
            created_at: None,
        }
    }

    #[test]
    fn json_uses_server_field_names() {
        let out = export(&[item()], ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["type"]["name"], "Sniper Rifle");
        assert!(value[0].get("photo").is_none());
    }

    #[test]
    fn yaml_lists_entities() {
        let types = vec![
            CatalogType { id: 1, name: "Rifle".to_string() },
            CatalogType { id: 2, name: "Pistol".to_string() },
        ];
        let out = export(&types, ExportFormat::Yaml).unwrap();
        assert!(out.starts_with("- id: 1\n  name: Rifle\n"));
        assert!(out.contains("name: Pistol"));
    }

    #[test]
    fn empty_collection() {
        assert_eq!(export::<CatalogType>(&[], ExportFormat::Json).unwrap(), "[]\n");
    }
}
