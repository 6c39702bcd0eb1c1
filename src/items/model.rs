//! Item records and the request schemas that produce them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::http::validate::{ObjectReader, Schema, Section, ValidationErrors};

/// Fixed set of item qualities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemQuality {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl ItemQuality {
    /// Wire names, in declaration order.
    pub const NAMES: [&'static str; 4] = ["common", "uncommon", "rare", "legendary"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemQuality::Common => "common",
            ItemQuality::Uncommon => "uncommon",
            ItemQuality::Rare => "rare",
            ItemQuality::Legendary => "legendary",
        }
    }
}

impl fmt::Display for ItemQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(ItemQuality::Common),
            "uncommon" => Ok(ItemQuality::Uncommon),
            "rare" => Ok(ItemQuality::Rare),
            "legendary" => Ok(ItemQuality::Legendary),
            other => Err(format!("unknown item quality: {other}")),
        }
    }
}

/// An item without its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub quality: ItemQuality,
    #[serde(serialize_with = "serialize_value")]
    pub value: f64,
}

/// Whole values go out as JSON integers (`1000`, not `1000.0`).
fn serialize_value<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_EXACT: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// An item as stored, with its server-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemWithId {
    pub id: String,
    #[serde(flatten)]
    pub item: Item,
}

impl ItemWithId {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quality: ItemQuality, value: f64) -> Self {
        Self {
            id: id.into(),
            item: Item {
                name: name.into(),
                quality,
                value,
            },
        }
    }
}

/// Fields an update may change. `None` leaves the stored field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<ItemQuality>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ItemPatch {
    /// Overwrite every supplied field of `item`.
    pub fn apply_to(self, item: &mut Item) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(quality) = self.quality {
            item.quality = quality;
        }
        if let Some(value) = self.value {
            item.value = value;
        }
    }
}

/// Path parameters of the `/items/{id}` routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamsWithId {
    pub id: String,
}

impl Schema for Item {
    fn parse(section: Section, raw: Value) -> Result<Self, ValidationErrors> {
        let mut reader = ObjectReader::new(section, raw)?;
        let name = reader.required_string("name", 1);
        let quality = reader.required_one_of::<ItemQuality>("quality", &ItemQuality::NAMES);
        let value = reader.required_number("value");
        reader.finish(|| {
            Some(Item {
                name: name?,
                quality: quality?,
                value: value?,
            })
        })
    }
}

impl Schema for ItemPatch {
    fn parse(section: Section, raw: Value) -> Result<Self, ValidationErrors> {
        let mut reader = ObjectReader::new(section, raw)?;
        let name = reader.optional_string("name", 1);
        let quality = reader.optional_one_of::<ItemQuality>("quality", &ItemQuality::NAMES);
        let value = reader.optional_number("value");
        reader.finish(|| Some(ItemPatch { name, quality, value }))
    }
}

impl Schema for ParamsWithId {
    fn parse(section: Section, raw: Value) -> Result<Self, ValidationErrors> {
        let mut reader = ObjectReader::new(section, raw)?;
        let id = reader.required_string("id", 1);
        reader.finish(|| Some(ParamsWithId { id: id? }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_accepts_valid_body() {
        let item = Item::parse(
            Section::Body,
            json!({"name": "Cool Sword", "quality": "uncommon", "value": 150}),
        )
        .unwrap();
        assert_eq!(item.name, "Cool Sword");
        assert_eq!(item.quality, ItemQuality::Uncommon);
        assert_eq!(item.value, 150.0);
    }

    #[test]
    fn test_item_reports_all_field_issues() {
        let err = Item::parse(
            Section::Body,
            json!({"name": "", "quality": "mythic", "value": "ten"}),
        )
        .unwrap_err();

        assert_eq!(err.issues().len(), 3);
        assert!(err.has_field("name"));
        assert!(err.has_field("quality"));
        assert!(err.has_field("value"));
    }

    #[test]
    fn test_item_requires_every_field() {
        let err = Item::parse(Section::Body, json!({"name": "x"})).unwrap_err();
        assert!(!err.has_field("name"));
        assert!(err.has_field("quality"));
        assert!(err.has_field("value"));
    }

    #[test]
    fn test_patch_allows_subset() {
        let patch = ItemPatch::parse(Section::Body, json!({"value": 0})).unwrap();
        assert_eq!(patch, ItemPatch { value: Some(0.0), ..Default::default() });

        let empty = ItemPatch::parse(Section::Body, json!({})).unwrap();
        assert_eq!(empty, ItemPatch::default());
    }

    #[test]
    fn test_patch_rejects_null_fields() {
        let err = ItemPatch::parse(Section::Body, json!({"value": null})).unwrap_err();
        assert!(err.has_field("value"));
        assert_eq!(err.issues()[0].message, "Expected number, received null");
    }

    #[test]
    fn test_patch_still_checks_present_fields() {
        let err = ItemPatch::parse(Section::Body, json!({"name": "", "quality": "epic"})).unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("quality"));
    }

    #[test]
    fn test_patch_applies_only_supplied_fields() {
        let mut item = Item {
            name: "bronze sword".into(),
            quality: ItemQuality::Common,
            value: 10.0,
        };
        ItemPatch {
            quality: Some(ItemQuality::Rare),
            value: Some(0.0),
            ..Default::default()
        }
        .apply_to(&mut item);

        assert_eq!(item.name, "bronze sword");
        assert_eq!(item.quality, ItemQuality::Rare);
        assert_eq!(item.value, 0.0);
    }

    #[test]
    fn test_params_require_non_empty_id() {
        assert!(ParamsWithId::parse(Section::Params, json!({"id": ""})).is_err());
        let params = ParamsWithId::parse(Section::Params, json!({"id": "abc"})).unwrap();
        assert_eq!(params.id, "abc");
    }

    #[test]
    fn test_item_with_id_wire_shape() {
        let item = ItemWithId::new("1", "potion", ItemQuality::Legendary, 3.5);
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"id": "1", "name": "potion", "quality": "legendary", "value": 3.5})
        );
    }

    #[test]
    fn test_whole_values_serialize_as_integers() {
        let item = ItemWithId::new("1", "trident", ItemQuality::Legendary, 1000.0);
        let text = serde_json::to_string(&item).unwrap();
        assert!(text.ends_with(r#""value":1000}"#), "{text}");

        let zero = ItemWithId::new("2", "stick", ItemQuality::Common, -0.0);
        assert_eq!(serde_json::to_value(&zero).unwrap()["value"], json!(0));
    }

    #[test]
    fn test_quality_names_round_trip() {
        for name in ItemQuality::NAMES {
            assert_eq!(name.parse::<ItemQuality>().unwrap().as_str(), name);
        }
        assert!("Common".parse::<ItemQuality>().is_err());
    }
}
