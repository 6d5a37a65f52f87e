use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::ModelError;

/// Structured postal address stored against a phone number.
///
/// `region`, `city`, `street` and `house` are required and must be non-blank.
/// The remaining fields may be absent; absent fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "region": "Московская область",
    "city": "Москва",
    "street": "ул. Тверская",
    "house": "д. 7",
    "flat": "кв. 15"
}))]
pub struct Address {
    /// Region / province / state-level unit
    #[schema(example = "Московская область")]
    pub region: String,
    /// District within the region
    #[schema(example = "Пушкинский район")]
    pub district: Option<String>,
    /// City / populated locality
    #[schema(example = "Москва")]
    pub city: String,
    /// Village, settlement, or microdistrict
    #[schema(example = "село Иваново")]
    pub settlement: Option<String>,
    #[schema(example = "ул. Пушкина")]
    pub street: String,
    /// House number
    #[schema(example = "д. 10")]
    pub house: String,
    #[schema(example = "корп. 2")]
    pub building: Option<String>,
    #[schema(example = "стр. 1")]
    pub structure: Option<String>,
    /// Apartment or office
    #[schema(example = "кв. 42")]
    pub flat: Option<String>,
    #[schema(example = "101000")]
    pub postal_code: Option<String>,
}

impl Address {
    /// Minimal address with only the required fields set.
    pub fn new(
        region: impl Into<String>,
        city: impl Into<String>,
        street: impl Into<String>,
        house: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            district: None,
            city: city.into(),
            settlement: None,
            street: street.into(),
            house: house.into(),
            building: None,
            structure: None,
            flat: None,
            postal_code: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        let required = [
            ("region", &self.region),
            ("city", &self.city),
            ("street", &self.street),
            ("house", &self.house),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ModelError::MissingField(name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_may_be_omitted() {
        let a: Address = serde_json::from_value(json!({
            "region": "Московская область",
            "city": "Москва",
            "street": "ул. Тверская",
            "house": "д. 7",
            "flat": "кв. 15"
        }))
        .unwrap();
        assert!(a.validate().is_ok());
        assert_eq!(a.flat.as_deref(), Some("кв. 15"));
        assert!(a.district.is_none());
        assert!(a.postal_code.is_none());
    }

    #[test]
    fn missing_required_field_fails_to_deserialize() {
        let res = serde_json::from_value::<Address>(json!({
            "region": "Калифорния",
            "street": "Market Street",
            "house": "1"
        }));
        assert!(res.is_err());
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut a = Address::new("Калифорния", "Сан-Франциско", "Market Street", "1");
        assert!(a.validate().is_ok());
        a.house = "   ".into();
        assert_eq!(a.validate(), Err(ModelError::MissingField("house")));
        a.region = String::new();
        assert_eq!(a.validate(), Err(ModelError::MissingField("region")));
    }

    #[test]
    fn null_optionals_read_back_as_absent() {
        let mut a = Address::new("Île-de-France", "Париж", "Avenue des Champs-Élysées", "№ 25");
        a.postal_code = Some("75008".into());
        let blob = serde_json::to_string(&a).unwrap();
        assert!(blob.contains("\"building\":null"));
        let back: Address = serde_json::from_str(&blob).unwrap();
        assert_eq!(back, a);
    }
}
