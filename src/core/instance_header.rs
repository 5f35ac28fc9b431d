use crate::core::attributes::{Attribute, NominalAttribute};
use crate::error::TreeError;
use crate::utils::memory::{MemoryMeter, MemorySized};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The attribute schema of a stream: ordered feature attributes plus the
/// class attribute whose values form the label domain.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceHeader {
    relation_name: String,
    pub attributes: Vec<Attribute>,
    class_attribute: NominalAttribute,
}

impl InstanceHeader {
    pub fn new(
        relation_name: String,
        attributes: Vec<Attribute>,
        class_attribute: NominalAttribute,
    ) -> InstanceHeader {
        InstanceHeader {
            relation_name,
            attributes,
            class_attribute,
        }
    }

    /// Schema with anonymous attributes and classes named by their ids.
    pub fn with_classes(attributes: Vec<Attribute>, num_classes: usize) -> InstanceHeader {
        InstanceHeader::new(
            "unnamed_relation".to_string(),
            attributes,
            NominalAttribute::with_arity("class".to_string(), num_classes),
        )
    }

    pub fn number_of_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn attribute_at_index(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn index_of_attribute(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|a| a.name() == name)
    }

    pub fn class_attribute(&self) -> &NominalAttribute {
        &self.class_attribute
    }

    pub fn number_of_classes(&self) -> usize {
        self.class_attribute.arity()
    }

    /// Checks that the schema can back a tree.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.number_of_classes() == 0 {
            return Err(TreeError::InvalidSchema(
                "the label domain must contain at least one class".to_string(),
            ));
        }
        for (i, attribute) in self.attributes.iter().enumerate() {
            if attribute.arity() == Some(0) {
                return Err(TreeError::InvalidSchema(format!(
                    "categorical attribute #{i} ('{}') has arity 0",
                    attribute.name()
                )));
            }
        }
        Ok(())
    }

    /// Checks length and value types of an attribute vector. Categorical
    /// values must be non-negative integers; their range is checked by
    /// [`InstanceHeader::check_categories`] because routing tolerates
    /// categories outside the arity.
    pub fn check_values(&self, values: &[f64]) -> Result<(), TreeError> {
        if values.len() != self.attributes.len() {
            return Err(TreeError::SchemaMismatch(format!(
                "expected {} attribute values, got {}",
                self.attributes.len(),
                values.len()
            )));
        }

        for (i, (attribute, &value)) in self.attributes.iter().zip(values).enumerate() {
            if !value.is_finite() {
                return Err(TreeError::SchemaMismatch(format!(
                    "attribute #{i} ('{}') has non-finite value {value}",
                    attribute.name()
                )));
            }
            if attribute.is_nominal() && (value < 0.0 || value.fract() != 0.0) {
                return Err(TreeError::SchemaMismatch(format!(
                    "categorical attribute #{i} ('{}') expects a category id, got {value}",
                    attribute.name()
                )));
            }
        }
        Ok(())
    }

    /// Rejects categorical values outside their attribute's arity.
    pub fn check_categories(&self, values: &[f64]) -> Result<(), TreeError> {
        for (i, (attribute, &value)) in self.attributes.iter().zip(values).enumerate() {
            if let Some(arity) = attribute.arity() {
                let category = value as usize;
                if category >= arity {
                    return Err(TreeError::InvalidCategory {
                        attribute: i,
                        category,
                        arity,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn check_label(&self, label: usize) -> Result<(), TreeError> {
        let num_classes = self.number_of_classes();
        if label >= num_classes {
            return Err(TreeError::InvalidLabel { label, num_classes });
        }
        Ok(())
    }
}

impl MemorySized for InstanceHeader {
    fn inline_size(&self) -> usize {
        size_of::<Self>()
    }

    fn extra_heap_size(&self, meter: &mut MemoryMeter) -> usize {
        let mut total = 0;
        total += meter.measure_field(&self.relation_name);
        total += meter.measure_field(&self.attributes);
        total += meter.measure_field(&self.class_attribute);
        total
    }
}

impl fmt::Debug for InstanceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHeader")
            .field("relation_name", &self.relation_name)
            .field("n_attributes", &self.attributes.len())
            .field("n_classes", &self.number_of_classes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> InstanceHeader {
        InstanceHeader::with_classes(
            vec![Attribute::nominal_with_arity("a", 2), Attribute::numeric("x")],
            3,
        )
    }

    #[test]
    fn counts_attributes_and_classes() {
        let h = header();
        assert_eq!(h.number_of_attributes(), 2);
        assert_eq!(h.number_of_classes(), 3);
        assert_eq!(h.index_of_attribute("x"), Some(1));
        assert_eq!(h.index_of_attribute("missing"), None);
    }

    #[test]
    fn check_values_rejects_wrong_arity() {
        let err = header().check_values(&[1.0]).unwrap_err();
        assert!(matches!(err, TreeError::SchemaMismatch(_)));
    }

    #[test]
    fn check_values_rejects_fractional_category_and_nan() {
        let h = header();
        assert!(matches!(
            h.check_values(&[0.5, 1.0]),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert!(matches!(
            h.check_values(&[-1.0, 1.0]),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert!(matches!(
            h.check_values(&[0.0, f64::NAN]),
            Err(TreeError::SchemaMismatch(_))
        ));
        assert!(h.check_values(&[5.0, -3.25]).is_ok());
    }

    #[test]
    fn check_categories_reports_out_of_range_id() {
        let err = header().check_categories(&[2.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            TreeError::InvalidCategory {
                attribute: 0,
                category: 2,
                arity: 2
            }
        );
    }

    #[test]
    fn check_label_bounds() {
        let h = header();
        assert!(h.check_label(2).is_ok());
        assert_eq!(
            h.check_label(3),
            Err(TreeError::InvalidLabel {
                label: 3,
                num_classes: 3
            })
        );
    }

    #[test]
    fn validate_rejects_empty_domains() {
        let no_classes = InstanceHeader::with_classes(vec![Attribute::numeric("x")], 0);
        assert!(matches!(no_classes.validate(), Err(TreeError::InvalidSchema(_))));

        let empty_nominal = InstanceHeader::with_classes(vec![Attribute::nominal_with_arity("a", 0)], 2);
        assert!(matches!(empty_nominal.validate(), Err(TreeError::InvalidSchema(_))));

        assert!(header().validate().is_ok());
    }
}
