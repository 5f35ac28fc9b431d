mod attribute_class_observer;
mod binary_numeric_attribute_class_observer;
mod binned_numeric_attribute_class_observer;
mod nominal_attribute_class_observer;

pub use attribute_class_observer::{AttributeClassObserver, AttributeObserver};
pub use binary_numeric_attribute_class_observer::BinaryNumericAttributeClassObserver;
pub use binned_numeric_attribute_class_observer::{Bin, BinnedNumericAttributeClassObserver};
pub use nominal_attribute_class_observer::NominalAttributeClassObserver;
