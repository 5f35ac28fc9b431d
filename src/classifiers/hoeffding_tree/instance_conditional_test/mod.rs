
pub use instance_conditional_test::{InstanceConditionalTest, SplitTest};
pub use nominal_attribute_binary_test::NominalAttributeBinaryTest;
pub use nominal_attribute_multiway_test::NominalAttributeMultiwayTest;
pub use numeric_attribute_binary_test::NumericAttributeBinaryTest;
