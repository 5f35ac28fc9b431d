use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use std::io::Error;

/// A source of labelled instances sharing one header.
pub trait Stream {
    fn header(&self) -> &InstanceHeader;
    fn has_more_instances(&self) -> bool;
    fn next_instance(&mut self) -> Option<Instance>;
    /// Rewinds to the first instance.
    fn restart(&mut self) -> Result<(), Error>;
}
