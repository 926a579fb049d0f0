//! Shared wire structures carried inside message bodies

pub mod bucket;
pub mod hello_elem;
pub mod meter_band;
pub mod port;
pub mod queue;
pub mod table_feature;

pub use bucket::{Bucket, parse_bucket_list, write_bucket_list};
pub use hello_elem::{HelloElem, parse_hello_elems, write_hello_elems};
pub use meter_band::MeterBand;
pub use port::{Port, PortBuilder, PortNumber};
pub use queue::{Queue, QueueBuilder, QueueProp};
pub use table_feature::{TableFeature, TableFeatureProp};
