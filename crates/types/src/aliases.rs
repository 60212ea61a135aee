pub type B256 = alloy_primitives::B256;
pub type Bytes = alloy_primitives::Bytes;
