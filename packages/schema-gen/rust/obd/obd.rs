// @generated
// This file is @generated by prost-build.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct FuelLevelRequest {
    #[prost(string, tag = "1")]
    pub vehicle_id: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct FuelLevelStreamRequest {
    #[prost(string, tag = "1")]
    pub vehicle_id: ::prost::alloc::string::String,
    /// Sampling cadence in seconds. The server treats 0 as 1.
    #[prost(uint32, tag = "2")]
    pub interval_seconds: u32,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FuelLevelResponse {
    #[prost(float, tag = "1")]
    pub level_percent: f32,
    #[prost(uint64, tag = "2")]
    pub timestamp_ms: u64,
    #[prost(int32, tag = "3")]
    pub status: i32,
    #[prost(string, tag = "4")]
    pub error_message: ::prost::alloc::string::String,
}
include!("obd.tonic.rs");
// @@protoc_insertion_point(module)
